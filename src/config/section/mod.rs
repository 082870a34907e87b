//! Configuration section definitions.
//!
//! Each module corresponds to a section in `livemd.toml`:
//!
//! | Module  | TOML Section | Purpose                               |
//! |---------|--------------|---------------------------------------|
//! | `hub`   | `[hub]`      | Client queues, log replay, timeouts   |
//! | `serve` | `[serve]`    | HTTP and websocket servers            |

mod hub;
mod serve;

pub use hub::HubConfig;
pub use serve::{DEFAULT_WS_PORT, ServeConfig};
