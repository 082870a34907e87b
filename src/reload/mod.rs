//! Reload Module
//!
//! Browser-facing side of live updates.
//!
//! # Architecture
//!
//! ```text
//! FileWatcher -> Hub -> client queues -> connection adapter -> Browser
//!   (debounce)   (render, fan-out)          (ws write loop)
//! ```
//!
//! # Modules
//!
//! - `message` - Update message types (files, update, removed, log, logs)
//! - `server` - WebSocket listener handing connections to the adapter

pub mod message;
pub mod server;
