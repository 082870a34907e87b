//! Actor System for Live Updates
//!
//! Message-passing concurrency between file watches, the hub and clients:
//!
//! ```text
//! FileWatcher --path--> Hub (render) --HubMsg--> HubActor --queue--> ws adapter
//! (debounce)             ^                                            (socket)
//!                        +------------- register / unregister --------+
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for the hub event loop
//! - `fs` - Per-file watcher with debouncing
//! - `hub` - Tracked files, client set, broadcast
//! - `ws` - WebSocket connection adapter

pub mod fs;
pub mod hub;
pub mod messages;
pub mod ws;

pub use hub::Hub;
