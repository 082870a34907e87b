//! Actor Message Definitions
//!
//! Everything that touches the client set goes through the hub's event loop
//! as a [`HubMsg`], so registration, removal and broadcast never interleave.
//!
//! ```text
//! Hub ops / change loop --Broadcast--> HubActor --try_send--> client queues
//! Logger ----------------Log---------> HubActor
//! ws adapter -----Register/Unregister-> HubActor
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use super::hub::ClientId;
use crate::reload::message::{LogEntry, UpdateMessage};

/// Messages to the Hub event loop
#[derive(Debug)]
pub enum HubMsg {
    /// Add a client and send it the bootstrap (file list, then log replay)
    Register {
        id: ClientId,
        queue: mpsc::Sender<Arc<str>>,
    },
    /// Drop a client and close its queue (no-op when unknown)
    Unregister(ClientId),
    /// Fan a message out to every client
    Broadcast(UpdateMessage),
    /// Buffer a log entry and fan it out
    Log(LogEntry),
    /// Report the number of registered clients
    ClientCount(oneshot::Sender<usize>),
    /// Close every client queue and stop
    Shutdown,
}
