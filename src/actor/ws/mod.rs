//! WebSocket Connection Adapter
//!
//! Bridges one accepted TCP connection to a hub client queue with two
//! independent halves on their own threads:
//!
//! ```text
//!            +--> outbound thread: queue --> socket (write timeout)
//! socket ----|
//!            +--> inbound thread: socket --> (discard) --> disconnect on error
//! ```
//!
//! A stalled write never blocks disconnect detection, and a dead peer is
//! noticed without waiting for the next broadcast. Whichever half stops
//! first shuts the socket down, which stops the other one.

mod client_io;


use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use tungstenite::WebSocket;
use tungstenite::protocol::Role;

use super::hub::Hub;

/// Upper bound for the opening handshake
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Upgrade `stream` and run the connection until either side ends it.
///
/// Blocks the calling thread for the lifetime of the connection.
pub fn serve_connection(stream: TcpStream, hub: &Hub, write_timeout: Duration) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let _ = stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT));
    let ws = match tungstenite::accept(stream) {
        Ok(ws) => ws,
        Err(e) => {
            crate::log!("ws"; "handshake with {} failed: {}", peer, e);
            return;
        }
    };
    let _ = ws.get_ref().set_read_timeout(None);

    let writer = match ws.get_ref().try_clone() {
        Ok(stream) => stream,
        Err(e) => {
            crate::log!("ws"; "cannot split connection from {}: {}", peer, e);
            let _ = ws.get_ref().shutdown(Shutdown::Both);
            return;
        }
    };
    let _ = writer.set_write_timeout(Some(write_timeout));
    let writer = WebSocket::from_raw_socket(writer, Role::Server, None);

    let client = hub.on_client_connect();
    let id = client.id;
    crate::debug!("ws"; "client {} connected from {}", id, peer);

    let spawned = std::thread::Builder::new()
        .name(format!("ws-out-{id}"))
        .spawn(move || client_io::outbound_loop(writer, client.queue, id));
    if let Err(e) = spawned {
        crate::log!("ws"; "cannot start writer for client {}: {}", id, e);
        hub.on_client_disconnect(id);
        let _ = ws.get_ref().shutdown(Shutdown::Both);
        return;
    }

    client_io::inbound_loop(ws, id);
    hub.on_client_disconnect(id);
}
