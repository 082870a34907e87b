use std::net::{Shutdown, TcpStream};
use std::sync::Arc;

use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use crate::actor::hub::ClientId;

/// Write queued messages in order until the queue ends or a write fails.
pub(super) fn outbound_loop(
    mut ws: WebSocket<TcpStream>,
    mut queue: mpsc::Receiver<Arc<str>>,
    id: ClientId,
) {
    while let Some(text) = queue.blocking_recv() {
        if let Err(e) = ws.send(Message::Text(text.to_string().into())) {
            crate::debug!("ws"; "write to client {} failed: {}", id, e);
            break;
        }
    }

    // Queue closed (disconnect, eviction, shutdown) or the peer is gone
    let _ = ws.close(None);
    let _ = ws.flush();
    let _ = ws.get_ref().shutdown(Shutdown::Both);
    crate::debug!("ws"; "writer for client {} stopped", id);
}

/// Read until the connection fails. Incoming data is ignored.
pub(super) fn inbound_loop(mut ws: WebSocket<TcpStream>, id: ClientId) {
    loop {
        match ws.read() {
            Ok(Message::Close(frame)) => {
                crate::debug!("ws"; "client {} sent close: {:?}", id, frame);
            }
            Ok(_) => {}
            Err(e) => {
                crate::debug!("ws"; "client {} disconnected: {}", id, e);
                break;
            }
        }
    }
    let _ = ws.get_ref().shutdown(Shutdown::Both);
}
