//! WebSocket Server for Live Updates
//!
//! Accepts TCP connections on a dedicated port and runs each one through
//! the connection adapter on its own thread.

use std::net::{IpAddr, TcpListener};
use std::time::Duration;

use anyhow::Result;

use crate::actor::hub::Hub;
use crate::actor::ws::serve_connection;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Accept loop poll interval (for the shutdown check)
const ACCEPT_POLL: Duration = Duration::from_millis(100);

// =============================================================================
// Server
// =============================================================================

/// Start the websocket server. Returns the port actually bound.
///
/// The acceptor runs on a background thread until shutdown is requested.
pub fn start_ws_server(
    interface: IpAddr,
    base_port: u16,
    hub: Hub,
    write_timeout: Duration,
) -> Result<u16> {
    let (listener, actual_port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    std::thread::Builder::new()
        .name("ws-accept".into())
        .spawn(move || accept_loop(&listener, &hub, write_timeout))?;

    Ok(actual_port)
}

fn accept_loop(listener: &TcpListener, hub: &Hub, write_timeout: Duration) {
    while !crate::core::is_shutdown() {
        match listener.accept() {
            Ok((stream, addr)) => {
                crate::debug!("reload"; "connection from {}", addr);

                // Set blocking for WebSocket operations
                let _ = stream.set_nonblocking(false);

                let hub = hub.clone();
                let spawned = std::thread::Builder::new()
                    .name(format!("ws-in-{addr}"))
                    .spawn(move || serve_connection(stream, &hub, write_timeout));
                if let Err(e) = spawned {
                    crate::log!("reload"; "cannot start connection thread: {}", e);
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(ACCEPT_POLL);
            }
            Err(e) => {
                crate::log!("reload"; "accept error: {}", e);
                std::thread::sleep(ACCEPT_POLL);
            }
        }
    }
    crate::debug!("reload"; "acceptor stopped");
}

// =============================================================================
// Helpers
// =============================================================================

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind((interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                if offset > 0 {
                    crate::log!("reload"; "port {} in use, using {} instead", base_port, actual_port);
                }
                return Ok((listener, actual_port));
            }
            Err(e) => {
                last_error = Some(e);
                continue;
            }
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn test_bind_skips_taken_port() {
        let taken = TcpListener::bind((LOCALHOST, 0)).unwrap();
        let port = taken.local_addr().unwrap().port();

        match try_bind_port(LOCALHOST, port, 10) {
            Ok((_listener, actual)) => assert_ne!(actual, port),
            // Every following port may be taken on a busy machine
            Err(e) => assert!(e.to_string().contains("10 attempts")),
        }
    }

    #[test]
    fn test_bind_gives_up() {
        let taken = TcpListener::bind((LOCALHOST, 0)).unwrap();
        let port = taken.local_addr().unwrap().port();

        let err = try_bind_port(LOCALHOST, port, 1).unwrap_err();
        assert!(err.to_string().contains("1 attempts"));
    }
}
