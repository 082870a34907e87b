//! Server lifecycle management.

use crate::log;
use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use tiny_http::Server;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Worker threads for the hub, change loop and file watchers.
const RUNTIME_WORKERS: usize = 2;

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut offset = 0;
    loop {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                let addr = server.server_addr().to_ip().unwrap_or(addr);
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < MAX_PORT_RETRIES => offset += 1,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to bind after {} attempts (ports {}-{}): {}",
                    MAX_PORT_RETRIES,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
}

/// Runtime hosting the hub's event loop and every file watch.
pub fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(RUNTIME_WORKERS)
        .thread_name("livemd-rt")
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_bind_moves_past_taken_port() {
        let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let (_first, addr) = bind_with_retry(localhost, 0).unwrap();
        let port = addr.port();
        assert_ne!(port, 0);

        let (_second, addr) = bind_with_retry(localhost, port).unwrap();
        assert_ne!(addr.port(), port);
    }
}
