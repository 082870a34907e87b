//! Viewer server: HTTP API, viewer page and websocket updates.
//!
//! ```text
//! main --> serve()
//!            ├── Hub (tokio runtime)
//!            ├── websocket server (acceptor thread)
//!            └── HTTP request loop (tiny_http + rayon pool)
//! ```

mod api;
mod lifecycle;
mod response;

use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use tiny_http::{Method, Request, Server};

use crate::actor::hub::Hub;
use crate::cli::Cli;
use crate::config::{DEFAULT_WS_PORT, cfg};
use crate::render::FileRenderer;
use crate::{debug, log};

/// Largest request body the API reads
const MAX_BODY_BYTES: u64 = 1024 * 1024;

/// Time given to background tasks after the request loop ends
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Actual WebSocket port (may differ from the configured one if it was in use)
static ACTUAL_WS_PORT: AtomicU16 = AtomicU16::new(DEFAULT_WS_PORT);

/// Update the actual WebSocket port (called after the websocket server binds)
pub fn set_actual_ws_port(port: u16) {
    ACTUAL_WS_PORT.store(port, Ordering::Relaxed);
}

/// Get the actual WebSocket port
fn get_actual_ws_port() -> u16 {
    ACTUAL_WS_PORT.load(Ordering::Relaxed)
}

/// Run the viewer until Ctrl+C.
///
/// Files given on the command line must exist and render, or nothing starts.
pub fn serve(cli: &Cli) -> Result<()> {
    let config = cfg();
    let runtime = lifecycle::build_runtime()?;
    let hub = Hub::new(
        Arc::new(FileRenderer::new()),
        config.hub.options(),
        runtime.handle().clone(),
    );

    for path in &cli.files {
        hub.add_file(path, !cli.inactive)
            .with_context(|| format!("cannot track {}", path.display()))?;
    }

    let ws_port = crate::reload::server::start_ws_server(
        config.serve.interface,
        config.serve.ws_port,
        hub.clone(),
        config.hub.write_timeout(),
    )?;
    set_actual_ws_port(ws_port);

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    crate::core::register_server(Arc::clone(&server));

    log!("serve"; "http://{}", addr);
    debug!("serve"; "ws://{}:{}", config.serve.interface, ws_port);

    run_request_loop(&server, &hub)?;

    hub.close();
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    debug!("serve"; "stopped");
    Ok(())
}

fn run_request_loop(server: &Server, hub: &Hub) -> Result<()> {
    // Thread pool so a slow render in one request does not block the others
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .context("failed to create thread pool")?;

    for request in server.incoming_requests() {
        let hub = hub.clone();
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &hub) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(mut request: Request, hub: &Hub) -> Result<()> {
    // Early exit if shutdown requested
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let method = request.method().clone();
    let url = request.url().to_string();
    debug!("serve"; "{} {}", method, url);

    if url == "/api" || url.starts_with("/api/") || url.starts_with("/api?") {
        let body = response::read_body(&mut request, MAX_BODY_BYTES)?;
        let reply = api::handle(hub, &method, &url, &body);
        return response::respond_json(request, reply.status, &reply.body);
    }

    let path = url.split_once('?').map_or(url.as_str(), |(path, _)| path);
    match (&method, path) {
        (Method::Get | Method::Head, "/" | "/index.html") => {
            response::respond_index(request, get_actual_ws_port())
        }
        (_, "/" | "/index.html") => response::respond_method_not_allowed(request),
        _ => response::respond_not_found(request),
    }
}
