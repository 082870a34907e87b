//! HTTP response handlers.

use std::io::Read;

use anyhow::Result;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::embed::serve::{INDEX_HTML, ViewerVars};
use crate::utils::mime::types::{HTML, JSON, PLAIN};

/// Respond with the viewer page.
pub fn respond_index(request: Request, ws_port: u16) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 200, HTML);
    }
    let body = INDEX_HTML.render(&ViewerVars { ws_port });
    send_body(request, 200, HTML, body.into_bytes())
}

/// Respond with a JSON body.
pub fn respond_json(request: Request, status: u16, body: &serde_json::Value) -> Result<()> {
    let body = serde_json::to_vec(body)?;
    send_body(request, status, JSON, body)
}

pub fn respond_not_found(request: Request) -> Result<()> {
    send_body(request, 404, PLAIN, b"404 Not Found".to_vec())
}

pub fn respond_method_not_allowed(request: Request) -> Result<()> {
    send_body(request, 405, PLAIN, b"405 Method Not Allowed".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec())
}

/// Read the request body as UTF-8, up to `limit` bytes.
pub fn read_body(request: &mut Request, limit: u64) -> Result<String> {
    let mut body = String::new();
    request.as_reader().take(limit).read_to_string(&mut body)?;
    Ok(body)
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response = with_content_type(Response::empty(StatusCode(status)), content_type);
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = Response::from_data(body).with_status_code(StatusCode(status));
    request.respond(with_content_type(response, content_type))?;
    Ok(())
}

fn with_content_type<R: Read>(response: Response<R>, content_type: &'static str) -> Response<R> {
    match Header::from_bytes("Content-Type", content_type) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}
