//! JSON API over the hub.
//!
//! | Method | Path                     | Body / query             |
//! |--------|--------------------------|--------------------------|
//! | GET    | `/api/files`             |                          |
//! | POST   | `/api/files`             | `{"path", "active"?}`    |
//! | DELETE | `/api/files`             | `?path=` or `{"path"}`   |
//! | POST   | `/api/files/activate`    | `{"path"}`               |
//! | POST   | `/api/files/deactivate`  | `{"path"}`               |
//! | GET    | `/api/status`            |                          |
//!
//! Errors come back as `{"error": "..."}`.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use serde::Deserialize;
use serde_json::{Value, json};
use tiny_http::Method;

use crate::actor::hub::{Hub, HubError, TrackedFile};
use crate::reload::message::FileView;
use crate::utils::path::paths_equal;

/// Status code and JSON body of an API call.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    fn from_hub_error(err: &HubError) -> Self {
        Self::error(status_for(err), err.to_string())
    }
}

/// HTTP status for a failed hub operation.
pub fn status_for(err: &HubError) -> u16 {
    match err {
        HubError::NotFound(_) => 404,
        HubError::AlreadyTracked(_) => 409,
        HubError::Read { .. } | HubError::Render(_) => 422,
        HubError::Watch { .. } => 500,
    }
}

#[derive(Debug, Deserialize)]
struct PathRequest {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct AddRequest {
    path: PathBuf,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

/// Route one `/api/...` request.
pub fn handle(hub: &Hub, method: &Method, url: &str, body: &str) -> ApiResponse {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));

    match (method, path.trim_end_matches('/')) {
        (Method::Get, "/api/files") => list(hub),
        (Method::Post, "/api/files") => add(hub, body),
        (Method::Delete, "/api/files") => remove(hub, query, body),
        (Method::Post, "/api/files/activate") => {
            with_path(body, |path| hub.activate(path).map(|()| file_json(hub, path)))
        }
        (Method::Post, "/api/files/deactivate") => {
            with_path(body, |path| hub.deactivate(path).map(|()| file_json(hub, path)))
        }
        (Method::Get, "/api/status") => ApiResponse::ok(json!({
            "files": hub.file_count(),
            "clients": hub.client_count_blocking(),
        })),
        (_, "/api/files" | "/api/files/activate" | "/api/files/deactivate" | "/api/status") => {
            ApiResponse::error(405, format!("method {method} not allowed"))
        }
        (_, other) => ApiResponse::error(404, format!("no such endpoint: {other}")),
    }
}

fn list(hub: &Hub) -> ApiResponse {
    let files: Vec<FileView> = hub.list_files().iter().map(FileView::from).collect();
    ApiResponse::ok(json!(files))
}

fn add(hub: &Hub, body: &str) -> ApiResponse {
    let request: AddRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => return ApiResponse::error(400, format!("invalid request body: {e}")),
    };
    match hub.add_file(&request.path, request.active) {
        Ok(file) => ApiResponse {
            status: 201,
            body: view_json(&file),
        },
        Err(e) => ApiResponse::from_hub_error(&e),
    }
}

fn remove(hub: &Hub, query: &str, body: &str) -> ApiResponse {
    let path = match query_path(query) {
        Some(path) => path,
        None => match serde_json::from_str::<PathRequest>(body) {
            Ok(request) => request.path,
            Err(_) => return ApiResponse::error(400, "missing `path`"),
        },
    };
    match hub.remove_file(&path) {
        Ok(()) => ApiResponse::ok(json!({ "removed": path })),
        Err(e) => ApiResponse::from_hub_error(&e),
    }
}

/// Parse `{"path"}` and run `op` on it.
fn with_path(body: &str, op: impl FnOnce(&Path) -> Result<Value, HubError>) -> ApiResponse {
    let request: PathRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => return ApiResponse::error(400, format!("invalid request body: {e}")),
    };
    match op(&request.path) {
        Ok(body) => ApiResponse::ok(body),
        Err(e) => ApiResponse::from_hub_error(&e),
    }
}

/// Current state of one tracked file, or `null` if it went away meanwhile.
fn file_json(hub: &Hub, path: &Path) -> Value {
    hub.list_files()
        .iter()
        .find(|f| paths_equal(&f.path, path))
        .map_or(Value::Null, view_json)
}

fn view_json(file: &TrackedFile) -> Value {
    json!(FileView::from(file))
}

/// `path=<percent-encoded>` from a query string.
fn query_path(query: &str) -> Option<PathBuf> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "path")
        .map(|(_, value)| {
            let value = value.replace('+', " ");
            let decoded = percent_decode_str(&value).decode_utf8_lossy();
            PathBuf::from(decoded.as_ref())
        })
        .filter(|path| !path.as_os_str().is_empty())
}
