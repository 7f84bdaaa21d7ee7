use axum::{
    body::to_bytes,
    extract::Request,
    http::header::{ALLOW, CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::JsonApiError;

const MAX_MESSAGE_BYTES: usize = 16 * 1024;

/// Rewrite error responses produced outside the handlers (unknown routes,
/// wrong methods, path and query rejections) into the JSON error body.
pub async fn json_errors(req: Request, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return res;
    }
    let is_json = res
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        return res;
    }

    let allow = res.headers().get(ALLOW).cloned();
    let message = to_bytes(res.into_body(), MAX_MESSAGE_BYTES)
        .await
        .ok()
        .and_then(|b| String::from_utf8(b.to_vec()).ok())
        .filter(|s| !s.trim().is_empty());
    let mut out = JsonApiError::from_status(status, message).into_response();
    if let Some(allow) = allow {
        out.headers_mut().insert(ALLOW, allow);
    }
    out
}
