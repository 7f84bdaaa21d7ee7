use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
};
use serde_json::Value;

use crate::errors::JsonApiError;

/// A JSON request body, accepted only with `Content-Type: application/json`.
///
/// Parameters such as `charset` are allowed; any other media type is a 415
/// and unparsable JSON a 400.
#[derive(Debug)]
pub struct JsonBody(pub Value);

fn is_json_content(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json_content(req.headers()) {
            return Err(JsonApiError::from_status(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                Some("Content-Type must be application/json".into()),
            ));
        }
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| JsonApiError::from_status(StatusCode::BAD_REQUEST, Some(e.body_text())))?;
        let value = serde_json::from_slice(&bytes).map_err(|e| {
            JsonApiError::from_status(StatusCode::BAD_REQUEST, Some(format!("Invalid JSON in request body: {e}")))
        })?;
        Ok(JsonBody(value))
    }
}
