use axum::{
    extract::{Path, State},
    http::{header::LOCATION, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use models::counter::Model as Counter;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::{absolute_url, AppState};
use crate::errors::JsonApiError;

/// Everything but RFC 3986 unreserved characters.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

#[utoipa::path(get, path = "/counters", tag = "counters", responses((status = 200, description = "All counters", body = [crate::openapi::CounterDoc])))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Counter>>, JsonApiError> {
    Ok(Json(state.counters.list().await?))
}

#[utoipa::path(
    get, path = "/counters/{name}", tag = "counters",
    params(("name" = String, Path, description = "Counter name")),
    responses(
        (status = 200, description = "The counter", body = crate::openapi::CounterDoc),
        (status = 404, description = "No such counter", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<Counter>, JsonApiError> {
    Ok(Json(state.counters.find(&name).await?))
}

#[utoipa::path(
    post, path = "/counters/{name}", tag = "counters",
    params(("name" = String, Path, description = "Counter name")),
    responses(
        (status = 201, description = "Created at zero", body = crate::openapi::CounterDoc),
        (status = 400, description = "Unusable name", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Name already taken", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, JsonApiError> {
    let counter = state.counters.create(&name).await?;
    let segment = utf8_percent_encode(&counter.name, PATH_SEGMENT);
    let location = absolute_url(&headers, &format!("/counters/{segment}"));
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(counter)))
}

#[utoipa::path(
    put, path = "/counters/{name}", tag = "counters",
    params(("name" = String, Path, description = "Counter name")),
    responses(
        (status = 200, description = "Incremented by one", body = crate::openapi::CounterDoc),
        (status = 404, description = "No such counter", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn increment(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<Counter>, JsonApiError> {
    Ok(Json(state.counters.increment(&name).await?))
}

#[utoipa::path(
    put, path = "/counters/{name}/reset", tag = "counters",
    params(("name" = String, Path, description = "Counter name")),
    responses(
        (status = 200, description = "Back to zero", body = crate::openapi::CounterDoc),
        (status = 404, description = "No such counter", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn reset(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<Counter>, JsonApiError> {
    Ok(Json(state.counters.reset(&name).await?))
}

#[utoipa::path(
    delete, path = "/counters/{name}", tag = "counters",
    params(("name" = String, Path, description = "Counter name")),
    responses((status = 204, description = "Deleted, or never existed"))
)]
pub async fn delete(State(state): State<AppState>, Path(name): Path<String>) -> Result<StatusCode, JsonApiError> {
    state.counters.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_all(State(state): State<AppState>) -> Result<StatusCode, JsonApiError> {
    state.counters.remove_all().await?;
    Ok(StatusCode::NO_CONTENT)
}
