use axum::{
    extract::{Path, Query, State},
    http::{header::LOCATION, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use models::pet::{Model as Pet, PetFilter};
use serde::Deserialize;
use service::ServiceError;

use super::{absolute_url, AppState};
use crate::errors::JsonApiError;
use crate::extract::JsonBody;

/// Optional exact-match filters, AND-combined.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct PetQuery {
    pub name: Option<String>,
    pub category: Option<String>,
    /// `true` or `false`
    pub available: Option<String>,
    /// `Male`, `Female` or `Unknown`
    pub gender: Option<String>,
}

#[utoipa::path(
    get, path = "/pets", tag = "pets",
    params(PetQuery),
    responses(
        (status = 200, description = "Matching pets", body = [crate::openapi::PetDoc]),
        (status = 400, description = "Bad filter value", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(State(state): State<AppState>, Query(q): Query<PetQuery>) -> Result<Json<Vec<Pet>>, JsonApiError> {
    let filter = PetFilter::parse(q.name, q.category, q.available.as_deref(), q.gender.as_deref())
        .map_err(ServiceError::from)?;
    Ok(Json(state.pets.find_by_filter(&filter).await?))
}

#[utoipa::path(
    get, path = "/pets/{id}", tag = "pets",
    params(("id" = i32, Path, description = "Pet id")),
    responses(
        (status = 200, description = "The pet", body = crate::openapi::PetDoc),
        (status = 404, description = "No such pet", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<Pet>, JsonApiError> {
    Ok(Json(state.pets.find(id).await?))
}

#[utoipa::path(
    post, path = "/pets", tag = "pets",
    request_body = crate::openapi::PetInputDoc,
    responses(
        (status = 201, description = "Created; Location points at the new pet", body = crate::openapi::PetDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 415, description = "Body is not application/json", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, JsonApiError> {
    let pet = state.pets.create(&body).await?;
    let location = absolute_url(&headers, &format!("/pets/{}", pet.id));
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(pet)))
}

#[utoipa::path(
    put, path = "/pets/{id}", tag = "pets",
    params(("id" = i32, Path, description = "Pet id")),
    request_body = crate::openapi::PetInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::PetDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 404, description = "No such pet", body = crate::openapi::ErrorDoc),
        (status = 415, description = "Body is not application/json", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    JsonBody(body): JsonBody,
) -> Result<Json<Pet>, JsonApiError> {
    Ok(Json(state.pets.update(id, &body).await?))
}

#[utoipa::path(
    delete, path = "/pets/{id}", tag = "pets",
    params(("id" = i32, Path, description = "Pet id")),
    responses((status = 204, description = "Deleted, or never existed"))
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    state.pets.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_all(State(state): State<AppState>) -> Result<StatusCode, JsonApiError> {
    state.pets.remove_all().await?;
    Ok(StatusCode::NO_CONTENT)
}
