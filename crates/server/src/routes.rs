use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::HOST, HeaderMap, StatusCode},
    middleware,
    routing::{get, put},
    Json, Router,
};
use common::types::{Health, ServiceInfo};
use service::{counters::CounterService, pets::PetService, storage::StoreHandle, Services};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use crate::errors::JsonApiError;
use crate::middleware::json_errors;
use crate::openapi::ApiDoc;

pub mod counters;
pub mod pets;

pub const API_VERSION: &str = "1.0";

/// Shared by every handler; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub pets: Arc<PetService>,
    pub counters: Arc<CounterService>,
    pub store: StoreHandle,
}

impl From<Services> for AppState {
    fn from(s: Services) -> Self {
        Self { pets: s.pets, counters: s.counters, store: s.store }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AppOptions {
    /// Mounts `DELETE /pets` and `DELETE /counters`.
    pub testing: bool,
}

/// Absolute URL for `path` on the host the client addressed; the bare path
/// when the request carried no usable `Host`.
pub(crate) fn absolute_url(headers: &HeaderMap, path: &str) -> String {
    match headers.get(HOST).and_then(|h| h.to_str().ok()) {
        Some(host) if !host.is_empty() => format!("http://{host}{path}"),
        _ => path.to_string(),
    }
}

#[utoipa::path(get, path = "/", tag = "meta", responses((status = 200, description = "Service name, version and collection URLs")))]
pub async fn index(headers: HeaderMap) -> Json<ServiceInfo> {
    let pets = absolute_url(&headers, "/pets");
    let counters = absolute_url(&headers, "/counters");
    Json(ServiceInfo::new(API_VERSION, &[pets.as_str(), counters.as_str()]))
}

#[utoipa::path(
    get, path = "/health", tag = "meta",
    responses(
        (status = 200, description = "Store reachable", body = crate::openapi::HealthResponse),
        (status = 503, description = "Store unreachable", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<Health>, JsonApiError> {
    state.store.ping().await.map_err(service::ServiceError::from)?;
    Ok(Json(Health { status: "ok" }))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn not_found() -> JsonApiError {
    JsonApiError::from_status(StatusCode::NOT_FOUND, Some("The requested URL was not found on the server".into()))
}

/// Build the application router with logging, CORS and JSON error bodies.
pub fn build_router(state: AppState, opts: AppOptions) -> Router {
    let mut pet_collection = get(pets::list).post(pets::create);
    let mut counter_collection = get(counters::list);
    if opts.testing {
        pet_collection = pet_collection.delete(pets::remove_all);
        counter_collection = counter_collection.delete(counters::remove_all);
    }

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/openapi.json", get(openapi_json))
        .route("/pets", pet_collection)
        .route("/pets/:id", get(pets::get).put(pets::update).delete(pets::delete))
        .route("/counters", counter_collection)
        .route(
            "/counters/:name",
            get(counters::get)
                .post(counters::create)
                .put(counters::increment)
                .delete(counters::delete),
        )
        .route("/counters/:name/reset", put(counters::reset))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(json_errors))
        .layer(CorsLayer::very_permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
