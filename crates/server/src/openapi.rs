use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(ToSchema)]
pub struct ErrorDoc {
    pub status: u16,
    pub error: String,
    pub message: String,
}

#[derive(ToSchema)]
pub struct PetDoc {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub available: bool,
    /// `Male`, `Female` or `Unknown`
    pub gender: String,
}

/// Any `id` in the body is ignored. `gender` defaults to `Unknown`.
#[derive(ToSchema)]
pub struct PetInputDoc {
    pub name: String,
    pub category: String,
    pub available: bool,
    pub gender: Option<String>,
}

#[derive(ToSchema)]
pub struct CounterDoc {
    pub name: String,
    pub counter: i64,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::index,
        crate::routes::health,
        crate::routes::pets::list,
        crate::routes::pets::get,
        crate::routes::pets::create,
        crate::routes::pets::update,
        crate::routes::pets::delete,
        crate::routes::counters::list,
        crate::routes::counters::get,
        crate::routes::counters::create,
        crate::routes::counters::increment,
        crate::routes::counters::reset,
        crate::routes::counters::delete,
    ),
    components(schemas(HealthResponse, ErrorDoc, PetDoc, PetInputDoc, CounterDoc)),
    tags((name = "meta"), (name = "pets"), (name = "counters"))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_resource_path() {
        let doc = ApiDoc::openapi();
        for path in ["/pets", "/pets/{id}", "/counters", "/counters/{name}", "/counters/{name}/reset"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
