pub mod errors;
pub mod extract;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod startup;

pub use routes::{build_router, AppOptions, AppState};
pub use startup::run;
