//! Shared building blocks for the petstore crates: logging bootstrap and
//! small response types that more than one crate serializes.

pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn service_info_serializes_paths() {
        let info = types::ServiceInfo::new("1.0", &["/pets", "/counters"]);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["name"], types::SERVICE_NAME);
        assert_eq!(json["version"], "1.0");
        assert_eq!(json["paths"][1], "/counters");
    }
}
