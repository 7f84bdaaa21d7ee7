use serde::{Deserialize, Serialize};

pub const SERVICE_NAME: &str = "Pet Demo REST API Service";

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Payload of the root URL: what this service is and where its collections live.
#[derive(Serialize, Debug, Clone)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: String,
    pub paths: Vec<String>,
}

impl ServiceInfo {
    pub fn new(version: &str, paths: &[&str]) -> Self {
        Self {
            name: SERVICE_NAME,
            version: version.to_string(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
        }
    }
}
