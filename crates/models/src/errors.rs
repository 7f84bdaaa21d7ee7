use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// Client input that does not form a valid resource.
    #[error("{0}")]
    Validation(String),
    /// A stored record that no longer decodes into a valid resource.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl ModelError {
    pub fn missing(resource: &str, field: &str) -> Self {
        Self::Validation(format!("Invalid {resource}: missing {field}"))
    }
}
