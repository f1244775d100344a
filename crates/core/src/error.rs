use crate::tour::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with key {key}")]
    NotFound { entity: &'static str, key: String },

    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    #[error("Duplicate key: {field} '{value}' already exists")]
    DuplicateKey { field: &'static str, value: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
