use natours_core::error::CoreError;

/// Errors raised by a store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique index rejected the write. `name` is the offending tour name.
    #[error("Duplicate tour name '{name}'")]
    DuplicateKey { name: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The pipeline is not well formed.
    #[error("Invalid pipeline: {0}")]
    InvalidPipeline(String),

    /// A stored row could not be mapped back to a record.
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Map a write error, turning a violation of `uq_tours_name` into
    /// [`StoreError::DuplicateKey`].
    pub(crate) fn from_write(err: sqlx::Error, name: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some("uq_tours_name")
            {
                return Self::DuplicateKey {
                    name: name.to_string(),
                };
            }
        }
        Self::Database(err)
    }
}

impl From<CoreError> for StoreError {
    /// Pipeline evaluation is the only core call a store makes.
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::InvalidPipeline(msg),
            other => Self::Corrupt(other.to_string()),
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { name } => CoreError::DuplicateKey {
                field: "name",
                value: name,
            },
            StoreError::InvalidPipeline(msg) => CoreError::Validation(msg),
            StoreError::Database(e) => CoreError::Store(e.to_string()),
            StoreError::Corrupt(msg) => CoreError::Internal(msg),
        }
    }
}
