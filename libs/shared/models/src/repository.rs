use thiserror::Error;

/// Failure reported by a storage adapter, independent of the backing store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("storage request failed: {0}")]
    Request(String),

    #[error("storage request timed out: {0}")]
    Timeout(String),

    #[error("failed to decode stored {entity}: {message}")]
    Decode { entity: &'static str, message: String },
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        RepositoryError::NotFound { entity, id: id.to_string() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }
}
