use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to read {path}: {reason}")]
    StorageRead { path: String, reason: String },
    #[error("failed to write {path}: {reason}")]
    StorageWrite { path: String, reason: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("message id space exhausted")]
    IdsExhausted,
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn read(path: impl std::fmt::Display, reason: impl std::fmt::Display) -> Self {
        Self::StorageRead { path: path.to_string(), reason: reason.to_string() }
    }

    pub fn write(path: impl std::fmt::Display, reason: impl std::fmt::Display) -> Self {
        Self::StorageWrite { path: path.to_string(), reason: reason.to_string() }
    }

    pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound(_)) }
}
