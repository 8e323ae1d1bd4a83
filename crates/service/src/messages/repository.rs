use async_trait::async_trait;

use super::domain::Collection;
use crate::errors::ServiceError;

/// Whole-collection persistence. Every call goes to the backing store; nothing
/// is cached between calls.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Load the full collection. A store that has never been written yields an
    /// empty collection.
    async fn load(&self) -> Result<Collection, ServiceError>;
    /// Replace the stored collection with `collection`.
    async fn save(&self, collection: &Collection) -> Result<(), ServiceError>;
}
