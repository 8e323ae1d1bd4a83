use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use super::domain::{now_timestamp, Message, NewMessage};
use super::repository::MessageRepository;
use crate::errors::ServiceError;
use crate::IdStrategy;

/// List/create/delete on top of a [`MessageRepository`].
///
/// Each call loads the whole collection, optionally mutates it and saves it
/// back. The guard is held for the whole cycle so overlapping mutations in
/// this process cannot lose each other's writes.
pub struct MessageService {
    repo: Arc<dyn MessageRepository>,
    id_strategy: IdStrategy,
    guard: RwLock<()>,
}

impl MessageService {
    pub fn new(repo: Arc<dyn MessageRepository>, id_strategy: IdStrategy) -> Self {
        Self { repo, id_strategy, guard: RwLock::new(()) }
    }

    /// All messages in stored order.
    pub async fn list(&self) -> Result<Vec<Message>, ServiceError> {
        let _read = self.guard.read().await;
        let collection = self.repo.load().await?;
        Ok(collection.messages)
    }

    /// Append a message with a fresh id and timestamp and persist it.
    pub async fn create(&self, input: NewMessage) -> Result<Message, ServiceError> {
        let _write = self.guard.write().await;
        let mut collection = self.repo.load().await?;
        let message = Message {
            id: collection.allocate_id(self.id_strategy)?,
            user: input.user,
            text: input.text,
            timestamp: now_timestamp(),
        };
        collection.messages.push(message.clone());
        self.repo.save(&collection).await?;
        info!(id = message.id, total = collection.messages.len(), "message created");
        Ok(message)
    }

    /// Remove every message with `id`. `None` stands for an identifier that did
    /// not parse as a number and therefore matches nothing.
    ///
    /// Returns the number of removed messages; nothing removed is
    /// [`ServiceError::NotFound`] and nothing is written.
    pub async fn delete(&self, id: Option<i64>) -> Result<usize, ServiceError> {
        let _write = self.guard.write().await;
        let mut collection = self.repo.load().await?;
        let removed = id.map(|id| collection.remove_by_id(id)).unwrap_or(0);
        if removed == 0 {
            debug!(?id, "delete matched no message");
            return Err(ServiceError::not_found("message"));
        }
        self.repo.save(&collection).await?;
        info!(?id, removed, "message deleted");
        Ok(removed)
    }
}
