#![cfg(test)]
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::messages::{Collection, MessageRepository};

/// In-memory repository with switchable failures for service tests.
#[derive(Default)]
pub struct MemoryRepository {
    inner: Mutex<Collection>,
    fail_load: AtomicBool,
    fail_save: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_load(&self, on: bool) {
        self.fail_load.store(on, Ordering::SeqCst);
    }

    pub fn fail_save(&self, on: bool) {
        self.fail_save.store(on, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Collection {
        self.inner.lock().expect("memory repo poisoned").clone()
    }
}

#[async_trait]
impl MessageRepository for MemoryRepository {
    async fn load(&self) -> Result<Collection, ServiceError> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(ServiceError::read("memory", "injected read failure"));
        }
        let snapshot = self.snapshot();
        // give other tasks a chance to interleave between load and save
        tokio::task::yield_now().await;
        Ok(snapshot)
    }

    async fn save(&self, collection: &Collection) -> Result<(), ServiceError> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(ServiceError::write("memory", "injected write failure"));
        }
        *self.inner.lock().expect("memory repo poisoned") = collection.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
