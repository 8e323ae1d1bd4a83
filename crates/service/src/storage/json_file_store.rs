use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::messages::{Collection, MessageRepository};
use crate::CorruptPolicy;

/// JSON file-backed message collection.
///
/// Holds no state besides the path: every `load` reads the file from disk and
/// every `save` rewrites it completely, pretty-printed.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    file_path: PathBuf,
}

/// What [`JsonFileStore::initialize`] found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// No file existed; an empty collection was written.
    Created,
    /// A readable file was already there and left untouched.
    Existing { messages: usize },
    /// The file could not be parsed; it was copied to `backup` and replaced
    /// with an empty collection.
    ResetCorrupt { backup: PathBuf },
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// `Ok(None)` when the file does not exist, an error when it exists but
    /// cannot be read or parsed.
    async fn read_existing(&self) -> Result<Option<Collection>, ServiceError> {
        let path = self.file_path.display();
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ServiceError::read(&path, e)),
        };
        let collection = serde_json::from_slice(&bytes).map_err(|e| ServiceError::read(&path, e))?;
        Ok(Some(collection))
    }

    async fn write_collection(&self, collection: &Collection) -> Result<(), ServiceError> {
        let path = self.file_path.display();
        let data = serde_json::to_vec_pretty(collection).map_err(|e| ServiceError::write(&path, e))?;
        fs::write(&self.file_path, data).await.map_err(|e| ServiceError::write(&path, e))?;
        Ok(())
    }

    /// Prepare the backing file at process start.
    ///
    /// A missing file is created empty and a valid file is left alone. A file
    /// that exists but fails to load is handled per `policy`: `Fail` returns the
    /// read error untouched, `Reset` keeps a copy next to it and starts over.
    pub async fn initialize(&self, policy: CorruptPolicy) -> Result<InitOutcome, ServiceError> {
        match self.read_existing().await {
            Ok(None) => {
                self.write_collection(&Collection::default()).await?;
                info!(path = %self.file_path.display(), "created empty message store");
                Ok(InitOutcome::Created)
            }
            Ok(Some(collection)) => Ok(InitOutcome::Existing { messages: collection.messages.len() }),
            Err(e) => match policy {
                CorruptPolicy::Fail => Err(e),
                CorruptPolicy::Reset => {
                    let backup = self.backup_path();
                    fs::copy(&self.file_path, &backup)
                        .await
                        .map_err(|err| ServiceError::write(backup.display(), err))?;
                    warn!(
                        path = %self.file_path.display(),
                        backup = %backup.display(),
                        error = %e,
                        "message store unreadable; reset to empty"
                    );
                    self.write_collection(&Collection::default()).await?;
                    Ok(InitOutcome::ResetCorrupt { backup })
                }
            },
        }
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self.file_path.clone().into_os_string();
        name.push(format!(".corrupt-{}", Utc::now().timestamp_millis()));
        PathBuf::from(name)
    }
}

#[async_trait]
impl MessageRepository for JsonFileStore {
    async fn load(&self) -> Result<Collection, ServiceError> {
        Ok(self.read_existing().await?.unwrap_or_default())
    }

    async fn save(&self, collection: &Collection) -> Result<(), ServiceError> {
        self.write_collection(collection).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Message;
    use serde_json::json;
    use uuid::Uuid;

    fn tmp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{tag}_{}.json", Uuid::new_v4()))
    }

    fn sample() -> Collection {
        Collection {
            messages: vec![
                Message { id: 1, user: Some(json!("a")), text: Some(json!("hi")), timestamp: "2024-01-01T00:00:00.000Z".into() },
                Message { id: 2, user: None, text: Some(json!("anon")), timestamp: "2024-01-01T00:00:01.000Z".into() },
            ],
            next_id: None,
        }
    }

    #[tokio::test]
    async fn load_missing_file_is_empty_and_creates_nothing() -> anyhow::Result<()> {
        let tmp = tmp_path("json_store_missing");
        let store = JsonFileStore::new(&tmp);
        assert_eq!(store.load().await?, Collection::default());
        assert!(fs::metadata(&tmp).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn save_then_load_round_trips() -> anyhow::Result<()> {
        let tmp = tmp_path("json_store_roundtrip");
        let store = JsonFileStore::new(&tmp);
        let collection = sample();
        store.save(&collection).await?;
        assert_eq!(store.load().await?, collection);

        // pretty-printed, plain layout
        let raw = fs::read_to_string(&tmp).await?;
        assert!(raw.starts_with("{\n  \"messages\": ["));
        assert!(!raw.contains("next_id"));

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn malformed_file_is_a_read_error() -> anyhow::Result<()> {
        let tmp = tmp_path("json_store_malformed");
        fs::write(&tmp, b"{ not json").await?;
        let store = JsonFileStore::new(&tmp);
        assert!(matches!(store.load().await, Err(ServiceError::StorageRead { .. })));

        fs::write(&tmp, b"").await?;
        assert!(matches!(store.load().await, Err(ServiceError::StorageRead { .. })));

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn write_into_missing_directory_fails() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("json_store_nodir_{}", Uuid::new_v4()));
        let store = JsonFileStore::new(dir.join("messages.json"));
        assert!(matches!(
            store.save(&Collection::default()).await,
            Err(ServiceError::StorageWrite { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn initialize_creates_then_keeps_existing() -> anyhow::Result<()> {
        let tmp = tmp_path("json_store_init");
        let store = JsonFileStore::new(&tmp);
        assert_eq!(store.initialize(CorruptPolicy::Fail).await?, InitOutcome::Created);
        assert_eq!(fs::read_to_string(&tmp).await?, "{\n  \"messages\": []\n}");

        store.save(&sample()).await?;
        assert_eq!(
            store.initialize(CorruptPolicy::Fail).await?,
            InitOutcome::Existing { messages: 2 }
        );
        assert_eq!(store.load().await?, sample());

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn initialize_fail_policy_leaves_corrupt_file() -> anyhow::Result<()> {
        let tmp = tmp_path("json_store_corrupt_fail");
        fs::write(&tmp, b"[oops").await?;
        let store = JsonFileStore::new(&tmp);
        assert!(matches!(
            store.initialize(CorruptPolicy::Fail).await,
            Err(ServiceError::StorageRead { .. })
        ));
        assert_eq!(fs::read(&tmp).await?, b"[oops");

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn initialize_reset_policy_backs_up_and_empties() -> anyhow::Result<()> {
        let tmp = tmp_path("json_store_corrupt_reset");
        fs::write(&tmp, b"[oops").await?;
        let store = JsonFileStore::new(&tmp);
        let backup = match store.initialize(CorruptPolicy::Reset).await? {
            InitOutcome::ResetCorrupt { backup } => backup,
            other => panic!("expected reset, got {other:?}"),
        };
        assert_eq!(fs::read(&backup).await?, b"[oops");
        assert_eq!(store.load().await?, Collection::default());

        let _ = fs::remove_file(&tmp).await;
        let _ = fs::remove_file(&backup).await;
        Ok(())
    }
}
