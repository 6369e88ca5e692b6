use async_trait::async_trait;
use quiz_core::model::{ScoreRecord, Subject};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Durable string key-value store, the only persistence the quizzes need.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Typed access to per-subject score records on top of a `KeyValueStore`.
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Overwrite the score record for `subject`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the write fails.
    async fn save_score(&self, subject: Subject, record: &ScoreRecord) -> Result<(), StorageError>;

    /// Load the score record for `subject`, `None` if never written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value is malformed.
    async fn load_score(&self, subject: Subject) -> Result<Option<ScoreRecord>, StorageError>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> ScoreRepository for T {
    async fn save_score(&self, subject: Subject, record: &ScoreRecord) -> Result<(), StorageError> {
        let value = serde_json::to_string(record)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.set(&subject.score_key(), &value).await
    }

    async fn load_score(&self, subject: Subject) -> Result<Option<ScoreRecord>, StorageError> {
        let Some(raw) = self.get(&subject.score_key()).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Store handle behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
        Self { kv }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_score_under_subject_key() {
        let store = InMemoryStore::new();
        let record = ScoreRecord::new(2, 3).unwrap();
        store.save_score(Subject::Addition, &record).await.unwrap();

        let raw = store.get("additionScore").await.unwrap();
        assert_eq!(raw.as_deref(), Some(r#"{"score":2,"total":3}"#));
        assert_eq!(
            store.load_score(Subject::Addition).await.unwrap(),
            Some(record)
        );
        assert_eq!(store.load_score(Subject::Subtraction).await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_overwrites_previous_record() {
        let storage = Storage::in_memory();
        let kv = storage.kv.as_ref();
        kv.save_score(Subject::Multiplication, &ScoreRecord::new(1, 3).unwrap())
            .await
            .unwrap();
        kv.save_score(Subject::Multiplication, &ScoreRecord::new(3, 3).unwrap())
            .await
            .unwrap();
        let loaded = kv.load_score(Subject::Multiplication).await.unwrap();
        assert_eq!(loaded.map(|r| r.score()), Some(3));
    }

    #[tokio::test]
    async fn malformed_record_is_a_serialization_error() {
        let store = InMemoryStore::new();
        store.set("subtractionScore", "not json").await.unwrap();
        let err = store.load_score(Subject::Subtraction).await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
