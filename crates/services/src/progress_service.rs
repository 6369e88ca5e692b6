use std::sync::Arc;

use quiz_core::model::{ScoreRecord, Subject};
use storage::repository::{KeyValueStore, ScoreRepository, StorageError};

use crate::error::ProgressError;

/// Last saved result for one subject, as shown on the account screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectProgress {
    pub subject: Subject,
    pub record: Option<ScoreRecord>,
}

#[derive(Clone)]
pub struct ProgressService {
    store: Arc<dyn KeyValueStore>,
}

impl ProgressService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the last score for one subject.
    ///
    /// A malformed stored record is logged and reported as missing.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the store cannot be read.
    pub async fn load(&self, subject: Subject) -> Result<SubjectProgress, ProgressError> {
        let record = match self.store.load_score(subject).await {
            Ok(record) => record,
            Err(StorageError::Serialization(reason)) => {
                tracing::warn!(%subject, %reason, "ignoring malformed score record");
                None
            }
            Err(err) => return Err(err.into()),
        };
        Ok(SubjectProgress { subject, record })
    }

    /// Load the last score for every subject, in display order.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the store cannot be read.
    pub async fn load_all(&self) -> Result<Vec<SubjectProgress>, ProgressError> {
        let mut progress = Vec::with_capacity(Subject::ALL.len());
        for subject in Subject::ALL {
            progress.push(self.load(subject).await?);
        }
        Ok(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryStore;

    #[tokio::test]
    async fn reports_saved_and_missing_subjects() {
        let store = InMemoryStore::new();
        store
            .save_score(Subject::Subtraction, &ScoreRecord::new(1, 3).unwrap())
            .await
            .unwrap();
        store.set("multiplicationScore", "garbage").await.unwrap();

        let progress = ProgressService::new(Arc::new(store))
            .load_all()
            .await
            .unwrap();

        assert_eq!(
            progress,
            vec![
                SubjectProgress {
                    subject: Subject::Addition,
                    record: None
                },
                SubjectProgress {
                    subject: Subject::Subtraction,
                    record: Some(ScoreRecord::new(1, 3).unwrap())
                },
                SubjectProgress {
                    subject: Subject::Multiplication,
                    record: None
                },
            ]
        );
    }
}
