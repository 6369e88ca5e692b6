use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreRecordError {
    #[error("score ({score}) exceeds total ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },
}

/// Last result for a quiz subject, persisted as `{"score": n, "total": m}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersistedScore")]
pub struct ScoreRecord {
    score: u32,
    total: u32,
}

#[derive(Deserialize)]
struct PersistedScore {
    score: u32,
    total: u32,
}

impl TryFrom<PersistedScore> for ScoreRecord {
    type Error = ScoreRecordError;

    fn try_from(raw: PersistedScore) -> Result<Self, Self::Error> {
        Self::new(raw.score, raw.total)
    }
}

impl ScoreRecord {
    /// # Errors
    ///
    /// Returns `ScoreRecordError::ScoreExceedsTotal` if `score > total`.
    pub fn new(score: u32, total: u32) -> Result<Self, ScoreRecordError> {
        if score > total {
            return Err(ScoreRecordError::ScoreExceedsTotal { score, total });
        }
        Ok(Self { score, total })
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Whole-number percentage, rounded down. Zero when `total` is zero.
    #[must_use]
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        self.score * 100 / self.total
    }
}
