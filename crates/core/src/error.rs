use thiserror::Error;

use crate::model::{AccountError, ChoiceSetError, ScoreRecordError, SubjectConfigError};
use crate::puzzle::PuzzleError;
use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    SubjectConfig(#[from] SubjectConfigError),
    #[error(transparent)]
    ChoiceSet(#[from] ChoiceSetError),
    #[error(transparent)]
    ScoreRecord(#[from] ScoreRecordError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Puzzle(#[from] PuzzleError),
    #[error(transparent)]
    Account(#[from] AccountError),
}
