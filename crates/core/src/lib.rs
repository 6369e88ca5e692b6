#![forbid(unsafe_code)]

pub mod error;
pub mod generator;
pub mod model;
pub mod options;
pub mod puzzle;
pub mod session;
pub mod share;

pub use error::Error;
pub use session::{
    AnswerOutcome, EndReason, QuizMode, QuizSession, SessionError, SessionProgress, SessionState,
    TIMED_SECONDS, TickOutcome,
};
pub use share::ShareSummary;
