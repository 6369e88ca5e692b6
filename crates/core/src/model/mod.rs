mod account;
mod chat;
mod choice;
mod question;
mod score;
mod subject;

pub use account::{
    Account, AccountDraft, AccountError, AccountMode, is_valid_email, is_valid_password,
};
pub use chat::{ChatMessage, ChatRole, ChatTranscript};
pub use choice::{CHOICE_COUNT, ChoiceSet, ChoiceSetError};
pub use question::Question;
pub use score::{ScoreRecord, ScoreRecordError};
pub use subject::{RhsRange, Subject, SubjectConfig, SubjectConfigError, UnknownSubject};
