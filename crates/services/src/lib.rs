#![forbid(unsafe_code)]

pub mod app_services;
pub mod chat_service;
pub mod countdown;
pub mod error;
pub mod progress_service;
pub mod quiz_service;

pub use app_services::AppServices;
pub use chat_service::{ChatConfig, ChatService};
pub use countdown::Countdown;
pub use error::{AppServicesError, ChatError, ProgressError, QuizServiceError};
pub use progress_service::{ProgressService, SubjectProgress};
pub use quiz_service::{QuizRun, QuizService};
