use std::sync::Arc;

use quiz_core::model::Subject;
use storage::repository::Storage;

use crate::chat_service::ChatService;
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;
use crate::quiz_service::QuizService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    quiz: Arc<QuizService>,
    progress: Arc<ProgressService>,
    chat: Arc<ChatService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails, the question
    /// count is zero, or the chat endpoint in the environment is invalid.
    pub async fn new_sqlite(db_url: &str, question_count: usize) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(&storage, question_count, ChatService::from_env()?)
    }

    /// Build services over an existing storage handle.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Quiz` if `question_count` is zero.
    pub fn from_storage(
        storage: &Storage,
        question_count: usize,
        chat: ChatService,
    ) -> Result<Self, AppServicesError> {
        let quiz = QuizService::new(Arc::clone(&storage.kv)).with_question_count(question_count);
        quiz.config_for(Subject::Addition)?;
        let quiz = Arc::new(quiz);
        let progress = Arc::new(ProgressService::new(Arc::clone(&storage.kv)));

        Ok(Self {
            quiz,
            progress,
            chat: Arc::new(chat),
        })
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn chat(&self) -> Arc<ChatService> {
        Arc::clone(&self.chat)
    }
}
