use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{ScoreRecord, Subject, SubjectConfig};
use quiz_core::{AnswerOutcome, QuizMode, QuizSession, ShareSummary, TickOutcome};
use storage::repository::{KeyValueStore, ScoreRepository};

use crate::countdown::Countdown;
use crate::error::QuizServiceError;

/// A quiz being played: the session plus its countdown, if timed.
pub struct QuizRun {
    session: QuizSession,
    countdown: Option<Countdown>,
    persisted: Option<bool>,
}

impl QuizRun {
    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.session.is_ended()
    }

    /// `Some(true)` once the final score was written, `Some(false)` if the
    /// write failed, `None` while the quiz is still running.
    #[must_use]
    pub fn persisted(&self) -> Option<bool> {
        self.persisted
    }

    #[must_use]
    pub fn share_summary(&self) -> Option<ShareSummary> {
        ShareSummary::from_session(&self.session)
    }

    /// Resolves on each countdown tick.
    ///
    /// Never resolves for untimed runs or once the countdown is cancelled, so
    /// it can sit in a `select!` next to user input.
    pub async fn next_tick(&mut self) {
        if let Some(countdown) = self.countdown.as_mut() {
            if countdown.tick().await.is_some() {
                return;
            }
        }
        std::future::pending::<()>().await;
    }

    /// Stop the countdown without ending the session (screen torn down, mode switched).
    pub fn cancel_countdown(&mut self) {
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.cancel();
        }
    }

    #[must_use]
    pub fn countdown_active(&self) -> bool {
        self.countdown.as_ref().is_some_and(|c| !c.is_cancelled())
    }
}

/// Runs quiz sessions and persists their final score.
#[derive(Clone)]
pub struct QuizService {
    store: Arc<dyn KeyValueStore>,
    question_count: usize,
    tick_period: Duration,
}

impl QuizService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            question_count: SubjectConfig::DEFAULT_QUESTION_COUNT,
            tick_period: Countdown::PERIOD,
        }
    }

    #[must_use]
    pub fn with_question_count(mut self, count: usize) -> Self {
        self.question_count = count;
        self
    }

    #[must_use]
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Configuration used for `subject` by this service.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Config` if the configured question count is zero.
    pub fn config_for(&self, subject: Subject) -> Result<SubjectConfig, QuizServiceError> {
        Ok(SubjectConfig::for_subject(subject).with_question_count(self.question_count)?)
    }

    /// Start a quiz for `subject`; timed quizzes begin counting down immediately.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError` if the configuration is invalid.
    pub fn start(&self, subject: Subject, mode: QuizMode) -> Result<QuizRun, QuizServiceError> {
        self.start_session(QuizSession::new(self.config_for(subject)?), mode)
    }

    /// Start a quiz with deterministic draws.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError` if the configuration is invalid.
    pub fn start_seeded(
        &self,
        subject: Subject,
        mode: QuizMode,
        seed: u64,
    ) -> Result<QuizRun, QuizServiceError> {
        self.start_session(QuizSession::with_seed(self.config_for(subject)?, seed), mode)
    }

    fn start_session(
        &self,
        mut session: QuizSession,
        mode: QuizMode,
    ) -> Result<QuizRun, QuizServiceError> {
        session.start(mode)?;
        let countdown = match mode {
            QuizMode::Timed => Some(Countdown::start(self.tick_period)),
            QuizMode::Untimed => None,
        };
        tracing::info!(
            subject = %session.subject(),
            ?mode,
            questions = session.questions().len(),
            "quiz started"
        );
        Ok(QuizRun {
            session,
            countdown,
            persisted: None,
        })
    }

    /// Answer the current question; finishing the quiz persists the score.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` if the quiz is not in progress.
    pub async fn submit_answer(
        &self,
        run: &mut QuizRun,
        selected: i32,
    ) -> Result<AnswerOutcome, QuizServiceError> {
        let outcome = run.session.submit_answer(selected)?;
        if outcome.ended {
            self.finish(run).await;
        }
        Ok(outcome)
    }

    /// Apply one countdown tick; expiry persists the score.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` for untimed or finished quizzes.
    pub async fn tick(&self, run: &mut QuizRun) -> Result<TickOutcome, QuizServiceError> {
        let outcome = run.session.tick()?;
        tracing::debug!(?outcome, "countdown tick");
        if outcome == TickOutcome::Expired {
            self.finish(run).await;
        }
        Ok(outcome)
    }

    async fn finish(&self, run: &mut QuizRun) {
        run.cancel_countdown();
        let Some(record) = run.session.score_record() else {
            return;
        };
        let subject = run.session.subject();
        tracing::info!(
            %subject,
            score = record.score(),
            total = record.total(),
            reason = ?run.session.end_reason(),
            "quiz ended"
        );
        run.persisted = Some(self.persist(subject, &record).await);
    }

    // Best effort: a failed write is logged and the session stays ended.
    async fn persist(&self, subject: Subject, record: &ScoreRecord) -> bool {
        match self.store.save_score(subject, record).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%subject, error = %err, "failed to save quiz score");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quiz_core::{SessionError, SessionState, TIMED_SECONDS};
    use storage::repository::{InMemoryStore, StorageError};

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("offline".into()))
        }
    }

    fn wrong_choice(run: &QuizRun) -> i32 {
        let answer = run.session().current_question().unwrap().answer();
        run.session()
            .choices()
            .unwrap()
            .iter()
            .find(|v| *v != answer)
            .unwrap()
    }

    #[tokio::test]
    async fn finishing_untimed_quiz_saves_score() {
        let store = InMemoryStore::new();
        let service = QuizService::new(Arc::new(store.clone()));
        let mut run = service
            .start_seeded(Subject::Addition, QuizMode::Untimed, 3)
            .unwrap();
        assert!(!run.countdown_active());

        let answer = run.session().current_question().unwrap().answer();
        service.submit_answer(&mut run, answer).await.unwrap();
        let wrong = wrong_choice(&run);
        service.submit_answer(&mut run, wrong).await.unwrap();
        assert_eq!(run.persisted(), None);
        let answer = run.session().current_question().unwrap().answer();
        let outcome = service.submit_answer(&mut run, answer).await.unwrap();

        assert!(outcome.ended);
        assert_eq!(run.persisted(), Some(true));
        assert_eq!(
            store.load_score(Subject::Addition).await.unwrap(),
            Some(ScoreRecord::new(2, 3).unwrap())
        );
    }

    #[tokio::test]
    async fn storage_failure_does_not_block_ending() {
        let service = QuizService::new(Arc::new(BrokenStore)).with_question_count(1);
        let mut run = service
            .start_seeded(Subject::Multiplication, QuizMode::Untimed, 8)
            .unwrap();
        let answer = run.session().current_question().unwrap().answer();

        let outcome = service.submit_answer(&mut run, answer).await.unwrap();
        assert!(outcome.ended);
        assert_eq!(run.session().state(), SessionState::Ended);
        assert_eq!(run.session().score(), 1);
        assert_eq!(run.persisted(), Some(false));
    }

    #[tokio::test]
    async fn answering_after_end_is_rejected() {
        let service = QuizService::new(Arc::new(InMemoryStore::new())).with_question_count(1);
        let mut run = service
            .start_seeded(Subject::Subtraction, QuizMode::Untimed, 2)
            .unwrap();
        let answer = run.session().current_question().unwrap().answer();
        service.submit_answer(&mut run, answer).await.unwrap();

        let err = service.submit_answer(&mut run, answer).await.unwrap_err();
        assert!(matches!(
            err,
            QuizServiceError::Session(SessionError::NotInProgress)
        ));
        assert_eq!(run.session().score(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timed_quiz_expires_after_thirty_ticks() {
        let store = InMemoryStore::new();
        let service = QuizService::new(Arc::new(store.clone()));
        let mut run = service
            .start_seeded(Subject::Addition, QuizMode::Timed, 4)
            .unwrap();
        assert!(run.countdown_active());

        let mut ticks = 0;
        while !run.is_ended() {
            run.next_tick().await;
            service.tick(&mut run).await.unwrap();
            ticks += 1;
        }

        assert_eq!(ticks, TIMED_SECONDS);
        assert!(!run.countdown_active());
        assert_eq!(run.session().score(), 0);
        assert_eq!(
            store.load_score(Subject::Addition).await.unwrap(),
            Some(ScoreRecord::new(0, 3).unwrap())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn completing_timed_quiz_cancels_countdown() {
        let service = QuizService::new(Arc::new(InMemoryStore::new())).with_question_count(2);
        let mut run = service
            .start_seeded(Subject::Addition, QuizMode::Timed, 6)
            .unwrap();

        run.next_tick().await;
        service.tick(&mut run).await.unwrap();
        while let Some(answer) = run.session().current_question().map(|q| q.answer()) {
            service.submit_answer(&mut run, answer).await.unwrap();
        }

        assert!(!run.countdown_active());
        assert_eq!(run.session().remaining_seconds(), Some(TIMED_SECONDS - 1));
        let waited = tokio::time::timeout(Duration::from_secs(5), run.next_tick()).await;
        assert!(waited.is_err());
        assert!(run.share_summary().unwrap().text().contains("Time Left: 29s"));
    }

    #[test]
    fn zero_question_count_is_a_config_error() {
        let service = QuizService::new(Arc::new(InMemoryStore::new())).with_question_count(0);
        assert!(matches!(
            service.start(Subject::Addition, QuizMode::Untimed),
            Err(QuizServiceError::Config(_))
        ));
    }
}
