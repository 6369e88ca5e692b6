use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generator;
use crate::model::{ChoiceSet, Question, ScoreRecord, Subject, SubjectConfig};
use crate::options;

/// Countdown length for timed sessions.
pub const TIMED_SECONDS: u32 = 30;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session already started")]
    AlreadyStarted,

    #[error("session is not in progress")]
    NotInProgress,

    #[error("session has no countdown")]
    Untimed,
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    Untimed,
    Timed,
}

impl QuizMode {
    #[must_use]
    pub fn time_limit(self) -> Option<u32> {
        match self {
            QuizMode::Untimed => None,
            QuizMode::Timed => Some(TIMED_SECONDS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Every question was answered.
    Completed,
    /// The countdown reached zero first.
    TimeExpired,
}

/// What happened to a single submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub question: Question,
    pub selected: i32,
    pub is_correct: bool,
    pub ended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running { remaining_seconds: u32 },
    Expired,
}

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One run of a quiz for a subject.
///
/// Moves `NotStarted -> InProgress -> Ended` and never leaves `Ended`.
/// Timing is driven from outside through [`QuizSession::tick`], and
/// persistence of the final score is left to the caller.
pub struct QuizSession {
    config: SubjectConfig,
    rng: StdRng,
    mode: Option<QuizMode>,
    questions: Vec<Question>,
    choices: Option<ChoiceSet>,
    current: usize,
    score: u32,
    remaining_seconds: Option<u32>,
    selected: Option<i32>,
    state: SessionState,
    end_reason: Option<EndReason>,
}

impl QuizSession {
    #[must_use]
    pub fn new(config: SubjectConfig) -> Self {
        Self::with_rng(config, StdRng::from_rng(&mut rand::rng()))
    }

    /// Session with deterministic question and option draws.
    #[must_use]
    pub fn with_seed(config: SubjectConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SubjectConfig, rng: StdRng) -> Self {
        Self {
            config,
            rng,
            mode: None,
            questions: Vec::new(),
            choices: None,
            current: 0,
            score: 0,
            remaining_seconds: None,
            selected: None,
            state: SessionState::NotStarted,
            end_reason: None,
        }
    }

    /// Generate questions and begin answering.
    ///
    /// Timed sessions start with [`TIMED_SECONDS`] on the clock; the caller is
    /// expected to call [`QuizSession::tick`] once per second from then on.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyStarted` if the session has left `NotStarted`.
    pub fn start(&mut self, mode: QuizMode) -> Result<(), SessionError> {
        if self.state != SessionState::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }

        self.questions =
            generator::generate(self.config.question_count(), &self.config, &mut self.rng);
        self.mode = Some(mode);
        self.current = 0;
        self.score = 0;
        self.selected = None;
        self.remaining_seconds = mode.time_limit();
        self.state = SessionState::InProgress;
        self.refresh_choices();
        Ok(())
    }

    /// Advance the countdown by one second.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` outside `InProgress` and
    /// `SessionError::Untimed` for untimed sessions. Neither changes state.
    pub fn tick(&mut self) -> Result<TickOutcome, SessionError> {
        if self.state != SessionState::InProgress {
            return Err(SessionError::NotInProgress);
        }
        let Some(remaining) = self.remaining_seconds else {
            return Err(SessionError::Untimed);
        };

        let remaining = remaining.saturating_sub(1);
        self.remaining_seconds = Some(remaining);
        if remaining == 0 {
            self.end(EndReason::TimeExpired);
            return Ok(TickOutcome::Expired);
        }
        Ok(TickOutcome::Running {
            remaining_seconds: remaining,
        })
    }

    /// Answer the current question and advance immediately.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` if the session has not started or
    /// has ended; score and index are left untouched.
    pub fn submit_answer(&mut self, selected: i32) -> Result<AnswerOutcome, SessionError> {
        if self.state != SessionState::InProgress {
            return Err(SessionError::NotInProgress);
        }
        let Some(question) = self.questions.get(self.current).cloned() else {
            return Err(SessionError::NotInProgress);
        };

        self.selected = Some(selected);
        let is_correct = question.is_correct(selected);
        if is_correct {
            self.score += 1;
        }

        self.current += 1;
        if self.current >= self.questions.len() {
            self.end(EndReason::Completed);
        } else {
            self.selected = None;
            self.refresh_choices();
        }

        Ok(AnswerOutcome {
            question,
            selected,
            is_correct,
            ended: self.is_ended(),
        })
    }

    fn refresh_choices(&mut self) {
        self.choices = self.questions.get(self.current).map(|q| {
            options::synthesize(q.answer(), self.config.distractor_range(), &mut self.rng)
        });
    }

    fn end(&mut self, reason: EndReason) {
        self.state = SessionState::Ended;
        self.end_reason = Some(reason);
        self.choices = None;
    }

    #[must_use]
    pub fn subject(&self) -> Subject {
        self.config.subject()
    }

    #[must_use]
    pub fn config(&self) -> &SubjectConfig {
        &self.config
    }

    #[must_use]
    pub fn mode(&self) -> Option<QuizMode> {
        self.mode
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.state == SessionState::Ended
    }

    #[must_use]
    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question awaiting an answer, if the session is in progress.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.state == SessionState::InProgress {
            self.questions.get(self.current)
        } else {
            None
        }
    }

    #[must_use]
    pub fn choices(&self) -> Option<&ChoiceSet> {
        self.choices.as_ref()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        u32::try_from(self.questions.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> Option<u32> {
        self.remaining_seconds
    }

    #[must_use]
    pub fn selected(&self) -> Option<i32> {
        self.selected
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.questions.len();
        SessionProgress {
            total,
            answered: self.current,
            remaining: total.saturating_sub(self.current),
            is_complete: self.is_ended(),
        }
    }

    /// Record to persist once the session has ended.
    #[must_use]
    pub fn score_record(&self) -> Option<ScoreRecord> {
        if !self.is_ended() {
            return None;
        }
        ScoreRecord::new(self.score, self.total()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(subject: Subject, count: usize) -> QuizSession {
        let config = SubjectConfig::for_subject(subject)
            .with_question_count(count)
            .unwrap();
        QuizSession::with_seed(config, 99)
    }

    fn wrong_answer(session: &QuizSession) -> i32 {
        let answer = session.current_question().unwrap().answer();
        session
            .choices()
            .unwrap()
            .iter()
            .find(|v| *v != answer)
            .unwrap()
    }

    #[test]
    fn start_initializes_in_progress_state() {
        let mut s = session(Subject::Addition, 3);
        assert_eq!(s.state(), SessionState::NotStarted);
        assert!(s.current_question().is_none());

        s.start(QuizMode::Untimed).unwrap();
        assert_eq!(s.state(), SessionState::InProgress);
        assert_eq!(s.questions().len(), 3);
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.score(), 0);
        assert_eq!(s.remaining_seconds(), None);

        let answer = s.current_question().unwrap().answer();
        assert!(s.choices().unwrap().contains(answer));
    }

    #[test]
    fn cannot_start_twice() {
        let mut s = session(Subject::Addition, 3);
        s.start(QuizMode::Timed).unwrap();
        assert_eq!(s.start(QuizMode::Untimed), Err(SessionError::AlreadyStarted));
        assert_eq!(s.mode(), Some(QuizMode::Timed));
    }

    #[test]
    fn correct_wrong_correct_scores_two_of_three() {
        let mut s = session(Subject::Addition, 3);
        s.start(QuizMode::Untimed).unwrap();

        let first = s.current_question().unwrap().answer();
        assert!(s.submit_answer(first).unwrap().is_correct);

        let wrong = wrong_answer(&s);
        let outcome = s.submit_answer(wrong).unwrap();
        assert!(!outcome.is_correct);
        assert!(!outcome.ended);

        let third = s.current_question().unwrap().answer();
        let outcome = s.submit_answer(third).unwrap();
        assert!(outcome.is_correct);
        assert!(outcome.ended);

        assert_eq!(s.state(), SessionState::Ended);
        assert_eq!(s.end_reason(), Some(EndReason::Completed));
        assert_eq!(s.score_record(), Some(ScoreRecord::new(2, 3).unwrap()));
    }

    #[test]
    fn submit_after_end_changes_nothing() {
        let mut s = session(Subject::Multiplication, 1);
        s.start(QuizMode::Untimed).unwrap();
        let answer = s.current_question().unwrap().answer();
        s.submit_answer(answer).unwrap();
        assert!(s.is_ended());

        let (score, index) = (s.score(), s.current_index());
        assert_eq!(s.submit_answer(answer), Err(SessionError::NotInProgress));
        assert_eq!(s.score(), score);
        assert_eq!(s.current_index(), index);
    }

    #[test]
    fn submit_before_start_is_rejected() {
        let mut s = session(Subject::Subtraction, 3);
        assert_eq!(s.submit_answer(1), Err(SessionError::NotInProgress));
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn score_is_monotonic_and_bounded() {
        let mut s = session(Subject::Subtraction, 10);
        s.start(QuizMode::Untimed).unwrap();
        let mut last = 0;
        let mut i = 0;
        while !s.is_ended() {
            let pick = if i % 3 == 0 {
                wrong_answer(&s)
            } else {
                s.current_question().unwrap().answer()
            };
            s.submit_answer(pick).unwrap();
            assert!(s.score() >= last);
            assert!(s.score() <= s.total());
            assert!(s.current_index() <= s.questions().len());
            last = s.score();
            i += 1;
        }
        assert_eq!(i, 10);
    }

    #[test]
    fn thirty_ticks_expire_a_timed_session() {
        let mut s = session(Subject::Addition, 3);
        s.start(QuizMode::Timed).unwrap();
        assert_eq!(s.remaining_seconds(), Some(TIMED_SECONDS));

        for expected in (1..TIMED_SECONDS).rev() {
            assert_eq!(
                s.tick(),
                Ok(TickOutcome::Running {
                    remaining_seconds: expected
                })
            );
        }
        assert_eq!(s.tick(), Ok(TickOutcome::Expired));
        assert!(s.is_ended());
        assert_eq!(s.end_reason(), Some(EndReason::TimeExpired));
        assert_eq!(s.score(), 0);
        assert_eq!(s.score_record(), Some(ScoreRecord::new(0, 3).unwrap()));
        assert_eq!(s.tick(), Err(SessionError::NotInProgress));
    }

    #[test]
    fn expiry_keeps_partial_score() {
        let mut s = session(Subject::Addition, 3);
        s.start(QuizMode::Timed).unwrap();
        let answer = s.current_question().unwrap().answer();
        s.submit_answer(answer).unwrap();
        for _ in 0..TIMED_SECONDS {
            let _ = s.tick();
        }
        assert!(s.is_ended());
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.score_record(), Some(ScoreRecord::new(1, 3).unwrap()));
        assert!(s.choices().is_none());
    }

    #[test]
    fn untimed_sessions_reject_ticks() {
        let mut s = session(Subject::Addition, 3);
        s.start(QuizMode::Untimed).unwrap();
        assert_eq!(s.tick(), Err(SessionError::Untimed));
        assert_eq!(s.state(), SessionState::InProgress);
    }

    #[test]
    fn choices_follow_the_current_question() {
        let mut s = session(Subject::Multiplication, 5);
        s.start(QuizMode::Untimed).unwrap();
        while let Some(question) = s.current_question().cloned() {
            let choices = s.choices().unwrap();
            assert!(choices.contains(question.answer()));
            assert_eq!(s.selected(), None);
            s.submit_answer(question.answer()).unwrap();
        }
        assert_eq!(s.score(), 5);
        assert_eq!(s.selected(), s.questions().last().map(Question::answer));
        assert_eq!(s.progress().remaining, 0);
    }

    #[test]
    fn same_seed_same_questions() {
        let config = SubjectConfig::for_subject(Subject::Addition);
        let mut a = QuizSession::with_seed(config.clone(), 5);
        let mut b = QuizSession::with_seed(config, 5);
        a.start(QuizMode::Untimed).unwrap();
        b.start(QuizMode::Untimed).unwrap();
        assert_eq!(a.questions(), b.questions());
        assert_eq!(a.choices(), b.choices());
    }
}
