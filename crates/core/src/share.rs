use std::fmt;

use url::Url;

use crate::model::Subject;
use crate::session::{QuizMode, QuizSession};

pub const SHARE_INTENT_URL: &str = "https://twitter.com/intent/tweet";

/// Shareable result of a finished quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareSummary {
    subject: Subject,
    score: u32,
    total: u32,
    remaining_seconds: Option<u32>,
}

impl ShareSummary {
    /// Summary of an ended session; `None` while the session is still running.
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Option<Self> {
        let record = session.score_record()?;
        let remaining_seconds = match session.mode() {
            Some(QuizMode::Timed) => session.remaining_seconds(),
            _ => None,
        };
        Some(Self {
            subject: session.subject(),
            score: record.score(),
            total: record.total(),
            remaining_seconds,
        })
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.to_string()
    }

    /// Tweet-intent URL carrying the form-encoded summary text.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the intent base URL cannot be parsed.
    pub fn intent_url(&self) -> Result<Url, url::ParseError> {
        Url::parse_with_params(SHARE_INTENT_URL, &[("text", self.text())])
    }
}

impl fmt::Display for ShareSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "I scored {} out of {} on the {} Quiz!",
            self.score,
            self.total,
            self.subject.title()
        )?;
        if let Some(seconds) = self.remaining_seconds {
            write!(f, " Time Left: {seconds}s")?;
        }
        f.write_str(" #MathQuiz #MyScore")
    }
}
