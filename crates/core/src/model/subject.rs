use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubjectConfigError {
    #[error("question count must be > 0")]
    InvalidQuestionCount,

    #[error("left operand range {min}..={max} is empty")]
    InvalidOperandRange { min: i32, max: i32 },

    #[error("right operand range {min}..={max} is empty")]
    InvalidRhsRange { min: i32, max: i32 },

    #[error("sum cap {cap} leaves no room for a right operand when the left operand is {lhs_max}")]
    InvalidSumCap { cap: i32, lhs_max: i32 },

    #[error("right operand bounded by the left operand needs a left operand >= 1")]
    InvalidDifferenceBounds,

    #[error("distractor range must be > 0")]
    InvalidDistractorRange,

    #[error("operand bounds allow answers outside the i32 range")]
    AnswerOverflow,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown subject: {0}")]
pub struct UnknownSubject(pub String);

//
// ─── SUBJECT ───────────────────────────────────────────────────────────────────
//

/// One of the arithmetic operations a quiz can drill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Addition,
    Subtraction,
    Multiplication,
}

impl Subject {
    pub const ALL: [Subject; 3] = [
        Subject::Addition,
        Subject::Subtraction,
        Subject::Multiplication,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Addition => "addition",
            Subject::Subtraction => "subtraction",
            Subject::Multiplication => "multiplication",
        }
    }

    /// Capitalized name used in user-facing copy ("Addition Quiz").
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Subject::Addition => "Addition",
            Subject::Subtraction => "Subtraction",
            Subject::Multiplication => "Multiplication",
        }
    }

    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Subject::Addition => '+',
            Subject::Subtraction => '-',
            Subject::Multiplication => '×',
        }
    }

    /// Key under which the last score for this subject is persisted.
    #[must_use]
    pub fn score_key(self) -> String {
        format!("{}Score", self.as_str())
    }

    /// `lhs op rhs`, `None` if the result does not fit in `i32`.
    #[must_use]
    pub fn checked_apply(self, lhs: i32, rhs: i32) -> Option<i32> {
        match self {
            Subject::Addition => lhs.checked_add(rhs),
            Subject::Subtraction => lhs.checked_sub(rhs),
            Subject::Multiplication => lhs.checked_mul(rhs),
        }
    }

    /// `lhs op rhs` for operands drawn from a validated [`SubjectConfig`].
    #[must_use]
    pub fn apply(self, lhs: i32, rhs: i32) -> i32 {
        match self {
            Subject::Addition => lhs + rhs,
            Subject::Subtraction => lhs - rhs,
            Subject::Multiplication => lhs * rhs,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = UnknownSubject;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "addition" | "add" | "+" => Ok(Subject::Addition),
            "subtraction" | "sub" | "-" => Ok(Subject::Subtraction),
            "multiplication" | "mul" | "x" | "×" => Ok(Subject::Multiplication),
            _ => Err(UnknownSubject(raw.to_string())),
        }
    }
}

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// How the right operand is drawn once the left operand is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RhsRange {
    /// Uniform over `min..=max`, independent of the left operand.
    Fixed { min: i32, max: i32 },
    /// Uniform over `1..=cap - lhs`, keeping `lhs + rhs <= cap`.
    SumAtMost { cap: i32 },
    /// Uniform over `1..=lhs`, keeping `lhs - rhs >= 0`.
    AtMostLhs,
}

impl RhsRange {
    /// Inclusive bounds of the right operand for a given left operand.
    #[must_use]
    pub fn bounds_for(self, lhs: i32) -> (i32, i32) {
        match self {
            RhsRange::Fixed { min, max } => (min, max),
            RhsRange::SumAtMost { cap } => (1, cap.saturating_sub(lhs)),
            RhsRange::AtMostLhs => (1, lhs),
        }
    }
}

/// Parameters of one quiz subject: operand bounds, distractor range, quiz length.
///
/// Values are validated on construction so generation never has to fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectConfig {
    subject: Subject,
    lhs_min: i32,
    lhs_max: i32,
    rhs: RhsRange,
    distractor_range: i32,
    question_count: usize,
}

impl SubjectConfig {
    pub const DEFAULT_QUESTION_COUNT: usize = 3;

    /// Build a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `SubjectConfigError` if any operand range is empty, an answer
    /// could overflow `i32`, the distractor range is not positive, or the
    /// question count is zero.
    pub fn new(
        subject: Subject,
        lhs_min: i32,
        lhs_max: i32,
        rhs: RhsRange,
        distractor_range: i32,
        question_count: usize,
    ) -> Result<Self, SubjectConfigError> {
        if question_count == 0 {
            return Err(SubjectConfigError::InvalidQuestionCount);
        }
        if lhs_min > lhs_max {
            return Err(SubjectConfigError::InvalidOperandRange {
                min: lhs_min,
                max: lhs_max,
            });
        }
        let (rhs_min, rhs_max) = rhs_extent(rhs, lhs_min, lhs_max)?;
        // Every answer lies inside the bounding box, so its corners bound the results.
        for lhs in [lhs_min, lhs_max] {
            for rhs in [rhs_min, rhs_max] {
                subject
                    .checked_apply(lhs, rhs)
                    .ok_or(SubjectConfigError::AnswerOverflow)?;
            }
        }
        if distractor_range <= 0 {
            return Err(SubjectConfigError::InvalidDistractorRange);
        }

        Ok(Self {
            subject,
            lhs_min,
            lhs_max,
            rhs,
            distractor_range,
            question_count,
        })
    }

    /// Default bounds for each subject.
    ///
    /// - addition: `a` in 1..=10, `b` keeps the sum at most 19, distractors from 0..20
    /// - subtraction: `a` in 1..=19, `b` in 1..=a, distractors from 0..20
    /// - multiplication: `a`, `b` in 1..=10, distractors from 0..100
    #[must_use]
    pub fn for_subject(subject: Subject) -> Self {
        let (lhs_min, lhs_max, rhs, distractor_range) = match subject {
            Subject::Addition => (1, 10, RhsRange::SumAtMost { cap: 19 }, 20),
            Subject::Subtraction => (1, 19, RhsRange::AtMostLhs, 20),
            Subject::Multiplication => (1, 10, RhsRange::Fixed { min: 1, max: 10 }, 100),
        };
        Self {
            subject,
            lhs_min,
            lhs_max,
            rhs,
            distractor_range,
            question_count: Self::DEFAULT_QUESTION_COUNT,
        }
    }

    /// Same configuration with a different quiz length.
    ///
    /// # Errors
    ///
    /// Returns `SubjectConfigError::InvalidQuestionCount` if `count` is zero.
    pub fn with_question_count(mut self, count: usize) -> Result<Self, SubjectConfigError> {
        if count == 0 {
            return Err(SubjectConfigError::InvalidQuestionCount);
        }
        self.question_count = count;
        Ok(self)
    }

    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    #[must_use]
    pub fn lhs_bounds(&self) -> (i32, i32) {
        (self.lhs_min, self.lhs_max)
    }

    #[must_use]
    pub fn rhs(&self) -> RhsRange {
        self.rhs
    }

    #[must_use]
    pub fn distractor_range(&self) -> i32 {
        self.distractor_range
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.question_count
    }
}

/// Smallest and largest right operand over every allowed left operand.
fn rhs_extent(
    rhs: RhsRange,
    lhs_min: i32,
    lhs_max: i32,
) -> Result<(i32, i32), SubjectConfigError> {
    match rhs {
        RhsRange::Fixed { min, max } if min > max => {
            Err(SubjectConfigError::InvalidRhsRange { min, max })
        }
        RhsRange::Fixed { min, max } => Ok((min, max)),
        RhsRange::SumAtMost { cap } => {
            let widest = cap
                .checked_sub(lhs_min)
                .ok_or(SubjectConfigError::AnswerOverflow)?;
            let narrowest = cap
                .checked_sub(lhs_max)
                .ok_or(SubjectConfigError::AnswerOverflow)?;
            if narrowest < 1 {
                return Err(SubjectConfigError::InvalidSumCap { cap, lhs_max });
            }
            Ok((1, widest))
        }
        RhsRange::AtMostLhs if lhs_min < 1 => Err(SubjectConfigError::InvalidDifferenceBounds),
        RhsRange::AtMostLhs => Ok((1, lhs_max)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_keys_match_persisted_layout() {
        assert_eq!(Subject::Addition.score_key(), "additionScore");
        assert_eq!(Subject::Subtraction.score_key(), "subtractionScore");
        assert_eq!(Subject::Multiplication.score_key(), "multiplicationScore");
    }

    #[test]
    fn parses_subject_aliases() {
        assert_eq!("Addition".parse::<Subject>(), Ok(Subject::Addition));
        assert_eq!(" sub ".parse::<Subject>(), Ok(Subject::Subtraction));
        assert_eq!("×".parse::<Subject>(), Ok(Subject::Multiplication));
        assert!("division".parse::<Subject>().is_err());
    }

    #[test]
    fn defaults_validate() {
        for subject in Subject::ALL {
            let config = SubjectConfig::for_subject(subject);
            let (min, max) = config.lhs_bounds();
            let rebuilt = SubjectConfig::new(
                subject,
                min,
                max,
                config.rhs(),
                config.distractor_range(),
                config.question_count(),
            );
            assert_eq!(rebuilt, Ok(config));
        }
    }

    #[test]
    fn rejects_sum_cap_without_room() {
        let err = SubjectConfig::new(
            Subject::Addition,
            1,
            10,
            RhsRange::SumAtMost { cap: 10 },
            20,
            3,
        )
        .unwrap_err();
        assert_eq!(err, SubjectConfigError::InvalidSumCap { cap: 10, lhs_max: 10 });
    }

    #[test]
    fn rejects_zero_questions() {
        let err = SubjectConfig::for_subject(Subject::Addition)
            .with_question_count(0)
            .unwrap_err();
        assert_eq!(err, SubjectConfigError::InvalidQuestionCount);
    }

    #[test]
    fn rejects_products_that_overflow() {
        let err = SubjectConfig::new(
            Subject::Multiplication,
            100_000,
            100_000,
            RhsRange::Fixed {
                min: 100_000,
                max: 100_000,
            },
            100,
            1,
        )
        .unwrap_err();
        assert_eq!(err, SubjectConfigError::AnswerOverflow);

        let wide = SubjectConfig::new(
            Subject::Multiplication,
            1,
            40_000,
            RhsRange::Fixed { min: 1, max: 40_000 },
            100,
            1,
        );
        assert!(wide.is_ok());
    }

    #[test]
    fn sum_cap_near_i32_max_is_rejected_without_panicking() {
        let err = SubjectConfig::new(
            Subject::Addition,
            -5,
            -1,
            RhsRange::SumAtMost { cap: i32::MAX },
            20,
            1,
        )
        .unwrap_err();
        assert_eq!(err, SubjectConfigError::AnswerOverflow);
    }

    #[test]
    fn negative_bounds_that_fit_are_accepted() {
        let config = SubjectConfig::new(
            Subject::Subtraction,
            -50,
            50,
            RhsRange::Fixed { min: -50, max: 50 },
            20,
            3,
        )
        .unwrap();
        assert_eq!(config.lhs_bounds(), (-50, 50));
        assert_eq!(Subject::Subtraction.checked_apply(i32::MIN, 1), None);
        assert_eq!(Subject::Addition.checked_apply(2, 3), Some(5));
    }
}
