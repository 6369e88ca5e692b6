use serde::Serialize;

use crate::model::Subject;

/// A single arithmetic problem and its expected answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    subject: Subject,
    lhs: i32,
    rhs: i32,
    prompt: String,
    answer: i32,
}

impl Question {
    #[must_use]
    pub fn new(subject: Subject, lhs: i32, rhs: i32) -> Self {
        Self {
            subject,
            lhs,
            rhs,
            prompt: format!("{lhs} {} {rhs}", subject.symbol()),
            answer: subject.apply(lhs, rhs),
        }
    }

    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    #[must_use]
    pub fn operands(&self) -> (i32, i32) {
        (self.lhs, self.rhs)
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn answer(&self) -> i32 {
        self.answer
    }

    #[must_use]
    pub fn is_correct(&self, selected: i32) -> bool {
        selected == self.answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_prompt_from_operator() {
        let q = Question::new(Subject::Multiplication, 3, 4);
        assert_eq!(q.prompt(), "3 × 4");
        assert_eq!(q.answer(), 12);

        let q = Question::new(Subject::Subtraction, 10, 4);
        assert_eq!(q.prompt(), "10 - 4");
        assert!(q.is_correct(6));
        assert!(!q.is_correct(14));
    }
}
