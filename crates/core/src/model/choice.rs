use std::collections::HashSet;

use thiserror::Error;

/// Number of options offered for every question.
pub const CHOICE_COUNT: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChoiceSetError {
    #[error("duplicate option {0}")]
    Duplicate(i32),
}

/// Ordered multiple-choice options for one question, all distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceSet([i32; CHOICE_COUNT]);

impl ChoiceSet {
    /// Wrap four values as a choice set.
    ///
    /// # Errors
    ///
    /// Returns `ChoiceSetError::Duplicate` if any value appears twice.
    pub fn new(values: [i32; CHOICE_COUNT]) -> Result<Self, ChoiceSetError> {
        let mut seen = HashSet::with_capacity(CHOICE_COUNT);
        for value in values {
            if !seen.insert(value) {
                return Err(ChoiceSetError::Duplicate(value));
            }
        }
        Ok(Self(values))
    }

    pub(crate) fn from_distinct(values: [i32; CHOICE_COUNT]) -> Self {
        debug_assert!(Self::new(values).is_ok());
        Self(values)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }

    #[must_use]
    pub fn contains(&self, value: i32) -> bool {
        self.0.contains(&value)
    }

    #[must_use]
    pub fn position(&self, value: i32) -> Option<usize> {
        self.0.iter().position(|v| *v == value)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<i32> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicates() {
        assert_eq!(
            ChoiceSet::new([1, 2, 2, 3]),
            Err(ChoiceSetError::Duplicate(2))
        );
    }

    #[test]
    fn lookups_follow_order() {
        let set = ChoiceSet::new([9, 4, 7, 0]).unwrap();
        assert_eq!(set.position(7), Some(2));
        assert_eq!(set.get(0), Some(9));
        assert_eq!(set.get(4), None);
        assert!(!set.contains(5));
    }
}
