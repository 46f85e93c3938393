//! Response tracking
//!
//! A `ResponseSet` is the respondent's partial answer sheet: a fixed slot per
//! question index holding the chosen raw value, if any.

use crate::error::ScreeningError;
use crate::types::{MAX_RESPONSE, QUESTION_COUNT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Partial mapping from question index (1-10) to raw response (0-3)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<u8, u8>", into = "BTreeMap<u8, u8>")]
pub struct ResponseSet {
    values: [Option<u8>; QUESTION_COUNT],
}

impl ResponseSet {
    /// Create an empty response set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a response set from `(index, value)` pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ScreeningError>
    where
        I: IntoIterator<Item = (u8, u8)>,
    {
        let mut set = Self::new();
        for (index, value) in pairs {
            set.set(index, value)?;
        }
        Ok(set)
    }

    /// Check that an answer is acceptable without recording it
    pub fn validate(index: u8, value: u8) -> Result<(), ScreeningError> {
        if Self::slot(index).is_none() || value > MAX_RESPONSE {
            return Err(ScreeningError::OutOfRange { index, value });
        }
        Ok(())
    }

    /// Record an answer, overwriting any prior answer for the same question
    pub fn set(&mut self, index: u8, value: u8) -> Result<(), ScreeningError> {
        Self::validate(index, value)?;
        if let Some(slot) = Self::slot(index) {
            self.values[slot] = Some(value);
        }
        Ok(())
    }

    pub fn get(&self, index: u8) -> Option<u8> {
        Self::slot(index).and_then(|slot| self.values[slot])
    }

    /// Remove the answer for a question
    pub fn clear(&mut self, index: u8) -> Result<(), ScreeningError> {
        let slot = Self::slot(index).ok_or(ScreeningError::InvalidIndex(index))?;
        self.values[slot] = None;
        Ok(())
    }

    pub fn is_answered(&self, index: u8) -> bool {
        self.get(index).is_some()
    }

    /// True iff all 10 questions have an answer
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    pub fn answered_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// `answered_count / 10`, in [0, 1]
    pub fn progress_fraction(&self) -> f64 {
        self.answered_count() as f64 / QUESTION_COUNT as f64
    }

    /// Indices still without an answer, in order
    pub fn unanswered(&self) -> Vec<u8> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_none())
            .map(|(slot, _)| slot as u8 + 1)
            .collect()
    }

    /// Answered `(index, value)` pairs, in index order
    pub fn answered(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(slot, v)| v.map(|value| (slot as u8 + 1, value)))
    }

    fn slot(index: u8) -> Option<usize> {
        match index as usize {
            i @ 1..=QUESTION_COUNT => Some(i - 1),
            _ => None,
        }
    }
}

impl TryFrom<BTreeMap<u8, u8>> for ResponseSet {
    type Error = ScreeningError;

    fn try_from(map: BTreeMap<u8, u8>) -> Result<Self, Self::Error> {
        Self::from_pairs(map)
    }
}

impl From<ResponseSet> for BTreeMap<u8, u8> {
    fn from(set: ResponseSet) -> Self {
        set.answered().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_and_get() {
        let mut set = ResponseSet::new();
        set.set(3, 2).unwrap();
        assert_eq!(set.get(3), Some(2));
        assert_eq!(set.get(4), None);
        assert_eq!(set.answered_count(), 1);
    }

    #[test]
    fn test_set_overwrites() {
        let mut set = ResponseSet::new();
        set.set(1, 0).unwrap();
        set.set(1, 3).unwrap();
        assert_eq!(set.get(1), Some(3));
        assert_eq!(set.answered_count(), 1);
    }

    #[test]
    fn test_repeated_identical_set_is_idempotent() {
        let mut set = ResponseSet::new();
        set.set(5, 1).unwrap();
        let before = set.clone();
        let progress_before = set.progress_fraction();

        set.set(5, 1).unwrap();
        assert_eq!(set, before);
        assert_eq!(set.progress_fraction(), progress_before);
    }

    #[test]
    fn test_out_of_range_leaves_set_unchanged() {
        let mut set = ResponseSet::new();
        set.set(2, 1).unwrap();
        let before = set.clone();

        assert!(matches!(
            set.set(0, 1),
            Err(ScreeningError::OutOfRange { index: 0, value: 1 })
        ));
        assert!(matches!(
            set.set(11, 1),
            Err(ScreeningError::OutOfRange { index: 11, .. })
        ));
        assert!(matches!(
            set.set(2, 4),
            Err(ScreeningError::OutOfRange { index: 2, value: 4 })
        ));
        assert_eq!(set, before);
    }

    #[test]
    fn test_completeness_and_unanswered() {
        let mut set = ResponseSet::new();
        assert_eq!(set.unanswered(), (1..=10).collect::<Vec<u8>>());

        for index in 1..=9 {
            set.set(index, 0).unwrap();
        }
        assert!(!set.is_complete());
        assert_eq!(set.unanswered(), vec![10]);

        set.set(10, 0).unwrap();
        assert!(set.is_complete());
        assert!(set.unanswered().is_empty());
    }

    #[test]
    fn test_progress_is_monotonic_until_clear() {
        let mut set = ResponseSet::new();
        let mut last = set.progress_fraction();
        assert_eq!(last, 0.0);

        for (index, value) in [(4, 1), (4, 2), (1, 3), (7, 0), (1, 3)] {
            set.set(index, value).unwrap();
            let now = set.progress_fraction();
            assert!(now >= last);
            last = now;
        }
        assert_eq!(last, 0.3);

        set.clear(4).unwrap();
        assert_eq!(set.progress_fraction(), 0.2);
    }

    #[test]
    fn test_progress_reaches_one_only_when_complete() {
        let mut set = ResponseSet::new();
        for index in 1..=10 {
            assert!(set.progress_fraction() < 1.0);
            set.set(index, 1).unwrap();
        }
        assert_eq!(set.progress_fraction(), 1.0);
        assert!(set.is_complete());
    }

    #[test]
    fn test_clear_invalid_index() {
        let mut set = ResponseSet::new();
        assert!(matches!(set.clear(0), Err(ScreeningError::InvalidIndex(0))));
    }

    #[test]
    fn test_json_is_keyed_by_index() {
        let set = ResponseSet::from_pairs([(1, 3), (10, 0)]).unwrap();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"1":3,"10":0}"#);

        let loaded: ResponseSet = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, set);
    }

    #[test]
    fn test_json_rejects_out_of_range_value() {
        let result: Result<ResponseSet, _> = serde_json::from_str(r#"{"1":3,"2":7}"#);
        assert!(result.is_err());
    }
}
