//! Progress derivation
//!
//! Progress is always recomputed from the current `ResponseSet`; nothing here
//! holds state.

use crate::responses::ResponseSet;
use crate::types::QUESTION_COUNT;
use serde::{Deserialize, Serialize};

/// Answered/current status of one question, as shown in a navigation strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionStatus {
    pub index: u8,
    pub answered: bool,
    pub current: bool,
}

/// Point-in-time view of a respondent's progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Number of answered questions
    pub answered: usize,
    /// Number of questions in the questionnaire
    pub total: usize,
    /// `answered / total` (0-1)
    pub fraction: f64,
    pub complete: bool,
    pub statuses: Vec<QuestionStatus>,
}

/// Derives progress from response state
pub struct ProgressTracker;

impl ProgressTracker {
    /// Completion fraction (0-1)
    pub fn fraction(responses: &ResponseSet) -> f64 {
        responses.progress_fraction()
    }

    /// Completion percentage (0-100)
    pub fn percent(responses: &ResponseSet) -> f64 {
        Self::fraction(responses) * 100.0
    }

    /// Per-question status; `cursor` marks the question currently shown
    pub fn statuses(responses: &ResponseSet, cursor: Option<u8>) -> Vec<QuestionStatus> {
        (1..=QUESTION_COUNT as u8)
            .map(|index| QuestionStatus {
                index,
                answered: responses.is_answered(index),
                current: cursor == Some(index),
            })
            .collect()
    }

    pub fn snapshot(responses: &ResponseSet, cursor: Option<u8>) -> Progress {
        Progress {
            answered: responses.answered_count(),
            total: QUESTION_COUNT,
            fraction: Self::fraction(responses),
            complete: responses.is_complete(),
            statuses: Self::statuses(responses, cursor),
        }
    }
}
