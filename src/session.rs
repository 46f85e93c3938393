//! Screening session orchestration
//!
//! A session is one respondent's single attempt at the questionnaire. It owns
//! the answer sheet and a navigation cursor, and moves from `InProgress` to
//! `Finalized` exactly once. Finalization runs the full pipeline:
//!
//! 1. CrisisDetector - check the self-harm item
//! 2. ScoringEngine - composite score with reverse scoring
//! 3. RiskClassifier - tier and recommendations
//!
//! and hands the caller an immutable `ScreeningResult`.

use crate::classifier::{Classification, RiskClassifier};
use crate::config::ScreeningConfig;
use crate::crisis::CrisisDetector;
use crate::error::ScreeningError;
use crate::progress::{Progress, ProgressTracker};
use crate::responses::ResponseSet;
use crate::scoring::{ItemScore, ScoringEngine};
use crate::types::{Question, RiskLevel, ScreeningResult, QUESTION_COUNT};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// Prefix of every result identifier
pub const RESULT_ID_PREFIX: &str = "epds_";

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    InProgress,
    Finalized,
}

/// One screening attempt
#[derive(Debug, Clone)]
pub struct ScreeningSession {
    config: Arc<ScreeningConfig>,
    responses: ResponseSet,
    cursor: u8,
    state: SessionState,
    started_at: DateTime<Utc>,
}

impl Default for ScreeningSession {
    fn default() -> Self {
        Self::new(ScreeningConfig::shared())
    }
}

impl ScreeningSession {
    /// Start a session against a shared configuration
    pub fn new(config: Arc<ScreeningConfig>) -> Self {
        Self {
            config,
            responses: ResponseSet::new(),
            cursor: 1,
            state: SessionState::InProgress,
            started_at: Utc::now(),
        }
    }

    pub fn config(&self) -> &ScreeningConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finalized(&self) -> bool {
        self.state == SessionState::Finalized
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn responses(&self) -> &ResponseSet {
        &self.responses
    }

    /// Index of the question currently shown
    pub fn cursor(&self) -> u8 {
        self.cursor
    }

    pub fn current_question(&self) -> Result<&Question, ScreeningError> {
        self.config.catalog().question_at(self.cursor)
    }

    /// Record an answer.
    ///
    /// Answering the question under the cursor advances the cursor, except on
    /// the last question.
    pub fn answer(&mut self, index: u8, value: u8) -> Result<(), ScreeningError> {
        self.ensure_in_progress()?;
        self.responses.set(index, value)?;
        trace!(index, value, "response recorded");

        if index == self.cursor && (index as usize) < QUESTION_COUNT {
            self.cursor += 1;
        }
        Ok(())
    }

    /// Record several answers at once.
    ///
    /// Every pair is validated before any is applied, so a bad pair leaves the
    /// session untouched. The cursor moves to the first unanswered question.
    pub fn answer_all<I>(&mut self, pairs: I) -> Result<(), ScreeningError>
    where
        I: IntoIterator<Item = (u8, u8)>,
    {
        self.ensure_in_progress()?;

        let pairs: Vec<(u8, u8)> = pairs.into_iter().collect();
        for &(index, value) in &pairs {
            ResponseSet::validate(index, value)?;
        }
        for (index, value) in pairs {
            self.responses.set(index, value)?;
        }

        self.cursor = self
            .responses
            .unanswered()
            .first()
            .copied()
            .unwrap_or(QUESTION_COUNT as u8);
        trace!(answered = self.responses.answered_count(), "bulk responses recorded");
        Ok(())
    }

    /// Remove an answer
    pub fn clear(&mut self, index: u8) -> Result<(), ScreeningError> {
        self.ensure_in_progress()?;
        self.responses.clear(index)
    }

    /// Move the cursor to a question
    pub fn go_to(&mut self, index: u8) -> Result<(), ScreeningError> {
        self.ensure_in_progress()?;
        self.config.catalog().question_at(index)?;
        self.cursor = index;
        Ok(())
    }

    /// Advance the cursor; returns the new position
    pub fn next_question(&mut self) -> Result<u8, ScreeningError> {
        self.ensure_in_progress()?;
        if (self.cursor as usize) < QUESTION_COUNT {
            self.cursor += 1;
        }
        Ok(self.cursor)
    }

    /// Step the cursor back; returns the new position
    pub fn previous_question(&mut self) -> Result<u8, ScreeningError> {
        self.ensure_in_progress()?;
        if self.cursor > 1 {
            self.cursor -= 1;
        }
        Ok(self.cursor)
    }

    /// True when the current question is answered and is not the last one
    pub fn can_advance(&self) -> bool {
        self.responses.is_answered(self.cursor) && (self.cursor as usize) < QUESTION_COUNT
    }

    /// True when finalize() would pass its completeness check
    pub fn can_finalize(&self) -> bool {
        !self.is_finalized() && self.responses.is_complete()
    }

    /// Completion fraction; always 1.0 once finalized
    pub fn progress(&self) -> f64 {
        match self.state {
            SessionState::Finalized => 1.0,
            SessionState::InProgress => ProgressTracker::fraction(&self.responses),
        }
    }

    pub fn progress_snapshot(&self) -> Progress {
        let cursor = (!self.is_finalized()).then_some(self.cursor);
        ProgressTracker::snapshot(&self.responses, cursor)
    }

    /// Live crisis check, usable before the sheet is complete
    pub fn crisis_alert(&self) -> bool {
        CrisisDetector::new(self.config.catalog()).detect(&self.responses)
    }

    /// Anxiety subscale sum; informational only
    pub fn anxiety_subscale(&self) -> Result<u8, ScreeningError> {
        ScoringEngine::new(self.config.catalog()).anxiety_subscale(&self.responses)
    }

    /// Per-item scoring breakdown of a complete sheet
    pub fn item_scores(&self) -> Result<Vec<ItemScore>, ScreeningError> {
        ScoringEngine::new(self.config.catalog()).item_scores(&self.responses)
    }

    /// Score, classify and close the session.
    ///
    /// Fails with `IncompleteResponses` (session stays open) if any question is
    /// unanswered, and with `SessionFinalized` on a second call.
    pub fn finalize(&mut self) -> Result<ScreeningResult, ScreeningError> {
        self.ensure_in_progress()?;

        let (total_score, classification) = self.evaluate()?;
        let result = ScreeningResult {
            id: format!("{}{}", RESULT_ID_PREFIX, Uuid::new_v4().simple()),
            completed_at: Utc::now(),
            total_score,
            risk_level: classification.risk_level,
            recommendations: classification.recommendations,
            requires_immediate_attention: classification.requires_immediate_attention,
            crisis_resources: classification.crisis_resources,
        };

        self.state = SessionState::Finalized;
        debug!(
            id = %result.id,
            total_score = result.total_score,
            risk_level = %result.risk_level,
            "screening finalized"
        );
        Ok(result)
    }

    fn evaluate(&self) -> Result<(u8, Classification), ScreeningError> {
        if !self.responses.is_complete() {
            return Err(ScreeningError::IncompleteResponses {
                missing: self.responses.unanswered(),
            });
        }

        let catalog = self.config.catalog();
        let crisis_triggered = CrisisDetector::new(catalog).detect(&self.responses);
        let total_score = ScoringEngine::new(catalog).score(&self.responses)?;
        let classification =
            RiskClassifier::new(self.config.recommendations()).classify(total_score, crisis_triggered);

        if classification.risk_level == RiskLevel::Crisis {
            warn!(
                total_score,
                crisis_item = catalog.crisis_item(),
                "crisis item triggered; score tier overridden"
            );
        }

        Ok((total_score, classification))
    }

    fn ensure_in_progress(&self) -> Result<(), ScreeningError> {
        match self.state {
            SessionState::InProgress => Ok(()),
            SessionState::Finalized => Err(ScreeningError::SessionFinalized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::QuestionCatalog;
    use crate::classifier::RecommendationTable;
    use crate::types::SymptomBand;
    use pretty_assertions::assert_eq;

    fn answer_sheet(session: &mut ScreeningSession, values: [u8; 10]) {
        for (i, value) in values.iter().enumerate() {
            session.answer(i as u8 + 1, *value).unwrap();
        }
    }

    #[test]
    fn test_all_zero_is_low_minimal() {
        let mut session = ScreeningSession::default();
        answer_sheet(&mut session, [0; 10]);

        let result = session.finalize().unwrap();
        assert_eq!(result.total_score(), 6);
        assert_eq!(result.risk_level(), RiskLevel::Low);
        assert_eq!(result.recommendations()[0], "Minimal depression symptoms detected");
        assert!(!result.requires_immediate_attention());
        assert!(result.crisis_resources().is_none());
    }

    #[test]
    fn test_reversed_items_at_max_score_zero() {
        let mut session = ScreeningSession::default();
        answer_sheet(&mut session, [3, 3, 0, 0, 0, 0, 0, 0, 0, 0]);

        let result = session.finalize().unwrap();
        assert_eq!(result.total_score(), 0);
        assert_eq!(result.risk_level(), RiskLevel::Low);
        assert_eq!(result.recommendations()[0], "Minimal depression symptoms detected");
    }

    #[test]
    fn test_high_symptom_sheet_is_high() {
        let mut session = ScreeningSession::default();
        answer_sheet(&mut session, [0, 0, 3, 3, 3, 3, 3, 3, 3, 0]);

        let result = session.finalize().unwrap();
        assert_eq!(result.total_score(), 27);
        assert_eq!(result.risk_level(), RiskLevel::High);
        assert!(!result.requires_immediate_attention());
    }

    #[test]
    fn test_crisis_item_overrides_low_score() {
        let mut session = ScreeningSession::default();
        answer_sheet(&mut session, [0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);

        let result = session.finalize().unwrap();
        assert_eq!(result.total_score(), 7);
        assert_eq!(result.risk_level(), RiskLevel::Crisis);
        assert!(result.requires_immediate_attention());
        assert!(!result.crisis_resources().unwrap().is_empty());
    }

    #[test]
    fn test_boundary_scores_through_session() {
        // Items 1,2 at raw 3 contribute nothing; item 10 stays 0
        let cases: [([u8; 10], u8, RiskLevel); 4] = [
            ([3, 3, 3, 3, 3, 3, 1, 0, 0, 0], 13, RiskLevel::High),
            ([3, 3, 3, 3, 3, 3, 0, 0, 0, 0], 12, RiskLevel::Medium),
            ([3, 3, 3, 3, 3, 1, 0, 0, 0, 0], 10, RiskLevel::Medium),
            ([3, 3, 3, 3, 3, 0, 0, 0, 0, 0], 9, RiskLevel::Low),
        ];

        for (values, score, level) in cases {
            let mut session = ScreeningSession::default();
            answer_sheet(&mut session, values);
            let result = session.finalize().unwrap();
            assert_eq!(result.total_score(), score);
            assert_eq!(result.risk_level(), level, "score {score}");
        }
    }

    #[test]
    fn test_mild_wording_at_seven() {
        let mut session = ScreeningSession::default();
        answer_sheet(&mut session, [3, 3, 3, 3, 1, 0, 0, 0, 0, 0]);

        let result = session.finalize().unwrap();
        assert_eq!(result.total_score(), 7);
        assert_eq!(result.risk_level(), RiskLevel::Low);
        assert_eq!(
            result.recommendations()[0],
            "Mild symptoms detected - continue monitoring"
        );
    }

    #[test]
    fn test_finalize_requires_complete_sheet() {
        let mut session = ScreeningSession::default();
        session.answer_all((1..=9).map(|i| (i, 0))).unwrap();

        match session.finalize() {
            Err(ScreeningError::IncompleteResponses { missing }) => assert_eq!(missing, vec![10]),
            other => panic!("expected IncompleteResponses, got {other:?}"),
        }
        assert_eq!(session.state(), SessionState::InProgress);

        session.answer(10, 0).unwrap();
        assert!(session.finalize().is_ok());
    }

    #[test]
    fn test_finalize_exactly_once() {
        let mut session = ScreeningSession::default();
        answer_sheet(&mut session, [1; 10]);
        session.finalize().unwrap();

        assert!(matches!(session.finalize(), Err(ScreeningError::SessionFinalized)));
        assert!(matches!(session.answer(1, 0), Err(ScreeningError::SessionFinalized)));
        assert!(matches!(session.clear(1), Err(ScreeningError::SessionFinalized)));
        assert!(matches!(session.go_to(3), Err(ScreeningError::SessionFinalized)));
        assert!(matches!(
            session.answer_all([(1, 0)]),
            Err(ScreeningError::SessionFinalized)
        ));
        assert_eq!(session.responses().get(1), Some(1));
    }

    #[test]
    fn test_result_ids_are_unique() {
        let mut ids = std::collections::HashSet::new();
        for _ in 0..20 {
            let mut session = ScreeningSession::default();
            answer_sheet(&mut session, [0; 10]);
            let result = session.finalize().unwrap();
            assert!(result.id().starts_with(RESULT_ID_PREFIX));
            assert!(ids.insert(result.id().to_string()));
        }
    }

    #[test]
    fn test_progress_reports_one_after_finalize() {
        let mut session = ScreeningSession::default();
        assert_eq!(session.progress(), 0.0);

        session.answer(1, 2).unwrap();
        session.answer(1, 2).unwrap();
        assert_eq!(session.progress(), 0.1);

        answer_sheet(&mut session, [2; 10]);
        session.finalize().unwrap();
        assert_eq!(session.progress(), 1.0);
        assert!(session.progress_snapshot().statuses.iter().all(|s| !s.current));
    }

    #[test]
    fn test_cursor_auto_advances_on_current_question() {
        let mut session = ScreeningSession::default();
        assert_eq!(session.cursor(), 1);

        session.answer(1, 3).unwrap();
        assert_eq!(session.cursor(), 2);

        // Answering a different question leaves the cursor alone
        session.answer(5, 1).unwrap();
        assert_eq!(session.cursor(), 2);

        session.go_to(10).unwrap();
        session.answer(10, 0).unwrap();
        assert_eq!(session.cursor(), 10);
    }

    #[test]
    fn test_navigation_stays_in_bounds() {
        let mut session = ScreeningSession::default();
        assert_eq!(session.previous_question().unwrap(), 1);
        assert!(!session.can_advance());

        session.answer(1, 0).unwrap();
        session.previous_question().unwrap();
        assert!(session.can_advance());

        session.go_to(10).unwrap();
        assert_eq!(session.next_question().unwrap(), 10);
        assert!(matches!(session.go_to(11), Err(ScreeningError::InvalidIndex(11))));
        assert_eq!(session.current_question().unwrap().index, 10);
    }

    #[test]
    fn test_bulk_answers_are_atomic() {
        let mut session = ScreeningSession::default();
        session.answer(2, 1).unwrap();
        let before = session.responses().clone();

        let result = session.answer_all([(1, 0), (3, 9), (4, 1)]);
        assert!(matches!(
            result,
            Err(ScreeningError::OutOfRange { index: 3, value: 9 })
        ));
        assert_eq!(session.responses(), &before);

        session.answer_all([(1, 0), (3, 2), (4, 1)]).unwrap();
        assert_eq!(session.responses().answered_count(), 4);
        assert_eq!(session.cursor(), 5);
    }

    #[test]
    fn test_crisis_alert_on_partial_sheet() {
        let mut session = ScreeningSession::default();
        assert!(!session.crisis_alert());

        session.answer(10, 2).unwrap();
        assert!(session.crisis_alert());

        session.answer(10, 0).unwrap();
        assert!(!session.crisis_alert());
    }

    #[test]
    fn test_anxiety_subscale_from_session() {
        let mut session = ScreeningSession::default();
        session.answer_all([(3, 1), (4, 2), (5, 3)]).unwrap();
        assert_eq!(session.anxiety_subscale().unwrap(), 6);
    }

    #[test]
    fn test_injected_configuration() {
        let table = RecommendationTable::default()
            .with_recommendations(SymptomBand::Minimal, vec!["Síntomas mínimos".to_string()])
            .unwrap();
        let config = Arc::new(ScreeningConfig::new(QuestionCatalog::epds(), table).unwrap());

        let mut first = ScreeningSession::new(Arc::clone(&config));
        let mut second = ScreeningSession::new(config);
        answer_sheet(&mut first, [0; 10]);
        answer_sheet(&mut second, [3; 10]);

        assert_eq!(first.finalize().unwrap().recommendations(), ["Síntomas mínimos".to_string()]);
        // 0 + 0 + 3 * 8 = 24, but item 10 = 3 triggers the crisis path
        let crisis = second.finalize().unwrap();
        assert_eq!(crisis.total_score(), 24);
        assert_eq!(crisis.risk_level(), RiskLevel::Crisis);
    }

    #[test]
    fn test_item_scores_and_band_agree() {
        let mut session = ScreeningSession::default();
        answer_sheet(&mut session, [2, 2, 1, 1, 1, 1, 1, 1, 1, 0]);
        let items = session.item_scores().unwrap();
        let total: u8 = items.iter().map(|i| i.contributed).sum();
        assert_eq!(total, 9);
        assert_eq!(crate::classifier::band_for(total, false), SymptomBand::Mild);
    }
}
