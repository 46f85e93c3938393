//! One-shot evaluation
//!
//! This module provides the stateless public API for Synheart Screen. It runs
//! a complete answer sheet through a fresh session in a single call.

use crate::config::ScreeningConfig;
use crate::error::ScreeningError;
use crate::responses::ResponseSet;
use crate::session::ScreeningSession;
use crate::types::ScreeningResult;
use std::sync::Arc;

/// Evaluate a complete answer sheet with the canonical EPDS configuration.
///
/// # Example
/// ```ignore
/// let responses = ResponseSet::from_pairs((1..=10).map(|i| (i, 0)))?;
/// let result = evaluate(&responses)?;
/// assert_eq!(result.total_score(), 6);
/// ```
pub fn evaluate(responses: &ResponseSet) -> Result<ScreeningResult, ScreeningError> {
    evaluate_with(ScreeningConfig::shared(), responses)
}

/// Evaluate a complete answer sheet against an injected configuration
pub fn evaluate_with(
    config: Arc<ScreeningConfig>,
    responses: &ResponseSet,
) -> Result<ScreeningResult, ScreeningError> {
    let mut session = ScreeningSession::new(config);
    session.answer_all(responses.answered())?;
    session.finalize()
}

/// Evaluate a JSON answer sheet and return the result as JSON.
///
/// # Arguments
/// * `raw_json` - Object keyed by question index, e.g. `{"1": 3, "2": 2, ...}`
///
/// # Returns
/// `ScreeningResult` JSON (camelCase fields)
pub fn evaluate_json(raw_json: String) -> Result<String, ScreeningError> {
    let responses: ResponseSet = serde_json::from_str(&raw_json)?;
    let result = evaluate(&responses)?;
    Ok(result.to_json()?)
}
