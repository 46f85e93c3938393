//! Result history
//!
//! An append-only, in-memory log of finalized results. It serializes to and
//! from JSON strings so a caller can keep it wherever it likes; the engine
//! itself never touches storage.

use crate::types::{RiskLevel, ScreeningResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One point of the score-over-time series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePoint {
    pub completed_at: DateTime<Utc>,
    pub total_score: u8,
    pub risk_level: RiskLevel,
}

/// Append-only log of screening results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreeningHistory {
    results: Vec<ScreeningResult>,
}

impl ScreeningHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a result. Returns false if a result with the same id is present.
    pub fn record(&mut self, result: ScreeningResult) -> bool {
        if self.results.iter().any(|r| r.id() == result.id()) {
            return false;
        }
        self.results.push(result);
        true
    }

    pub fn results(&self) -> &[ScreeningResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Most recently completed result
    pub fn latest(&self) -> Option<&ScreeningResult> {
        self.results.iter().max_by_key(|r| r.completed_at())
    }

    /// Scores ordered by completion time, for charting
    pub fn score_series(&self) -> Vec<ScorePoint> {
        let mut points: Vec<ScorePoint> = self
            .results
            .iter()
            .map(|r| ScorePoint {
                completed_at: r.completed_at(),
                total_score: r.total_score(),
                risk_level: r.risk_level(),
            })
            .collect();
        points.sort_by_key(|p| p.completed_at);
        points
    }

    /// Score change between the two most recent results
    pub fn score_change(&self) -> Option<i16> {
        let series = self.score_series();
        match series.as_slice() {
            [.., previous, last] => Some(last.total_score as i16 - previous.total_score as i16),
            _ => None,
        }
    }

    /// Load history from JSON (an array of results)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize history to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
