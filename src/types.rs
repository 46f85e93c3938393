//! Core types for the Synheart Screen engine
//!
//! This module defines the data that flows through a screening: questions and
//! their response options, risk tiers, and the immutable result record handed
//! to callers once a session is finalized.

use crate::error::ScreeningError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of items in the questionnaire
pub const QUESTION_COUNT: usize = 10;

/// Lowest ordinal response value
pub const MIN_RESPONSE: u8 = 0;

/// Highest ordinal response value
pub const MAX_RESPONSE: u8 = 3;

/// Highest possible composite score (10 items x 3)
pub const MAX_TOTAL_SCORE: u8 = 30;

/// One labeled response option of a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseOption {
    /// Text shown to the respondent
    pub label: String,
    /// Raw ordinal recorded when this option is chosen (0-3)
    pub value: u8,
}

impl ResponseOption {
    pub fn new(label: impl Into<String>, value: u8) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// A single questionnaire item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// 1-based position in the questionnaire
    pub index: u8,
    /// Statement the respondent rates
    pub prompt: String,
    /// Options in presentation order
    pub options: Vec<ResponseOption>,
    /// Positively phrased item: contributes `3 - raw` to the total
    pub reversed: bool,
    /// Self-harm item whose nonzero answer overrides the score tier
    #[serde(default)]
    pub crisis_item: bool,
    /// Member of the anxiety subscale
    #[serde(default)]
    pub anxiety_item: bool,
}

impl Question {
    /// Label of the option carrying `value`, if any
    pub fn label_for(&self, value: u8) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
    }
}

/// Risk tier assigned to a completed screening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Crisis,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Crisis => "CRISIS",
        }
    }

    /// One-line explanation of what this tier means for the given score
    pub fn interpretation(&self, total_score: u8) -> String {
        match self {
            RiskLevel::Low => format!(
                "Your EPDS score of {total_score} indicates minimal depression symptoms. This is a positive result that suggests you're managing well."
            ),
            RiskLevel::Medium => format!(
                "Your EPDS score of {total_score} indicates possible depression symptoms that may benefit from professional evaluation and support."
            ),
            RiskLevel::High => format!(
                "Your EPDS score of {total_score} indicates probable depression that would benefit from immediate professional evaluation and treatment."
            ),
            RiskLevel::Crisis => "Your EPDS score indicates crisis-level symptoms. Immediate professional help is strongly recommended.".to_string(),
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finer-grained band behind a risk tier.
///
/// `Minimal` and `Mild` both report [`RiskLevel::Low`]; the band only selects
/// recommendation wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymptomBand {
    /// 0-6
    Minimal,
    /// 7-9
    Mild,
    /// 10-12
    Possible,
    /// 13 and above
    Probable,
    /// Crisis item triggered
    Crisis,
}

impl SymptomBand {
    pub fn risk_level(&self) -> RiskLevel {
        match self {
            SymptomBand::Minimal | SymptomBand::Mild => RiskLevel::Low,
            SymptomBand::Possible => RiskLevel::Medium,
            SymptomBand::Probable => RiskLevel::High,
            SymptomBand::Crisis => RiskLevel::Crisis,
        }
    }
}

/// Immutable outcome of one finalized screening session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawResult")]
pub struct ScreeningResult {
    pub(crate) id: String,
    pub(crate) completed_at: DateTime<Utc>,
    pub(crate) total_score: u8,
    pub(crate) risk_level: RiskLevel,
    pub(crate) recommendations: Vec<String>,
    pub(crate) requires_immediate_attention: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) crisis_resources: Option<Vec<String>>,
}

impl ScreeningResult {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    pub fn total_score(&self) -> u8 {
        self.total_score
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    pub fn requires_immediate_attention(&self) -> bool {
        self.requires_immediate_attention
    }

    /// Present iff the risk level is [`RiskLevel::Crisis`]
    pub fn crisis_resources(&self) -> Option<&[String]> {
        self.crisis_resources.as_deref()
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Load a previously archived result from JSON.
    ///
    /// Records whose tier, attention flag and crisis resources disagree, or
    /// whose score exceeds the maximum, are rejected.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Unchecked wire shape of an archived result
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResult {
    id: String,
    completed_at: DateTime<Utc>,
    total_score: u8,
    risk_level: RiskLevel,
    recommendations: Vec<String>,
    requires_immediate_attention: bool,
    #[serde(default)]
    crisis_resources: Option<Vec<String>>,
}

impl TryFrom<RawResult> for ScreeningResult {
    type Error = ScreeningError;

    fn try_from(raw: RawResult) -> Result<Self, Self::Error> {
        let crisis = raw.risk_level == RiskLevel::Crisis;

        if raw.total_score > MAX_TOTAL_SCORE {
            return Err(ScreeningError::InvalidResult(format!(
                "total score {} exceeds {}",
                raw.total_score, MAX_TOTAL_SCORE
            )));
        }
        if raw.requires_immediate_attention != crisis {
            return Err(ScreeningError::InvalidResult(format!(
                "requiresImmediateAttention={} does not match risk level {}",
                raw.requires_immediate_attention, raw.risk_level
            )));
        }
        match (&raw.crisis_resources, crisis) {
            (Some(resources), true) if resources.is_empty() => {
                return Err(ScreeningError::InvalidResult(
                    "crisis resource list is empty".to_string(),
                ))
            }
            (Some(_), true) | (None, false) => {}
            (None, true) => {
                return Err(ScreeningError::InvalidResult(
                    "CRISIS result without crisis resources".to_string(),
                ))
            }
            (Some(_), false) => {
                return Err(ScreeningError::InvalidResult(format!(
                    "crisis resources on a {} result",
                    raw.risk_level
                )))
            }
        }

        Ok(Self {
            id: raw.id,
            completed_at: raw.completed_at,
            total_score: raw.total_score,
            risk_level: raw.risk_level,
            recommendations: raw.recommendations,
            requires_immediate_attention: raw.requires_immediate_attention,
            crisis_resources: raw.crisis_resources,
        })
    }
}
