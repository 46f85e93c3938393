//! Risk stratification
//!
//! Maps a total score and the crisis flag to a risk tier plus a fixed list of
//! recommendations. Rules are evaluated in order and the first match wins:
//!
//! 1. Crisis item triggered → CRISIS (score ignored)
//! 2. Score ≥ 13 → HIGH (probable depression)
//! 3. Score ≥ 10 → MEDIUM (possible depression)
//! 4. Otherwise → LOW, worded as "mild" for 7-9 and "minimal" below 7
//!
//! The cutoffs are validated clinical thresholds, not tunables.

use crate::error::ScreeningError;
use crate::types::{RiskLevel, SymptomBand};
use serde::{Deserialize, Serialize};

/// Lowest score classified HIGH
pub const HIGH_RISK_THRESHOLD: u8 = 13;

/// Lowest score classified MEDIUM
pub const MEDIUM_RISK_THRESHOLD: u8 = 10;

/// Lowest LOW score that gets the "continue monitoring" wording
pub const MILD_SYMPTOM_THRESHOLD: u8 = 7;

/// Fixed recommendation and resource text, one list per band.
///
/// The crisis lists are never empty: every constructor, builder and the
/// deserializer validate them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecommendationLists")]
pub struct RecommendationTable {
    crisis: Vec<String>,
    crisis_resources: Vec<String>,
    high: Vec<String>,
    medium: Vec<String>,
    mild: Vec<String>,
    minimal: Vec<String>,
}

/// Unchecked wire shape of a recommendation table
#[derive(Deserialize)]
struct RecommendationLists {
    crisis: Vec<String>,
    crisis_resources: Vec<String>,
    high: Vec<String>,
    medium: Vec<String>,
    mild: Vec<String>,
    minimal: Vec<String>,
}

impl TryFrom<RecommendationLists> for RecommendationTable {
    type Error = ScreeningError;

    fn try_from(lists: RecommendationLists) -> Result<Self, Self::Error> {
        let table = Self {
            crisis: lists.crisis,
            crisis_resources: lists.crisis_resources,
            high: lists.high,
            medium: lists.medium,
            mild: lists.mild,
            minimal: lists.minimal,
        };
        table.validate()?;
        Ok(table)
    }
}

impl Default for RecommendationTable {
    fn default() -> Self {
        Self {
            crisis: strings(&[
                "IMMEDIATE CRISIS INTERVENTION REQUIRED",
                "Contact emergency services or crisis hotline immediately",
                "Do not leave patient alone",
                "Seek immediate professional mental health evaluation",
            ]),
            crisis_resources: strings(&[
                "National Suicide Prevention Lifeline: 988 (24/7)",
                "Crisis Text Line: Text HOME to 741741",
                "Emergency Services: 911",
                "Postpartum Support International: 1-844-944-4773",
            ]),
            high: strings(&[
                "Immediate clinical evaluation strongly recommended",
                "Schedule follow-up within 1 week",
                "Consider medication evaluation with healthcare provider",
                "Psychotherapy or counseling recommended",
                "Monitor symptoms closely",
            ]),
            medium: strings(&[
                "Clinical evaluation recommended",
                "Schedule follow-up within 2 weeks",
                "Consider counseling or support groups",
                "Monitor symptoms for changes",
                "Practice self-care strategies",
            ]),
            mild: strings(&[
                "Mild symptoms detected - continue monitoring",
                "Practice self-care and stress management",
                "Consider support groups or counseling if symptoms persist",
                "Schedule routine follow-up",
            ]),
            minimal: strings(&[
                "Minimal depression symptoms detected",
                "Continue routine self-care practices",
                "Maintain healthy lifestyle habits",
                "Contact healthcare provider if symptoms develop",
            ]),
        }
    }
}

impl RecommendationTable {
    /// Reject tables that could produce a crisis result without resources or guidance
    pub fn validate(&self) -> Result<(), ScreeningError> {
        if self.crisis_resources.is_empty() {
            return Err(ScreeningError::InvalidCatalog(
                "crisis resource list must not be empty".to_string(),
            ));
        }
        if self.crisis.is_empty() {
            return Err(ScreeningError::InvalidCatalog(
                "crisis recommendation list must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Replace the recommendation list of one band
    pub fn with_recommendations(
        mut self,
        band: SymptomBand,
        recommendations: Vec<String>,
    ) -> Result<Self, ScreeningError> {
        match band {
            SymptomBand::Crisis => self.crisis = recommendations,
            SymptomBand::Probable => self.high = recommendations,
            SymptomBand::Possible => self.medium = recommendations,
            SymptomBand::Mild => self.mild = recommendations,
            SymptomBand::Minimal => self.minimal = recommendations,
        }
        self.validate()?;
        Ok(self)
    }

    /// Replace the crisis resource list
    pub fn with_crisis_resources(mut self, resources: Vec<String>) -> Result<Self, ScreeningError> {
        self.crisis_resources = resources;
        self.validate()?;
        Ok(self)
    }

    pub fn crisis_resources(&self) -> &[String] {
        &self.crisis_resources
    }

    /// Recommendation list for a band
    pub fn for_band(&self, band: SymptomBand) -> &[String] {
        match band {
            SymptomBand::Crisis => &self.crisis,
            SymptomBand::Probable => &self.high,
            SymptomBand::Possible => &self.medium,
            SymptomBand::Mild => &self.mild,
            SymptomBand::Minimal => &self.minimal,
        }
    }
}

/// Output of the decision table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub risk_level: RiskLevel,
    pub band: SymptomBand,
    pub recommendations: Vec<String>,
    pub requires_immediate_attention: bool,
    /// Present iff `risk_level` is CRISIS
    pub crisis_resources: Option<Vec<String>>,
}

/// Band for a score and crisis flag, first match wins
pub fn band_for(total_score: u8, crisis_triggered: bool) -> SymptomBand {
    match total_score {
        _ if crisis_triggered => SymptomBand::Crisis,
        s if s >= HIGH_RISK_THRESHOLD => SymptomBand::Probable,
        s if s >= MEDIUM_RISK_THRESHOLD => SymptomBand::Possible,
        s if s >= MILD_SYMPTOM_THRESHOLD => SymptomBand::Mild,
        _ => SymptomBand::Minimal,
    }
}

/// Applies the decision table with an injected recommendation table
#[derive(Debug, Clone, Copy)]
pub struct RiskClassifier<'a> {
    table: &'a RecommendationTable,
}

impl<'a> RiskClassifier<'a> {
    pub fn new(table: &'a RecommendationTable) -> Self {
        Self { table }
    }

    pub fn classify(&self, total_score: u8, crisis_triggered: bool) -> Classification {
        let band = band_for(total_score, crisis_triggered);
        let table = self.table;
        let crisis = band == SymptomBand::Crisis;

        Classification {
            risk_level: band.risk_level(),
            band,
            recommendations: table.for_band(band).to_vec(),
            requires_immediate_attention: crisis,
            crisis_resources: crisis.then(|| table.crisis_resources.clone()),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
