//! Screening configuration
//!
//! Bundles the question catalog and recommendation text into one immutable
//! value. Sessions share it through an `Arc`, so a localized variant can be
//! loaded once and used by any number of sessions.

use crate::catalog::QuestionCatalog;
use crate::classifier::RecommendationTable;
use crate::error::ScreeningError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Immutable configuration injected into every session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningConfig {
    catalog: QuestionCatalog,
    #[serde(default)]
    recommendations: RecommendationTable,
}

impl ScreeningConfig {
    /// Build and validate a configuration
    pub fn new(
        catalog: QuestionCatalog,
        recommendations: RecommendationTable,
    ) -> Result<Self, ScreeningError> {
        recommendations.validate()?;
        Ok(Self {
            catalog,
            recommendations,
        })
    }

    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    pub fn recommendations(&self) -> &RecommendationTable {
        &self.recommendations
    }

    /// Canonical EPDS configuration, ready to share
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Load configuration from JSON.
    ///
    /// Both the catalog and the recommendation table are validated during
    /// deserialization. A missing `recommendations` key falls back to the
    /// canonical English text.
    pub fn from_json(json: &str) -> Result<Self, ScreeningError> {
        let config: ScreeningConfig = serde_json::from_str(json)?;
        debug!(
            questions = config.catalog.count(),
            crisis_item = config.catalog.crisis_item(),
            "loaded screening configuration"
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
