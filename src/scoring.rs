//! Composite scoring
//!
//! Every item contributes its raw value, except reverse-scored items which
//! contribute `3 - raw`. Reversal comes from the catalog, never from an index.

use crate::catalog::QuestionCatalog;
use crate::error::ScreeningError;
use crate::responses::ResponseSet;
use crate::types::MAX_RESPONSE;
use serde::{Deserialize, Serialize};

/// Per-item scoring breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemScore {
    pub index: u8,
    /// Value the respondent chose
    pub raw: u8,
    /// Value added to the total after reverse scoring
    pub contributed: u8,
    pub reversed: bool,
}

/// Contribution of one raw answer to the total
pub fn contribution(raw: u8, reversed: bool) -> u8 {
    if reversed {
        MAX_RESPONSE.saturating_sub(raw)
    } else {
        raw
    }
}

/// Scores complete response sets against a catalog
pub struct ScoringEngine<'a> {
    catalog: &'a QuestionCatalog,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(catalog: &'a QuestionCatalog) -> Self {
        Self { catalog }
    }

    /// Total composite score (0-30). Requires every question answered.
    pub fn score(&self, responses: &ResponseSet) -> Result<u8, ScreeningError> {
        Ok(self
            .item_scores(responses)?
            .iter()
            .map(|item| item.contributed)
            .sum())
    }

    /// Per-item breakdown of a complete response set
    pub fn item_scores(&self, responses: &ResponseSet) -> Result<Vec<ItemScore>, ScreeningError> {
        if !responses.is_complete() {
            return Err(ScreeningError::IncompleteResponses {
                missing: responses.unanswered(),
            });
        }

        let mut items = Vec::with_capacity(self.catalog.count());
        for question in self.catalog.iter() {
            let raw = responses
                .get(question.index)
                .ok_or_else(|| ScreeningError::IncompleteResponses {
                    missing: vec![question.index],
                })?;
            items.push(ItemScore {
                index: question.index,
                raw,
                contributed: contribution(raw, question.reversed),
                reversed: question.reversed,
            });
        }

        Ok(items)
    }

    /// Sum over the anxiety subscale items. Only those items must be answered.
    pub fn anxiety_subscale(&self, responses: &ResponseSet) -> Result<u8, ScreeningError> {
        let items: Vec<_> = self.catalog.iter().filter(|q| q.anxiety_item).collect();

        let missing: Vec<u8> = items
            .iter()
            .filter(|q| !responses.is_answered(q.index))
            .map(|q| q.index)
            .collect();
        if !missing.is_empty() {
            return Err(ScreeningError::IncompleteResponses { missing });
        }

        Ok(items
            .iter()
            .filter_map(|q| responses.get(q.index).map(|raw| contribution(raw, q.reversed)))
            .sum())
    }
}
