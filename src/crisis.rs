//! Crisis detection
//!
//! The self-harm item is checked on its own: reverse scoring and the total
//! score play no part, and the check works on incomplete answer sheets.

use crate::catalog::QuestionCatalog;
use crate::responses::ResponseSet;

/// Lowest raw answer on the crisis item that triggers the crisis path
pub const CRISIS_TRIGGER_MIN: u8 = 1;

/// Predicate over the catalog's crisis item
pub struct CrisisDetector<'a> {
    catalog: &'a QuestionCatalog,
}

impl<'a> CrisisDetector<'a> {
    pub fn new(catalog: &'a QuestionCatalog) -> Self {
        Self { catalog }
    }

    /// True iff the crisis item is answered with anything other than "never"
    pub fn detect(&self, responses: &ResponseSet) -> bool {
        responses
            .get(self.catalog.crisis_item())
            .is_some_and(|value| value >= CRISIS_TRIGGER_MIN)
    }
}
