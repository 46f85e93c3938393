//! Question catalog
//!
//! The catalog is the single source of truth for scoring semantics: which
//! items are reverse scored, which item is the crisis trigger, and which items
//! form the anxiety subscale. Nothing downstream special-cases an index.

use crate::error::ScreeningError;
use crate::types::{Question, ResponseOption, MAX_RESPONSE, QUESTION_COUNT};
use serde::{Deserialize, Serialize};

/// Immutable, validated set of the 10 questionnaire items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Question>", into = "Vec<Question>")]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl Default for QuestionCatalog {
    fn default() -> Self {
        Self::epds()
    }
}

impl TryFrom<Vec<Question>> for QuestionCatalog {
    type Error = ScreeningError;

    fn try_from(questions: Vec<Question>) -> Result<Self, Self::Error> {
        Self::new(questions)
    }
}

impl From<QuestionCatalog> for Vec<Question> {
    fn from(catalog: QuestionCatalog) -> Self {
        catalog.questions
    }
}

impl QuestionCatalog {
    /// Build a catalog from injected questions, validating its invariants
    pub fn new(questions: Vec<Question>) -> Result<Self, ScreeningError> {
        if questions.len() != QUESTION_COUNT {
            return Err(ScreeningError::InvalidCatalog(format!(
                "expected {} questions, found {}",
                QUESTION_COUNT,
                questions.len()
            )));
        }

        for (position, question) in questions.iter().enumerate() {
            let expected = position as u8 + 1;
            if question.index != expected {
                return Err(ScreeningError::InvalidCatalog(format!(
                    "question at position {} has index {} (expected {})",
                    position + 1,
                    question.index,
                    expected
                )));
            }
            if question.prompt.trim().is_empty() {
                return Err(ScreeningError::InvalidCatalog(format!(
                    "question {} has an empty prompt",
                    question.index
                )));
            }
            validate_options(question)?;
        }

        let crisis_items = questions.iter().filter(|q| q.crisis_item).count();
        if crisis_items != 1 {
            return Err(ScreeningError::InvalidCatalog(format!(
                "expected exactly one crisis item, found {crisis_items}"
            )));
        }

        Ok(Self { questions })
    }

    /// The canonical English EPDS catalog
    pub fn epds() -> Self {
        let mut questions = vec![
            epds_item(
                1,
                "I have been able to laugh and see the funny side of things",
                [
                    "As much as I always could",
                    "Not quite so much now",
                    "Definitely not so much now",
                    "Not at all",
                ],
                DESCENDING,
                true,
            ),
            epds_item(
                2,
                "I have looked forward with enjoyment to things",
                [
                    "As much as I ever did",
                    "Rather less than I used to",
                    "Definitely less than I used to",
                    "Hardly at all",
                ],
                DESCENDING,
                true,
            ),
            epds_item(
                3,
                "I have blamed myself unnecessarily when things went wrong",
                [
                    "Yes, most of the time",
                    "Yes, some of the time",
                    "Not very often",
                    "No, never",
                ],
                DESCENDING,
                false,
            ),
            epds_item(
                4,
                "I have been anxious or worried for no good reason",
                [
                    "No, not at all",
                    "Hardly ever",
                    "Yes, sometimes",
                    "Yes, very often",
                ],
                ASCENDING,
                false,
            ),
            epds_item(
                5,
                "I have felt scared or panicky for no very good reason",
                [
                    "Yes, quite a lot",
                    "Yes, sometimes",
                    "No, not much",
                    "No, not at all",
                ],
                DESCENDING,
                false,
            ),
            epds_item(
                6,
                "Things have been getting on top of me",
                [
                    "Yes, most of the time I haven't been able to cope at all",
                    "Yes, sometimes I haven't been coping as well as usual",
                    "No, most of the time I have coped quite well",
                    "No, I have been coping as well as ever",
                ],
                DESCENDING,
                false,
            ),
            epds_item(
                7,
                "I have been so unhappy that I have had difficulty sleeping",
                [
                    "Yes, most of the time",
                    "Yes, sometimes",
                    "Not very often",
                    "No, not at all",
                ],
                DESCENDING,
                false,
            ),
            epds_item(
                8,
                "I have felt sad or miserable",
                [
                    "Yes, most of the time",
                    "Yes, quite often",
                    "Not very often",
                    "No, not at all",
                ],
                DESCENDING,
                false,
            ),
            epds_item(
                9,
                "I have been so unhappy that I have been crying",
                [
                    "Yes, most of the time",
                    "Yes, quite often",
                    "Only occasionally",
                    "No, never",
                ],
                DESCENDING,
                false,
            ),
            epds_item(
                10,
                "The thought of harming myself has occurred to me",
                ["Yes, quite often", "Sometimes", "Hardly ever", "Never"],
                DESCENDING,
                false,
            ),
        ];

        for q in &mut questions {
            q.anxiety_item = matches!(q.index, 3..=5);
            q.crisis_item = q.index == 10;
        }

        Self { questions }
    }

    /// Load a catalog from JSON (an array of questions)
    pub fn from_json(json: &str) -> Result<Self, ScreeningError> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        Self::new(questions)
    }

    /// Serialize the catalog to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.questions)
    }

    /// Question at a 1-based index
    pub fn question_at(&self, index: u8) -> Result<&Question, ScreeningError> {
        if index == 0 {
            return Err(ScreeningError::InvalidIndex(index));
        }
        self.questions
            .get(index as usize - 1)
            .ok_or(ScreeningError::InvalidIndex(index))
    }

    /// Number of questions (always 10)
    pub fn count(&self) -> usize {
        self.questions.len()
    }

    pub fn is_reversed(&self, index: u8) -> Result<bool, ScreeningError> {
        self.question_at(index).map(|q| q.reversed)
    }

    pub fn is_crisis_item(&self, index: u8) -> Result<bool, ScreeningError> {
        self.question_at(index).map(|q| q.crisis_item)
    }

    /// Index of the crisis-trigger item
    pub fn crisis_item(&self) -> u8 {
        // new() guarantees exactly one flagged item
        self.questions
            .iter()
            .find(|q| q.crisis_item)
            .map(|q| q.index)
            .unwrap_or(QUESTION_COUNT as u8)
    }

    /// Indices of the anxiety subscale items
    pub fn anxiety_items(&self) -> Vec<u8> {
        self.questions
            .iter()
            .filter(|q| q.anxiety_item)
            .map(|q| q.index)
            .collect()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }
}

/// Raw values for labels printed from raw 3 down to raw 0
const DESCENDING: [u8; 4] = [3, 2, 1, 0];

/// Raw values for labels printed from raw 0 up to raw 3
const ASCENDING: [u8; 4] = [0, 1, 2, 3];

/// Build a canonical item from labels in printed order
fn epds_item(
    index: u8,
    prompt: &str,
    labels: [&str; 4],
    values: [u8; 4],
    reversed: bool,
) -> Question {
    let options = labels
        .iter()
        .zip(values)
        .map(|(label, value)| ResponseOption::new(*label, value))
        .collect();

    Question {
        index,
        prompt: prompt.to_string(),
        options,
        reversed,
        crisis_item: false,
        anxiety_item: false,
    }
}

fn validate_options(question: &Question) -> Result<(), ScreeningError> {
    let option_count = MAX_RESPONSE as usize + 1;
    if question.options.len() != option_count {
        return Err(ScreeningError::InvalidCatalog(format!(
            "question {} has {} options (expected {})",
            question.index,
            question.options.len(),
            option_count
        )));
    }

    let mut seen = [false; MAX_RESPONSE as usize + 1];
    for option in &question.options {
        match seen.get_mut(option.value as usize) {
            Some(slot) if !*slot => *slot = true,
            _ => {
                return Err(ScreeningError::InvalidCatalog(format!(
                    "question {} option values must be a permutation of 0-{}",
                    question.index, MAX_RESPONSE
                )))
            }
        }
    }

    Ok(())
}
