//! Synheart Screen - On-device EPDS screening engine
//!
//! Screen administers the 10-item Edinburgh Postnatal Depression Scale and
//! turns a completed answer sheet into a risk tier through a deterministic
//! pipeline: response tracking → crisis detection → reverse-aware scoring →
//! risk stratification → immutable result.
//!
//! ## Modules
//!
//! - **Catalog & configuration**: the question table and recommendation text,
//!   injected into sessions as shared immutable configuration
//! - **Session**: the answer/navigate/finalize state machine
//! - **Scoring & classification**: composite score, crisis override and
//!   threshold table

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod crisis;
pub mod error;
pub mod history;
pub mod pipeline;
pub mod progress;
pub mod responses;
pub mod scoring;
pub mod session;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use catalog::QuestionCatalog;
pub use classifier::{Classification, RecommendationTable, RiskClassifier};
pub use config::ScreeningConfig;
pub use crisis::CrisisDetector;
pub use error::ScreeningError;
pub use history::ScreeningHistory;
pub use pipeline::{evaluate, evaluate_json, evaluate_with};
pub use progress::{Progress, ProgressTracker};
pub use responses::ResponseSet;
pub use scoring::ScoringEngine;
pub use session::{ScreeningSession, SessionState};
pub use types::{Question, ResponseOption, RiskLevel, ScreeningResult, SymptomBand};

/// Screen version
pub const SCREEN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI and FFI
pub const PRODUCER_NAME: &str = "synheart-screen";

/// Instrument administered by this engine
pub const INSTRUMENT_NAME: &str = "Edinburgh Postnatal Depression Scale (EPDS)";
