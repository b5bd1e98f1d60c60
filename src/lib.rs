//! Pre-match outcome model for football fixtures.
//!
//! Given each side's historical results (optionally enriched with xG data),
//! the engine estimates attack/defense strengths, derives expected goals for
//! the fixture and converts them into home/draw/away probabilities plus a
//! confidence score. Everything is a pure function of its inputs: no I/O,
//! no shared state, no randomness.

pub mod config;
pub mod confidence;
pub mod engine;
pub mod error;
pub mod fixtures;
pub mod league_baseline;
pub mod modifiers;
pub mod outcome;
pub mod team_strength;

pub use config::ModelConfig;
pub use engine::{EnhancedPrediction, PredictionRequest, predict};
pub use error::{InsufficientDataError, InvalidModifierError};
pub use fixtures::{ExpectedGoalsData, HistoricalFixture, XgSource};
pub use modifiers::{ModifierParams, NewsImpactModifiers};
pub use outcome::OutcomeProbs;
pub use team_strength::TeamStrength;
