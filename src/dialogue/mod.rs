//! Dialogue: persona auto-selection and rule-based replies.

pub mod engine;
pub mod rules;
pub mod selector;

pub use engine::{ChatOutcome, DialogueEngine, AUTO};
