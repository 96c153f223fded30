//! Domain models for the grammar service.

pub mod grammar_check;

pub use grammar_check::{GrammarCheckResult, GrammarScore};
