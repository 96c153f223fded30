pub mod grammar_checker;
pub mod parser;
pub mod prompt;
pub mod providers;

pub use grammar_checker::{CheckError, GrammarChecker};
