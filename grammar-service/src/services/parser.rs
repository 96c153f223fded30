//! Turns a completion response into a [`GrammarCheckResult`].
//!
//! Model output is untrusted: every field is checked before it is used and
//! any mismatch is reported as a [`ParseError`] instead of a panic.

use crate::config::ResponseFormat;
use crate::models::{GrammarCheckResult, GrammarScore};
use crate::services::prompt::GRAMMAR_FUNCTION_NAME;
use crate::services::providers::{ChatCompletionResponse, ResponseMessage};
use serde::Deserialize;
use thiserror::Error;

const SECTION_SEPARATOR: &str = "\n\n";
const SCORE_DELIMITER: &str = ": ";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Response contained no choices")]
    MissingChoice,

    #[error("Response did not contain a function call")]
    MissingFunctionCall,

    #[error("Model called unexpected function '{0}'")]
    UnexpectedFunction(String),

    #[error("Response did not contain message content")]
    MissingContent,

    #[error("Function call arguments are not valid: {0}")]
    InvalidArguments(#[from] serde_json::Error),

    #[error("Response body could not be decoded: {0}")]
    MalformedBody(String),

    #[error("Expected three sections separated by blank lines, found {0}")]
    UnexpectedSectionCount(usize),

    #[error("Score line has no ': ' delimiter")]
    MissingScoreDelimiter,

    #[error("Score '{0}' is not a number")]
    InvalidScore(String),

    #[error("Score {0} is outside 0-100")]
    ScoreOutOfRange(f64),

    #[error("Score is below 100 but no changes were listed")]
    EmptyChanges,

    #[error("Score is below 100 but no reasons were listed")]
    EmptyReasons,
}

/// Arguments of the `log_grammar_check` function call.
#[derive(Debug, Deserialize)]
struct GrammarCheckArguments {
    grammar_score: f64,
    changes: Vec<String>,
    reasons: Vec<String>,
}

/// Parse `response` according to the format the request was built with.
pub fn parse_response(
    format: ResponseFormat,
    response: &ChatCompletionResponse,
) -> Result<GrammarCheckResult, ParseError> {
    let message = first_message(response)?;
    match format {
        ResponseFormat::Structured => parse_function_call(message),
        ResponseFormat::FreeText => {
            let content = message
                .content
                .as_deref()
                .ok_or(ParseError::MissingContent)?;
            parse_free_text(content)
        }
    }
}

fn first_message(response: &ChatCompletionResponse) -> Result<&ResponseMessage, ParseError> {
    response
        .choices
        .first()
        .map(|choice| &choice.message)
        .ok_or(ParseError::MissingChoice)
}

fn parse_function_call(message: &ResponseMessage) -> Result<GrammarCheckResult, ParseError> {
    let call = message
        .function_call
        .as_ref()
        .ok_or(ParseError::MissingFunctionCall)?;

    if !call.name.is_empty() && call.name != GRAMMAR_FUNCTION_NAME {
        return Err(ParseError::UnexpectedFunction(call.name.clone()));
    }

    parse_arguments(&call.arguments)
}

/// Decode `log_grammar_check` arguments. Nothing is read from the payload
/// unless the whole object decodes.
pub fn parse_arguments(arguments: &str) -> Result<GrammarCheckResult, ParseError> {
    let args: GrammarCheckArguments = serde_json::from_str(arguments)?;
    let score = GrammarScore::new(args.grammar_score)
        .ok_or(ParseError::ScoreOutOfRange(args.grammar_score))?;
    validate(args.grammar_score, score, args.changes, args.reasons)
}

/// Split free-text output into score, changes and reasons.
///
/// Runs of blank lines count as one separator. The score is rounded to one
/// decimal place.
///
/// Expected shape:
///
/// ```text
/// Score: 87.5/100
///
/// Changes:
/// - go -> goes
///
/// Reasons:
/// - subject-verb agreement
/// ```
pub fn parse_free_text(content: &str) -> Result<GrammarCheckResult, ParseError> {
    let normalized = content.replace("\r\n", "\n");
    let sections: Vec<&str> = normalized
        .split(SECTION_SEPARATOR)
        .map(str::trim)
        .filter(|section| !section.is_empty())
        .collect();

    let &[score_section, changes_section, reasons_section] = sections.as_slice() else {
        return Err(ParseError::UnexpectedSectionCount(sections.len()));
    };

    let raw_score = parse_score(score_section)?;
    let score = GrammarScore::rounded(raw_score).ok_or(ParseError::ScoreOutOfRange(raw_score))?;
    validate(
        raw_score,
        score,
        section_items(changes_section),
        section_items(reasons_section),
    )
}

fn parse_score(section: &str) -> Result<f64, ParseError> {
    let (_, raw) = section
        .split_once(SCORE_DELIMITER)
        .ok_or(ParseError::MissingScoreDelimiter)?;

    let raw = raw.trim();
    let number = raw.strip_suffix("/100").unwrap_or(raw).trim();

    number
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidScore(raw.to_string()))
}

/// Lines of a section after its header line, blank lines dropped.
fn section_items(section: &str) -> Vec<String> {
    section
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lists may be empty only when the unrounded `raw_score` is 100.
fn validate(
    raw_score: f64,
    score: GrammarScore,
    changes: Vec<String>,
    reasons: Vec<String>,
) -> Result<GrammarCheckResult, ParseError> {
    if raw_score < GrammarScore::MAX {
        if changes.is_empty() {
            return Err(ParseError::EmptyChanges);
        }
        if reasons.is_empty() {
            return Err(ParseError::EmptyReasons);
        }
    }

    Ok(GrammarCheckResult {
        score,
        changes,
        reasons,
    })
}
