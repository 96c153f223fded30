//! Request construction for both response formats.

use crate::config::ResponseFormat;
use crate::services::providers::{ChatCompletionRequest, ChatMessage, FunctionDefinition};
use serde_json::json;

/// Name of the function the model is asked to call in structured mode.
pub const GRAMMAR_FUNCTION_NAME: &str = "log_grammar_check";

/// Instructions prepended to the user's text in free-text mode. The parser
/// relies on the three blank-line separated sections and the `": "` after
/// the score label.
pub const FREE_TEXT_INSTRUCTIONS: &str = "\
Check the grammar of the text below.
Answer in exactly three parts separated by one blank line, with no blank lines inside a part:
1. A single line \"Score: <score>/100\", where <score> is between 0 and 100 with one decimal place, e.g. \"Score: 85.5/100\".
2. A line \"Changes:\" followed by one line per change, e.g. \"- 'I am' -> 'I'm'\".
3. A line \"Reasons:\" followed by one line per reason for the changes above.
Do not repeat the original sentence.

Text:
";

/// Build the completion request for `text` in the given format.
pub fn build_request(format: ResponseFormat, model: &str, text: &str) -> ChatCompletionRequest {
    match format {
        ResponseFormat::Structured => ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![ChatMessage::user(text)],
            functions: Some(vec![grammar_check_function()]),
            function_call: Some(json!("auto")),
        },
        ResponseFormat::FreeText => ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![ChatMessage::user(format!(
                "{}{}",
                FREE_TEXT_INSTRUCTIONS, text
            ))],
            functions: None,
            function_call: None,
        },
    }
}

/// Schema of `log_grammar_check(grammar_score, changes, reasons)`.
pub fn grammar_check_function() -> FunctionDefinition {
    FunctionDefinition {
        name: GRAMMAR_FUNCTION_NAME.to_string(),
        description: "Check the grammar of the input text".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "grammar_score": {
                    "type": "integer",
                    "description": "The grammar score of the input text, e.g. 85.5, please make sure the score is between 0 and 100",
                },
                "changes": {
                    "type": "array",
                    "description": "The list of changes made to the input text, e.g. 1. 'I am' -> 'I'm'",
                    "items": { "type": "string" },
                },
                "reasons": {
                    "type": "array",
                    "description": "The list of reasons for the changes made to the input text, e.g. 1. 'I am' -> 'I'm' because 'I am' is informal",
                    "items": { "type": "string" },
                },
            },
            "required": ["grammar_score", "changes", "reasons"],
        }),
    }
}
