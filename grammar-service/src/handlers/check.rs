use crate::models::GrammarCheckResult;
use crate::startup::AppState;
use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;

#[derive(Template)]
#[template(path = "grammar_check_result.html")]
pub struct GrammarCheckResultTemplate {
    pub text: String,
    pub result: Option<GrammarCheckResult>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckForm {
    pub text_input: String,
}

/// `POST /check`: grade the submitted text and render the outcome.
pub async fn check_grammar(
    State(state): State<AppState>,
    Form(form): Form<CheckForm>,
) -> Response {
    match state.checker.check(&form.text_input).await {
        Ok(result) => GrammarCheckResultTemplate {
            text: form.text_input,
            result: Some(result),
            error_message: None,
        }
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Grammar check failed");
            (
                e.status_code(),
                GrammarCheckResultTemplate {
                    text: form.text_input,
                    result: None,
                    error_message: Some(e.user_message().to_string()),
                },
            )
                .into_response()
        }
    }
}
