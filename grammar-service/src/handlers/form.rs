use askama::Template;
use axum::{extract::Query, response::IntoResponse, Form};
use serde::Deserialize;

#[derive(Template)]
#[template(path = "main.html")]
pub struct MainTemplate {
    pub text: String,
}

/// Optional pre-fill for the landing page.
#[derive(Debug, Default, Deserialize)]
pub struct FormParams {
    pub text_input: Option<String>,
}

impl From<FormParams> for MainTemplate {
    fn from(params: FormParams) -> Self {
        MainTemplate {
            text: params.text_input.unwrap_or_default(),
        }
    }
}

/// `GET /`, optionally with `?text_input=...`.
pub async fn form_page(Query(params): Query<FormParams>) -> impl IntoResponse {
    MainTemplate::from(params)
}

/// `POST /` with an optional `text_input` form field.
pub async fn form_submit(Form(params): Form<FormParams>) -> impl IntoResponse {
    MainTemplate::from(params)
}
