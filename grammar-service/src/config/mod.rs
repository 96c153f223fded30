use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo-16k-0613";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct GrammarConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub openai: OpenAiConfig,
    pub check: CheckConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: Secret<String>,
    /// Base URL of the completion API, without the `/chat/completions` path.
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckConfig {
    pub model: String,
    pub response_format: ResponseFormat,
    /// Upper bound on the single outbound completion call.
    pub request_timeout_secs: u64,
}

impl CheckConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// How the model is asked to answer, and therefore how its answer is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Function calling with the `log_grammar_check` schema.
    Structured,
    /// Plain completion split into blank-line separated sections.
    FreeText,
}

impl FromStr for ResponseFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" | "function_call" => Ok(ResponseFormat::Structured),
            "free_text" | "free-text" | "text" => Ok(ResponseFormat::FreeText),
            other => Err(format!("unknown response format '{}'", other)),
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseFormat::Structured => write!(f, "structured"),
            ResponseFormat::FreeText => write!(f, "free_text"),
        }
    }
}

impl GrammarConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let response_format = get_env("GRAMMAR_RESPONSE_FORMAT", Some("structured"), is_prod)?
            .parse::<ResponseFormat>()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("GRAMMAR_RESPONSE_FORMAT: {}", e)))?;

        let request_timeout_secs = get_env(
            "GRAMMAR_REQUEST_TIMEOUT_SECS",
            Some(&DEFAULT_REQUEST_TIMEOUT_SECS.to_string()),
            is_prod,
        )?
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!(
                "GRAMMAR_REQUEST_TIMEOUT_SECS must be a positive number of seconds"
            ))
        })?;

        Ok(GrammarConfig {
            common: common_config,
            openai: OpenAiConfig {
                api_key: Secret::new(get_env("OPENAI_API_KEY", None, is_prod)?),
                api_base: get_env("OPENAI_API_BASE", Some(DEFAULT_API_BASE), is_prod)?
                    .trim_end_matches('/')
                    .to_string(),
            },
            check: CheckConfig {
                model: get_env("GRAMMAR_MODEL", Some(DEFAULT_MODEL), is_prod)?,
                response_format,
                request_timeout_secs,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
