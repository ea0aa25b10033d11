use std::sync::Arc;
use std::time::Duration;

use log::Level;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

pub use error::NamerError;
pub use response_parser::parse_suggestions;
pub use variable_namer::{GenerationRequest, NameKind, SuggestionService};

mod error;
mod response_parser;
mod variable_namer;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 500;

/// A candidate identifier returned to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSuggestion {
    pub name: String,
    pub explanation: Option<String>,
    pub reason: Option<String>,
}

/// Provider connection settings, re-read for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub api_key: Option<String>,
    pub api_endpoint: String,
    pub model: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Sink for diagnostic messages, owned by whoever hosts the service.
pub trait Diagnostics: Send + Sync {
    fn record(&self, level: Level, message: &str);
}

/// Forwards diagnostics to the `log` facade.
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn record(&self, level: Level, message: &str) {
        log::log!(target: "namer", level, "{}", message);
    }
}

pub type DiagnosticsRef = Arc<dyn Diagnostics>;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new_system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn new_user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
}

pub fn build_http_client() -> Result<Client, NamerError> {
    Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

/// Send one chat-completion request and return the first choice's content.
pub async fn ask_chat_gpt(
    client: &Client,
    config: &ServiceConfig,
    api_key: &str,
    conversation_history: &[ChatMessage],
) -> Result<String, NamerError> {
    let request = ChatCompletionRequest {
        model: &config.model,
        messages: conversation_history,
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    };

    let response = client
        .post(&config.api_endpoint)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(NamerError::Provider {
            status: status.as_u16(),
            message: provider_error_message(&body),
        });
    }

    let res: Value = serde_json::from_str(&body)
        .map_err(|e| NamerError::MalformedResponse(format!("invalid JSON body: {e}")))?;
    let content = res
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            NamerError::MalformedResponse("no content in the first choice".to_string())
        })?;
    Ok(content.to_string())
}

fn provider_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| "unknown error".to_string())
}
