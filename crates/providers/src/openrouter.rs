use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use shared::chat_api::{ChatMessage, Role};
use shared::settings::GeneratorSettings;
use std::env;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;

use crate::prompts::{ENHANCE_INSTRUCTION, GENERATE_INSTRUCTION};

static SHARED_HTTP: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .pool_max_idle_per_host(2)
        .build()
        .expect("failed to build HTTP client")
});

const DEFAULT_BASE_URL: &str = "https://openrouter.ai";

// Attribution headers OpenRouter asks callers to send.
const REFERER: &str = "https://siteweaver.app";
const APP_TITLE: &str = "Siteweaver";

/// Classified failure of a completion request. All variants are terminal for
/// the current call; nothing is retried at this layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("the OpenRouter API key is missing, invalid, or expired")]
    Auth,
    #[error("{0}")]
    Request(String),
    #[error("received an empty response from the model")]
    EmptyResponse,
    #[error("could not reach the completion endpoint: {0}")]
    Transport(String),
}

/// What the project store needs from a completion backend.
///
/// Object safe so the store and its tests can take `&dyn WebsiteGenerator`.
#[async_trait]
pub trait WebsiteGenerator: Send + Sync {
    /// Turn a conversation into the raw text of a complete HTML document.
    async fn generate(&self, history: &[ChatMessage]) -> Result<String, GenerateError>;

    /// Expand a terse website request into a detailed brief. Independent of
    /// any project state.
    async fn enhance(&self, prompt: &str) -> Result<String, GenerateError>;
}

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

pub struct OpenRouterClient {
    http: Client,
    auth_token: String,
    model: String,
    base_url: String,
}

impl OpenRouterClient {
    /// Resolve the credential from settings, falling back to the
    /// `OPENROUTER_API_KEY` environment variable.
    pub fn from_settings(settings: &GeneratorSettings) -> Result<Self, GenerateError> {
        let auth_token = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .or_else(|| env::var("OPENROUTER_API_KEY").ok())
            .ok_or(GenerateError::Auth)?;

        Ok(Self {
            http: SHARED_HTTP.clone(),
            auth_token,
            model: settings.model.clone(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    async fn complete(&self, messages: Vec<WireMessage<'_>>) -> Result<String, GenerateError> {
        let url = format!("{}/api/v1/chat/completions", self.base_url);
        let req = CompletionRequest {
            model: &self.model,
            messages,
        };

        tracing::debug!("requesting completion from {} ({})", url, self.model);
        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .header("HTTP-Referer", REFERER)
            .header("X-Title", APP_TITLE)
            .json(&req)
            .send()
            .await
            .map_err(|e| GenerateError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| GenerateError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }
        extract_content(&body)
    }
}

#[async_trait]
impl WebsiteGenerator for OpenRouterClient {
    async fn generate(&self, history: &[ChatMessage]) -> Result<String, GenerateError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(WireMessage {
            role: Role::System.as_str(),
            content: GENERATE_INSTRUCTION,
        });
        messages.extend(history.iter().map(|m| WireMessage {
            role: m.role.as_str(),
            content: &m.content,
        }));
        self.complete(messages).await
    }

    async fn enhance(&self, prompt: &str) -> Result<String, GenerateError> {
        let messages = vec![
            WireMessage {
                role: Role::System.as_str(),
                content: ENHANCE_INSTRUCTION,
            },
            WireMessage {
                role: Role::User.as_str(),
                content: prompt,
            },
        ];
        Ok(self.complete(messages).await?.trim().to_string())
    }
}

/// Map a non-success response to the error taxonomy. 401 is a credential
/// problem; everything else carries the remote message when one is present.
fn classify_failure(status: StatusCode, body: &str) -> GenerateError {
    if status == StatusCode::UNAUTHORIZED {
        return GenerateError::Auth;
    }
    let remote_message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty());
    GenerateError::Request(remote_message.unwrap_or_else(|| {
        format!("API request failed with status {}", status.as_u16())
    }))
}

/// Pull the generated text out of a success body. A missing or empty
/// `choices[0].message.content` counts as an empty response.
fn extract_content(body: &str) -> Result<String, GenerateError> {
    serde_json::from_str::<CompletionResponse>(body)
        .ok()
        .and_then(|r| r.choices.into_iter().next())
        .and_then(|c| c.message.content)
        .filter(|content| !content.is_empty())
        .ok_or(GenerateError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_is_an_auth_error() {
        let err = classify_failure(StatusCode::UNAUTHORIZED, r#"{"error":{"message":"nope"}}"#);
        assert_eq!(err, GenerateError::Auth);
    }

    #[test]
    fn remote_error_message_is_carried() {
        let err = classify_failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":{"message":"boom"}}"#,
        );
        assert_eq!(err, GenerateError::Request("boom".to_string()));
    }

    #[test]
    fn unparseable_error_body_falls_back_to_status() {
        let err = classify_failure(StatusCode::SERVICE_UNAVAILABLE, "oops");
        assert_eq!(
            err,
            GenerateError::Request("API request failed with status 503".to_string())
        );
    }

    #[test]
    fn extracts_generated_text() {
        let body = r#"{"choices":[{"message":{"content":"<!DOCTYPE html>"}}]}"#;
        assert_eq!(extract_content(body), Ok("<!DOCTYPE html>".to_string()));
    }

    #[test]
    fn empty_or_missing_content_is_an_empty_response() {
        assert_eq!(
            extract_content(r#"{"choices":[{"message":{"content":""}}]}"#),
            Err(GenerateError::EmptyResponse)
        );
        assert_eq!(
            extract_content(r#"{"choices":[]}"#),
            Err(GenerateError::EmptyResponse)
        );
        assert_eq!(extract_content("not json"), Err(GenerateError::EmptyResponse));
    }

    #[test]
    fn missing_credential_is_an_auth_error() {
        let settings = GeneratorSettings {
            api_key: Some("   ".to_string()),
            ..GeneratorSettings::default()
        };
        // Blank settings key and (in this test environment) no env fallback.
        if env::var("OPENROUTER_API_KEY").is_err() {
            assert!(matches!(
                OpenRouterClient::from_settings(&settings),
                Err(GenerateError::Auth)
            ));
        }
    }
}
