pub mod gemini;
pub mod ollama;

use async_trait::async_trait;
use serde::{ Deserialize, Serialize };
use std::sync::Arc;
use thiserror::Error;
use super::{ LlmConfig, LlmType };
use self::gemini::GeminiChatClient;
use self::ollama::OllamaClient;
use crate::models::chat::Role;

/// Role vocabulary on the provider side of the conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderRole {
    User,
    Model,
}

impl From<Role> for ProviderRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => ProviderRole::User,
            Role::Assistant => ProviderRole::Model,
        }
    }
}

impl From<ProviderRole> for Role {
    fn from(role: ProviderRole) -> Self {
        match role {
            ProviderRole::User => Role::User,
            ProviderRole::Model => Role::Assistant,
        }
    }
}

/// A single role-tagged entry of the context sent to the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextPart {
    pub role: ProviderRole,
    pub text: String,
}

impl ContextPart {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: ProviderRole::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: ProviderRole::Model, text: text.into() }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Http(reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Status {
        status: u16,
        body: String,
    },
    #[error("provider returned no text")]
    EmptyResponse,
    #[error("provider misconfigured: {0}")]
    Config(String),
}

// reqwest puts the request URL in its error text; provider URLs must not
// reach callers or logs.
impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Http(err.without_url())
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends the whole ordered context and waits for a single text reply.
    async fn complete(&self, contents: &[ContextPart]) -> Result<CompletionResponse, ProviderError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, ProviderError> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::Gemini => {
            let specific_client = GeminiChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::Ollama => {
            let specific_client = OllamaClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}

/// Turns a non-success HTTP response into a `ProviderError::Status`, keeping
/// the body so the caller sees what the provider complained about.
pub(crate) async fn check_status(
    resp: reqwest::Response
) -> Result<reqwest::Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ProviderError::Status { status: status.as_u16(), body })
}
