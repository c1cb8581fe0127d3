use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use log::info;

use super::{ check_status, ChatClient, CompletionResponse, ContextPart, ProviderError };
use crate::llm::{ LlmConfig, LlmType };
use crate::models::chat::Role;

#[derive(Debug)]
pub struct OllamaClient {
    http: HttpClient,
    base_url: String,
    completion_model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct OllamaMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OllamaClient {
    pub fn new(base_url: Option<String>, completion_model: Option<String>) -> Self {
        let model = completion_model.unwrap_or_else(|| "llama3.2".to_string());
        let url = base_url.unwrap_or_else(|| "http://localhost:11434".into());

        Self {
            http: HttpClient::new(),
            base_url: url.trim_end_matches('/').to_string(),
            completion_model: model,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ProviderError> {
        if config.llm_type != LlmType::Ollama {
            return Err(ProviderError::Config("Invalid config type for OllamaClient".into()));
        }

        Ok(Self::new(config.base_url.clone(), config.completion_model.clone()))
    }

    // Ollama speaks the user/assistant vocabulary, so model parts map back.
    fn build_request<'a>(&'a self, contents: &'a [ContextPart]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.completion_model,
            messages: contents
                .iter()
                .map(|part| OllamaMessage { role: part.role.into(), content: &part.text })
                .collect(),
            stream: false,
        }
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn complete(&self, contents: &[ContextPart]) -> Result<CompletionResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);
        info!("OllamaClient::complete() → model={} url={}", self.completion_model, url);
        let req = self.build_request(contents);
        let resp = self.http.post(&url).json(&req).send().await?;
        let resp = check_status(resp).await?;
        let data = resp.json::<ChatResponse>().await?;
        if data.message.content.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(CompletionResponse { response: data.message.content })
    }

    fn get_model(&self) -> String {
        self.completion_model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}
