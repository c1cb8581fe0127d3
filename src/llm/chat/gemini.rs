use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use log::{ debug, info };

use super::{ check_status, ChatClient, CompletionResponse, ContextPart, ProviderError, ProviderRole };
use crate::llm::LlmConfig;

const DEFAULT_MODEL: &str = "gemini-2.0-flash-thinking-exp-1219";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1alpha";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: ProviderRole,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
}

#[derive(Deserialize)]
struct GoogleCandidate {
    content: Option<GoogleContent>,
}

#[derive(Deserialize)]
struct GoogleContent {
    #[serde(default)]
    parts: Vec<GooglePart>,
}

#[derive(Deserialize)]
struct GooglePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

fn build_request(contents: &[ContextPart]) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: contents
            .iter()
            .map(|part| GeminiContent {
                role: part.role,
                parts: vec![GeminiPart { text: &part.text }],
            })
            .collect(),
    }
}

/// Joins the visible text parts of the first candidate. Thinking models
/// return their reasoning as parts flagged `thought`, which are dropped.
fn extract_text(resp: GenerateContentResponse) -> Result<String, ProviderError> {
    let text = resp.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content.parts
                .into_iter()
                .filter(|p| !p.thought)
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(text)
}

pub struct GeminiChatClient {
    http: HttpClient,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiChatClient {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        let chat_model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            http: HttpClient::new(),
            api_key,
            model: chat_model,
            base_url: url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ProviderError> {
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::Config("Google API key is required for GeminiChatClient".to_string())
            })?;

        Ok(Self::new(api_key, config.completion_model.clone(), config.base_url.clone()))
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn complete(&self, contents: &[ContextPart]) -> Result<CompletionResponse, ProviderError> {
        info!(
            "GeminiChatClient::complete() → model={} base_url={} parts={}",
            self.model,
            self.base_url,
            contents.len()
        );
        let payload = build_request(contents);
        let resp = self.http
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&payload)
            .send().await?;
        let resp = check_status(resp).await?;
        let data = resp.json::<GenerateContentResponse>().await?;
        let text = extract_text(data)?;
        debug!("Gemini reply: {} chars", text.len());
        Ok(CompletionResponse { response: text })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}
