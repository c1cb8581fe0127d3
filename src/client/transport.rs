use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use url::Url;

use super::{ ChatTransport, ClientError };
use crate::models::chat::{ ChatReply, ChatRequest, SubjectResponse };

/// Talks to a tutor server over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: HttpClient,
    chat_url: Url,
    subject_url: Url,
}

impl HttpTransport {
    pub fn new(endpoint: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(endpoint)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: HttpClient::new(),
            chat_url: base.join("api/chat")?,
            subject_url: base.join("api/subject")?,
        })
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    pub fn subject_url(&self) -> &Url {
        &self.subject_url
    }
}

/// Reads the endpoint's reply. An `error` field wins over the status code,
/// and a body that is not JSON is reported with the status it came with.
fn interpret_reply(status: reqwest::StatusCode, body: &str) -> Result<ChatReply, ClientError> {
    match serde_json::from_str::<ChatReply>(body) {
        Ok(ChatReply { error: Some(error), .. }) => Err(ClientError::Server(error)),
        Ok(_) if !status.is_success() => Err(ClientError::Server(format!("HTTP {}", status))),
        Ok(reply) => Ok(reply),
        Err(_) if !status.is_success() => {
            Err(ClientError::Server(format!("HTTP {}: {}", status, body.trim())))
        }
        Err(e) => Err(ClientError::Server(format!("Invalid response body: {}", e))),
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ClientError> {
        debug!("POST {} ({} history turns)", self.chat_url, request.history.len());
        let resp = self.http.post(self.chat_url.clone()).json(request).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        interpret_reply(status, &body)
    }

    async fn fetch_subject(&self) -> Result<String, ClientError> {
        let resp = self.http.get(self.subject_url.clone()).send().await?.error_for_status()?;
        let body = resp.json::<SubjectResponse>().await?;
        Ok(body.subject)
    }
}
