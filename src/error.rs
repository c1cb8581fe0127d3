use axum::{ http::StatusCode, response::{ IntoResponse, Response }, Json };
use thiserror::Error;

use crate::llm::chat::ProviderError;
use crate::models::chat::ErrorBody;

/// Failures of the chat endpoint, each mapped to one HTTP status.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    #[error("Internal Server Error: {0}")]
    Provider(#[from] ProviderError),
}

impl ChatError {
    pub fn status(&self) -> StatusCode {
        match self {
            ChatError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ChatError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ChatError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ChatError::MethodNotAllowed => (status, "Method Not Allowed").into_response(),
            other => (status, Json(ErrorBody { error: other.to_string() })).into_response(),
        }
    }
}
