use crate::agent::TutorAgent;
use crate::error::ChatError;
use crate::models::chat::{ ChatRequest, ChatResponse, SubjectResponse };
use axum::{
    body::Bytes,
    extract::State,
    http::Method,
    routing::{ any, get },
    Json,
    Router,
};
use log::{ debug, info };
use tower_http::cors::{ Any, CorsLayer };

pub const CHAT_PATH: &str = "/api/chat";
pub const SUBJECT_PATH: &str = "/api/subject";

#[derive(Clone)]
struct AppState {
    agent: TutorAgent,
}

pub fn router(agent: TutorAgent) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route(CHAT_PATH, any(chat_handler))
        .route(SUBJECT_PATH, get(subject_handler))
        .layer(cors)
        .with_state(AppState { agent })
}

async fn chat_handler(
    method: Method,
    State(state): State<AppState>,
    body: Bytes
) -> Result<Json<ChatResponse>, ChatError> {
    if method != Method::POST {
        return Err(ChatError::MethodNotAllowed);
    }

    let req: ChatRequest = serde_json
        ::from_slice(&body)
        .map_err(|e| ChatError::InvalidRequest(format!("Invalid request body: {}", e)))?;

    let (message, session_id) = match (
        req.message.filter(|m| !m.is_empty()),
        req.session_id.filter(|s| !s.is_empty()),
    ) {
        (Some(message), Some(session_id)) => (message, session_id),
        _ => {
            return Err(ChatError::InvalidRequest("Message and sessionId are required".into()));
        }
    };

    info!("Chat request for session {} ({} prior turns)", session_id, req.history.len());
    debug!("Session {} message: {}", session_id, message);

    let resp = state.agent.respond(&session_id, &message, &req.history).await?;
    Ok(Json(resp))
}

async fn subject_handler(State(state): State<AppState>) -> Json<SubjectResponse> {
    Json(SubjectResponse { subject: state.agent.subject().to_string() })
}
