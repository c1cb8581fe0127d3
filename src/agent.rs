use crate::cli::Args;
use crate::config::persona::{ self, Persona };
use crate::conversation::build_context;
use crate::llm::{ LlmConfig, LlmType };
use crate::llm::chat::{ ChatClient, ProviderError, new_client as new_chat_client };
use crate::models::chat::{ ChatResponse, Turn };

use log::{ debug, info, error };
use std::error::Error;
use std::sync::Arc;

/// Read-only state shared by every request: the provider client and the
/// persona. Built once at start-up and never replaced.
#[derive(Clone)]
pub struct TutorAgent {
    chat_client: Arc<dyn ChatClient>,
    persona: Arc<Persona>,
}

impl TutorAgent {
    pub fn new(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let persona = persona::load_persona(args.persona_path.as_deref(), &args.subject)?;
        let chat_client = Self::initialize_llm_client(args)?;
        Ok(Self::with_client(chat_client, persona))
    }

    pub fn with_client(chat_client: Arc<dyn ChatClient>, persona: Arc<Persona>) -> Self {
        Self { chat_client, persona }
    }

    fn initialize_llm_client(args: &Args) -> Result<Arc<dyn ChatClient>, Box<dyn Error + Send + Sync>> {
        let chat_llm_type = args.chat_llm_type.parse::<LlmType>()?;
        let chat_api_key = if !args.chat_api_key.is_empty() {
            Some(args.chat_api_key.clone())
        } else {
            None
        };
        let chat_config = LlmConfig {
            llm_type: chat_llm_type,
            base_url: args.chat_base_url.clone(),
            api_key: chat_api_key,
            completion_model: args.chat_model.clone(),
        };
        let chat_client = new_chat_client(&chat_config)?;
        info!(
            "Chat client configured: Type={}, Model={}, BaseURL={:?}",
            chat_config.llm_type,
            chat_client.get_model(),
            chat_client.get_base_url().as_deref().unwrap_or("adapter default")
        );
        Ok(chat_client)
    }

    pub fn subject(&self) -> &str {
        &self.persona.subject
    }

    /// Runs one turn: rebuild the context from the client's history, ask the
    /// provider, and hand back the reply with the canonical transcript.
    pub async fn respond(
        &self,
        session_id: &str,
        message: &str,
        history: &[Turn]
    ) -> Result<ChatResponse, ProviderError> {
        let mut context = build_context(&self.persona, history);
        if context.is_primed() {
            info!("Session {}: starting new conversation with persona preamble", session_id);
        }
        context.push_user(message);
        debug!("Session {}: sending {} parts to provider", session_id, context.parts().len());

        let reply = self.chat_client
            .complete(context.parts()).await
            .map_err(|e| {
                error!("Session {}: provider call failed: {}", session_id, e);
                e
            })?;
        context.push_model(&reply.response);

        Ok(ChatResponse {
            response: reply.response,
            history: context.into_transcript(),
        })
    }
}
