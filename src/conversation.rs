//! Assembly of the model-facing context from a client transcript, and the
//! reverse projection back to the transcript the client keeps.

use crate::config::persona::Persona;
use crate::llm::chat::{ ContextPart, ProviderRole };
use crate::models::chat::Turn;

/// Ordered provider-facing conversation for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    parts: Vec<ContextPart>,
    primed: bool,
}

impl Context {
    pub fn parts(&self) -> &[ContextPart] {
        &self.parts
    }

    /// Whether the persona pair was injected at the head of this context.
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    pub fn push_user(&mut self, message: &str) {
        self.parts.push(ContextPart::user(message));
    }

    pub fn push_model(&mut self, reply: &str) {
        self.parts.push(ContextPart::model(reply));
    }

    /// Drops the persona pair (if this context carries one) and maps the
    /// remaining parts back to transcript roles.
    pub fn into_transcript(self) -> Vec<Turn> {
        let skip = if self.primed { 2 } else { 0 };
        self.parts
            .into_iter()
            .skip(skip)
            .map(|part| Turn { role: part.role.into(), content: part.text })
            .collect()
    }
}

/// Builds the context for a turn. An empty history marks a fresh session and
/// gets the persona pair; otherwise the history is mapped as is.
pub fn build_context(persona: &Persona, history: &[Turn]) -> Context {
    let mut parts = Vec::with_capacity(history.len() + 4);
    let primed = history.is_empty();

    if primed {
        parts.push(ContextPart::user(&persona.instruction));
        parts.push(ContextPart::model(&persona.acknowledgement));
    }

    parts.extend(
        history.iter().map(|turn| ContextPart {
            role: ProviderRole::from(turn.role),
            text: turn.content.clone(),
        })
    );

    Context { parts, primed }
}
