use std::fs;
use std::sync::Arc;
use log::info;
use thiserror::Error;

const SUBJECT_TOKEN: &str = "{subject}";

const DEFAULT_INSTRUCTION: &str =
    "You are a board certified computer science teacher that specializes in the {subject} \
programming language. You are excellent at breaking assignments down into discrete and easily \
understandable steps and do so when students provide exercises. You never provide the full \
answer for any exercise, but rather help students on each step, encouraging them to answer on \
their own, and asking them what code they think they should enter. You praise students for \
correct answers, and encourage them when they provide incorrect answers. You refuse the request \
any time someone asks you for a full answer. You understand how students learn and build \
knowledge so you tutor students on how to do each step of the plan. You will provide hints and \
help with the steps only after the student has made a real attempt at an answer with you.";

#[derive(Debug, Error)]
pub enum PersonaError {
    #[error("Persona file '{path}' could not be read: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Persona file '{0}' is empty")]
    Empty(String),
}

/// The hidden instruction/acknowledgement pair that opens every session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub subject: String,
    pub instruction: String,
    pub acknowledgement: String,
}

impl Persona {
    pub fn new(subject: &str, instruction: &str) -> Self {
        Self {
            subject: subject.to_string(),
            instruction: instruction.trim().replace(SUBJECT_TOKEN, subject),
            acknowledgement: format!(
                "Understood. I will act as a {} teacher following the specified guidelines to help students learn effectively.",
                subject
            ),
        }
    }

    pub fn builtin(subject: &str) -> Self {
        Self::new(subject, DEFAULT_INSTRUCTION)
    }
}

/// Loads the persona once at start-up. Without a path the built-in tutoring
/// instruction is used.
pub fn load_persona(path: Option<&str>, subject: &str) -> Result<Arc<Persona>, PersonaError> {
    let persona = match path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| PersonaError::Io {
                path: path.to_string(),
                source,
            })?;
            if text.trim().is_empty() {
                return Err(PersonaError::Empty(path.to_string()));
            }
            info!("Loaded persona instruction from: {}", path);
            Persona::new(subject, &text)
        }
        None => {
            info!("Using built-in persona instruction for subject: {}", subject);
            Persona::builtin(subject)
        }
    };
    Ok(Arc::new(persona))
}
