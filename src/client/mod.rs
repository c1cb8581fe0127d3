//! Client side of the chat protocol: the visible transcript, the
//! `Idle → Sending → Idle` cycle, and the transports that reach the endpoint.

pub mod subject;
pub mod transport;

use async_trait::async_trait;
use log::{ error, info };
use thiserror::Error;
use uuid::Uuid;

use crate::models::chat::{ ChatReply, ChatRequest, Turn };

pub use transport::HttpTransport;

/// Shown in place of a reply whenever a turn fails.
pub const ERROR_REPLY: &str = "Sorry, there was an error processing your message.";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("a message is already being sent")]
    Busy,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Server(String),
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ClientError>;
    async fn fetch_subject(&self) -> Result<String, ClientError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Sending,
}

/// How a finished turn changed the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The server's canonical history replaced the local transcript.
    Replaced,
    /// The server sent only a reply, which was appended.
    Appended,
    /// The turn failed; a synthetic assistant turn was appended.
    Failed(String),
    /// The transcript was reset while the turn was in flight; the result was
    /// dropped so the next turn starts a fresh conversation.
    Discarded,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    session_id: String,
    transcript: Vec<Turn>,
    state: SessionState,
    epoch: u64,
    pending_epoch: Option<u64>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().simple().to_string(),
            transcript: Vec::new(),
            state: SessionState::Idle,
            epoch: 0,
            pending_epoch: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Clears the transcript. The session identifier is kept; a turn already
    /// in flight will not write back into the cleared transcript.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.epoch += 1;
    }

    /// Validates the input, builds the request from the transcript as it was
    /// before this turn, then shows the user's turn and enters `Sending`.
    pub fn begin_submit(&mut self, input: &str) -> Result<ChatRequest, ClientError> {
        let message = input.trim();
        if message.is_empty() {
            return Err(ClientError::EmptyMessage);
        }
        if self.state == SessionState::Sending {
            return Err(ClientError::Busy);
        }

        let request = ChatRequest {
            message: Some(message.to_string()),
            session_id: Some(self.session_id.clone()),
            history: self.transcript.clone(),
        };
        self.transcript.push(Turn::user(message));
        self.state = SessionState::Sending;
        self.pending_epoch = Some(self.epoch);
        Ok(request)
    }

    pub fn complete_submit(&mut self, result: Result<ChatReply, ClientError>) -> SubmitOutcome {
        self.state = SessionState::Idle;
        if self.pending_epoch.take() != Some(self.epoch) {
            info!("Session {}: transcript was reset mid-turn; dropping reply", self.session_id);
            return SubmitOutcome::Discarded;
        }
        match result {
            Ok(ChatReply { error: Some(error), .. }) => self.fail(error),
            Ok(ChatReply { history: Some(history), .. }) => {
                self.transcript = history;
                SubmitOutcome::Replaced
            }
            Ok(ChatReply { response: Some(response), .. }) => {
                self.transcript.push(Turn::assistant(response));
                SubmitOutcome::Appended
            }
            Ok(_) => self.fail("reply carried neither history nor response".to_string()),
            Err(e) => self.fail(e.to_string()),
        }
    }

    fn fail(&mut self, reason: String) -> SubmitOutcome {
        error!("Session {}: turn failed: {}", self.session_id, reason);
        self.transcript.push(Turn::assistant(ERROR_REPLY));
        SubmitOutcome::Failed(reason)
    }

    /// One full turn against `transport`. Only input rejections are returned
    /// as errors; transport failures end up in the transcript.
    pub async fn submit<T: ChatTransport + ?Sized>(
        &mut self,
        transport: &T,
        input: &str
    ) -> Result<SubmitOutcome, ClientError> {
        let request = self.begin_submit(input)?;
        info!("Session {}: sending turn with {} prior turns", self.session_id, request.history.len());
        let result = transport.send(&request).await;
        Ok(self.complete_submit(result))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::chat::Role;
    use std::sync::Mutex;
    use std::collections::VecDeque;

    /// Transport double answering from a queue and recording requests.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        pub replies: Mutex<VecDeque<Result<ChatReply, ClientError>>>,
        pub subjects: Mutex<VecDeque<Result<String, ClientError>>>,
        pub requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedTransport {
        pub fn replying(replies: Vec<Result<ChatReply, ClientError>>) -> Self {
            Self { replies: Mutex::new(replies.into()), ..Default::default() }
        }

        pub fn with_subjects(subjects: Vec<Result<String, ClientError>>) -> Self {
            Self { subjects: Mutex::new(subjects.into()), ..Default::default() }
        }
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ClientError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::Server("no scripted reply".into())))
        }

        async fn fetch_subject(&self) -> Result<String, ClientError> {
            self.subjects
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::Server("no scripted subject".into())))
        }
    }

    fn canonical(history: Vec<Turn>) -> Result<ChatReply, ClientError> {
        let response = history.last().map(|t| t.content.clone());
        Ok(ChatReply { response, history: Some(history), error: None })
    }

    #[test]
    fn session_id_is_stable() {
        let mut session = ChatSession::new();
        let id = session.session_id().to_string();
        assert!(!id.is_empty());
        let req = session.begin_submit("hi").unwrap();
        assert_eq!(req.session_id.as_deref(), Some(id.as_str()));
        session.reset();
        assert_eq!(session.session_id(), id);
        assert_ne!(ChatSession::new().session_id(), id);
    }

    #[test]
    fn whitespace_input_is_rejected_without_state_change() {
        let mut session = ChatSession::new();
        assert!(matches!(session.begin_submit("   \n\t"), Err(ClientError::EmptyMessage)));
        assert!(session.transcript().is_empty());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn request_carries_pre_request_transcript() {
        let mut session = ChatSession::new();
        session.begin_submit("q1").unwrap();
        session.complete_submit(canonical(vec![Turn::user("q1"), Turn::assistant("a1")]));

        let req = session.begin_submit("  q2 ").unwrap();
        assert_eq!(req.message.as_deref(), Some("q2"));
        assert_eq!(req.history, vec![Turn::user("q1"), Turn::assistant("a1")]);
        assert_eq!(session.transcript().last(), Some(&Turn::user("q2")));
        assert_eq!(session.state(), SessionState::Sending);
    }

    #[test]
    fn second_submit_while_sending_is_busy() {
        let mut session = ChatSession::new();
        session.begin_submit("one").unwrap();
        assert!(matches!(session.begin_submit("two"), Err(ClientError::Busy)));
        assert_eq!(session.transcript().len(), 1);
    }

    #[tokio::test]
    async fn canonical_history_replaces_transcript() {
        let transport = ScriptedTransport::replying(
            vec![canonical(vec![Turn::user("What is a variable?"), Turn::assistant("A name.")])]
        );
        let mut session = ChatSession::new();
        let outcome = session.submit(&transport, "What is a variable?").await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Replaced);
        assert_eq!(
            session.transcript(),
            &[Turn::user("What is a variable?"), Turn::assistant("A name.")]
        );
        assert_eq!(session.state(), SessionState::Idle);
        assert!(transport.requests.lock().unwrap()[0].history.is_empty());
    }

    #[tokio::test]
    async fn reply_without_history_is_appended() {
        let transport = ScriptedTransport::replying(
            vec![Ok(ChatReply { response: Some("hello".into()), history: None, error: None })]
        );
        let mut session = ChatSession::new();
        let outcome = session.submit(&transport, "hi").await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Appended);
        assert_eq!(session.transcript(), &[Turn::user("hi"), Turn::assistant("hello")]);
    }

    #[tokio::test]
    async fn failure_appends_exactly_one_assistant_turn() {
        let transport = ScriptedTransport::replying(
            vec![Err(ClientError::Server("Internal Server Error: boom".into()))]
        );
        let mut session = ChatSession::new();
        session.begin_submit("hi").unwrap();
        let shown = session.transcript().len();
        let outcome = session.complete_submit(transport.send(&ChatRequest::default()).await);

        assert!(matches!(outcome, SubmitOutcome::Failed(ref m) if m.contains("boom")));
        assert_eq!(session.transcript().len(), shown + 1);
        let last = session.transcript().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, ERROR_REPLY);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn reset_during_turn_drops_stale_history() {
        let mut session = ChatSession::new();
        session.begin_submit("q").unwrap();
        session.reset();
        let outcome = session.complete_submit(canonical(vec![Turn::user("q"), Turn::assistant("a")]));

        assert_eq!(outcome, SubmitOutcome::Discarded);
        assert!(session.transcript().is_empty());
        assert_eq!(session.state(), SessionState::Idle);

        let next = session.begin_submit("q2").unwrap();
        assert!(next.history.is_empty());
    }

    #[test]
    fn reset_between_turns_does_not_discard_next_reply() {
        let mut session = ChatSession::new();
        session.reset();
        session.begin_submit("q").unwrap();
        let outcome = session.complete_submit(canonical(vec![Turn::user("q"), Turn::assistant("a")]));
        assert_eq!(outcome, SubmitOutcome::Replaced);
        assert_eq!(session.transcript().len(), 2);
    }

    #[test]
    fn error_field_in_reply_is_a_failure() {
        let mut session = ChatSession::new();
        session.begin_submit("hi").unwrap();
        let outcome = session.complete_submit(
            Ok(ChatReply {
                response: Some("ignored".into()),
                history: Some(vec![Turn::user("hi"), Turn::assistant("ignored")]),
                error: Some("Internal Server Error: boom".into()),
            })
        );

        assert_eq!(outcome, SubmitOutcome::Failed("Internal Server Error: boom".into()));
        assert_eq!(session.transcript(), &[Turn::user("hi"), Turn::assistant(ERROR_REPLY)]);
    }

    #[tokio::test]
    async fn empty_reply_counts_as_failure() {
        let transport = ScriptedTransport::replying(vec![Ok(ChatReply::default())]);
        let mut session = ChatSession::new();
        let outcome = session.submit(&transport, "hi").await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert_eq!(session.transcript().len(), 2);
    }
}
