use log::{ info, warn };
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::{ ChatSession, ChatTransport, ClientError };

/// Remembers the last subject seen from the server.
#[derive(Debug, Default, Clone)]
pub struct SubjectWatcher {
    current: Option<String>,
}

impl SubjectWatcher {
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Returns true when `subject` differs from a previously seen value. The
    /// first observation only records it.
    pub fn observe(&mut self, subject: &str) -> bool {
        match self.current.replace(subject.to_string()) {
            Some(previous) => previous != subject,
            None => false,
        }
    }
}

/// One poll: fetch the subject and clear the transcript if it changed.
pub async fn check_subject<T: ChatTransport + ?Sized>(
    watcher: &mut SubjectWatcher,
    transport: &T,
    session: &Mutex<ChatSession>
) -> Result<bool, ClientError> {
    let subject = transport.fetch_subject().await?;
    let changed = watcher.observe(&subject);
    if changed {
        info!("Tutor subject changed to '{}'; clearing transcript", subject);
        session.lock().await.reset();
    }
    Ok(changed)
}

pub async fn poll_subject<T: ChatTransport + ?Sized>(
    transport: Arc<T>,
    session: Arc<Mutex<ChatSession>>,
    every: Duration
) {
    let mut watcher = SubjectWatcher::default();
    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        if let Err(e) = check_subject(&mut watcher, transport.as_ref(), &session).await {
            warn!("Subject poll failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::ScriptedTransport;
    use crate::models::chat::{ ChatReply, Turn };

    #[test]
    fn first_observation_is_not_a_change() {
        let mut watcher = SubjectWatcher::default();
        assert!(!watcher.observe("Python"));
        assert!(!watcher.observe("Python"));
        assert!(watcher.observe("Java"));
        assert_eq!(watcher.current(), Some("Java"));
    }

    #[tokio::test]
    async fn change_clears_transcript() {
        let transport = ScriptedTransport::with_subjects(
            vec![
                Ok("Python".into()),
                Err(ClientError::Server("down".into())),
                Ok("Python".into()),
                Ok("Java".into())
            ]
        );
        let mut initial = ChatSession::new();
        initial.begin_submit("q").unwrap();
        initial.complete_submit(
            Ok(ChatReply {
                response: Some("a".into()),
                history: Some(vec![Turn::user("q"), Turn::assistant("a")]),
                error: None,
            })
        );
        let session = Mutex::new(initial);
        let mut watcher = SubjectWatcher::default();

        assert!(!check_subject(&mut watcher, &transport, &session).await.unwrap());
        assert!(check_subject(&mut watcher, &transport, &session).await.is_err());
        assert!(!check_subject(&mut watcher, &transport, &session).await.unwrap());
        assert_eq!(session.lock().await.transcript().len(), 2);

        assert!(check_subject(&mut watcher, &transport, &session).await.unwrap());
        assert!(session.lock().await.transcript().is_empty());
    }
}
