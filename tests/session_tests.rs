use async_trait::async_trait;
use duologue::client_wrapper::{ClientWrapper, Role, TokenUsage, Turn};
use duologue::{ConversationSession, Participant, ParticipantStatus};
use std::sync::Arc;
use tokio::sync::Mutex;

// Mock client for testing
struct MockClient {
    reply_text: String,
    usage: Mutex<Option<TokenUsage>>,
    last_context_len: Mutex<usize>,
    last_instruction: Mutex<String>,
}

impl MockClient {
    fn new(reply_text: &str) -> Self {
        Self {
            reply_text: reply_text.to_string(),
            usage: Mutex::new(Some(TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
                total_tokens: 15,
            })),
            last_context_len: Mutex::new(0),
            last_instruction: Mutex::new(String::new()),
        }
    }

    async fn last_context_len(&self) -> usize {
        *self.last_context_len.lock().await
    }

    async fn last_instruction(&self) -> String {
        self.last_instruction.lock().await.clone()
    }
}

#[async_trait]
impl ClientWrapper for MockClient {
    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn generate(
        &self,
        role_instruction: &str,
        context: &[Turn],
    ) -> Result<Turn, Box<dyn std::error::Error>> {
        *self.last_context_len.lock().await = context.len();
        *self.last_instruction.lock().await = role_instruction.to_string();
        Ok(Turn::assistant(self.reply_text.clone()))
    }

    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        Some(&self.usage)
    }
}

// Client whose backing call always fails
struct FailingClient;

#[async_trait]
impl ClientWrapper for FailingClient {
    fn model_name(&self) -> &str {
        "failing-model"
    }

    async fn generate(
        &self,
        _role_instruction: &str,
        _context: &[Turn],
    ) -> Result<Turn, Box<dyn std::error::Error>> {
        Err("connection reset by peer".into())
    }
}

fn session_with(client: Arc<dyn ClientWrapper>) -> ConversationSession {
    ConversationSession::new(Participant::new("Assistant", "You are helpful.", client))
}

#[tokio::test]
async fn transcript_holds_two_turns_per_submission() {
    duologue::init_logger();

    let mut session = session_with(Arc::new(MockClient::new("sure thing")));

    for n in 1..=3usize {
        let reply = session.send(&format!("question {}", n)).await.unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(session.transcript().len(), 2 * n);
    }

    // Strict chronological order: user and assistant turns alternate.
    for (index, turn) in session.transcript().iter().enumerate() {
        let expected = if index % 2 == 0 { Role::User } else { Role::Assistant };
        assert_eq!(turn.role, expected, "turn {} out of order", index);
    }
}

#[tokio::test]
async fn reply_context_replays_the_full_transcript() {
    duologue::init_logger();

    let client = Arc::new(MockClient::new("ok"));
    let mut session = session_with(client.clone());

    session.send("first").await.unwrap();
    // The second call sees user+assistant+user = 3 turns of context.
    session.send("second").await.unwrap();

    assert_eq!(client.last_context_len().await, 3);
    assert_eq!(client.last_instruction().await, "You are helpful.");
}

#[tokio::test]
async fn failing_call_yields_error_turn_not_panic() {
    duologue::init_logger();

    let mut session = session_with(Arc::new(FailingClient));

    let reply = session.send("hello?").await.unwrap();
    assert_eq!(reply.role, Role::Assistant);
    assert!(reply.text.contains("connection reset by peer"));
    assert_eq!(session.status(), ParticipantStatus::Error);

    // The transcript still gained both turns and stays usable.
    assert_eq!(session.transcript().len(), 2);
}

#[tokio::test]
async fn error_status_is_not_terminal() {
    duologue::init_logger();

    let mut session = session_with(Arc::new(FailingClient));
    session.send("first").await.unwrap();
    assert_eq!(session.status(), ParticipantStatus::Error);

    // The next submitted turn re-enters Working and produces another
    // well-formed (error-text) reply.
    let reply = session.send("second").await.unwrap();
    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(session.transcript().len(), 4);
}

#[tokio::test]
async fn empty_input_is_not_submitted() {
    duologue::init_logger();

    let mut session = session_with(Arc::new(MockClient::new("unused")));

    assert!(!session.submit_user_turn("").await);
    assert!(session.send("").await.is_none());
    assert!(session.transcript().is_empty());
    assert_eq!(session.status(), ParticipantStatus::Available);
}

#[tokio::test]
async fn usage_is_reported_with_the_reply() {
    duologue::init_logger();

    let client = Arc::new(MockClient::new("done"));
    let mut session = session_with(client.clone());

    session.send("count my tokens").await.unwrap();

    let usage = client.get_last_usage().await.unwrap();
    assert_eq!(usage.total_tokens, 15);
}

#[tokio::test]
async fn transcript_renders_as_plain_json() {
    duologue::init_logger();

    let mut session = session_with(Arc::new(MockClient::new("rendered reply")));
    session.send("render me").await.unwrap();

    let json = session.transcript().to_json().unwrap();
    assert!(json.contains("render me"));
    assert!(json.contains("rendered reply"));
}

#[tokio::test]
async fn sessions_do_not_share_transcripts() {
    duologue::init_logger();

    let mut first = session_with(Arc::new(MockClient::new("a")));
    let mut second = session_with(Arc::new(MockClient::new("b")));

    first.send("only for the first session").await.unwrap();

    assert_eq!(first.transcript().len(), 2);
    assert!(second.transcript().is_empty());
    assert_ne!(first.id(), second.id());

    second.send("now the second").await.unwrap();
    assert_eq!(first.transcript().len(), 2);
}
