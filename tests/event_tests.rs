/// Tests for the push-based session event layer.
use async_trait::async_trait;
use duologue::client_wrapper::{ClientWrapper, Turn};
use duologue::event::{SessionEvent, SessionObserver};
use duologue::{ConversationSession, DelegationSession, Participant, ParticipantStatus};
use std::sync::Arc;
use tokio::sync::Mutex;

struct MockClient {
    reply_text: String,
}

impl MockClient {
    fn new(reply_text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply_text: reply_text.to_string(),
        })
    }
}

#[async_trait]
impl ClientWrapper for MockClient {
    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn generate(
        &self,
        _role_instruction: &str,
        _context: &[Turn],
    ) -> Result<Turn, Box<dyn std::error::Error>> {
        Ok(Turn::assistant(self.reply_text.clone()))
    }
}

// Records a compact tag per event, in emission order.
struct EventLog {
    tags: Mutex<Vec<String>>,
}

impl EventLog {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            tags: Mutex::new(Vec::new()),
        })
    }

    async fn tags(&self) -> Vec<String> {
        self.tags.lock().await.clone()
    }
}

#[async_trait]
impl SessionObserver for EventLog {
    async fn on_session_event(&self, event: &SessionEvent) {
        let tag = match event {
            SessionEvent::TurnSubmitted { participant, .. } => {
                format!("submitted:{}", participant)
            }
            SessionEvent::ReplyStarted { participant } => format!("started:{}", participant),
            SessionEvent::ReplyFragment { participant, .. } => {
                format!("fragment:{}", participant)
            }
            SessionEvent::ReplyCompleted { participant, .. } => {
                format!("completed:{}", participant)
            }
            SessionEvent::StatusChanged {
                participant,
                status,
            } => format!("status:{}:{:?}", participant, status),
            SessionEvent::HandoffIssued { packet, .. } => {
                format!("issued:{}", packet.task_description)
            }
            SessionEvent::HandoffDelivered { from, to, .. } => {
                format!("delivered:{}->{}", from, to)
            }
        };
        self.tags.lock().await.push(tag);
    }
}

#[tokio::test]
async fn simple_send_pushes_the_full_lifecycle() {
    duologue::init_logger();

    let log = EventLog::new();
    let mut session =
        ConversationSession::new(Participant::new("Assistant", "prompt", MockClient::new("hi")))
            .with_observer(log.clone());

    session.send("hello").await.unwrap();

    assert_eq!(
        log.tags().await,
        vec![
            "submitted:Assistant",
            "status:Assistant:Working",
            "started:Assistant",
            "completed:Assistant",
            "status:Assistant:Available",
        ]
    );
}

#[tokio::test]
async fn delegated_turn_pushes_handoff_events_in_order() {
    duologue::init_logger();

    let log = EventLog::new();
    let mut session = DelegationSession::new(
        Participant::new("Coordinator", "prompt", MockClient::new("unused")),
        Participant::new("Analyst", "prompt", MockClient::new("an answer")),
    )
    .with_observer(log.clone());

    session.submit("a data science question").await.unwrap();

    assert_eq!(
        log.tags().await,
        vec![
            "submitted:Coordinator",
            "status:Coordinator:Working",
            "issued:data science",
            "status:Coordinator:Delegated",
            "submitted:Analyst",
            "status:Analyst:Working",
            "started:Analyst",
            "completed:Analyst",
            "status:Analyst:Available",
            "delivered:Coordinator->Analyst",
            "status:Coordinator:Available",
        ]
    );
}

#[tokio::test]
async fn events_serialize_as_plain_data() {
    let event = SessionEvent::StatusChanged {
        participant: "Coordinator".to_string(),
        status: ParticipantStatus::Working,
    };
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("Coordinator"));
    assert!(json.contains("Working"));
}

#[tokio::test]
async fn status_events_carry_the_new_status() {
    duologue::init_logger();

    let log = EventLog::new();
    let mut session =
        ConversationSession::new(Participant::new("Assistant", "prompt", MockClient::new("ok")))
            .with_observer(log);

    session.send("one").await.unwrap();
    assert_eq!(session.status(), ParticipantStatus::Available);
}
