//! The `session` module manages a turn-based conversational session with an
//! LLM: one participant, one append-only transcript, one reply per submitted
//! turn.
//!
//! **Key guarantees:**
//! - **Append-only transcript**: turns are never reordered or mutated in
//!   place; order is chronological and replayed verbatim as model context.
//! - **Exactly one reply per input**: a failed backing call is absorbed into
//!   an error-text reply turn, never an exception. After N submissions the
//!   transcript holds 2N turns.
//! - **Push observability**: every transition is emitted as a
//!   [`SessionEvent`](crate::event::SessionEvent), so nothing polls.
//!
//! ## Quickstart
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use duologue::clients::openai::{Model, OpenAIClient};
//! use duologue::{ConversationSession, Participant};
//!
//! # async fn example() {
//! let client = Arc::new(OpenAIClient::new_with_model_enum("YOUR_KEY", Model::GPT41Nano));
//! let mut session =
//!     ConversationSession::new(Participant::new("Assistant", "You are concise.", client));
//!
//! let reply = session.send("Hola, ¿cómo estás?").await.unwrap();
//! println!("Assistant: {}", reply.text);
//! # }
//! ```

use crate::client_wrapper::{ClientWrapper, Turn};
use crate::event::{notify, SessionEvent, SessionObserver};
use futures_util::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Per-participant status, visible to the presentation layer.
///
/// The machine is `Available → Working → {Available | Delegated | Error}`.
/// `Delegated` is exited back to `Available` only when the delegated reply is
/// mirrored back. `Error` is non-terminal: the next submitted turn re-enters
/// `Working`. No status is terminal; the session runs until the process ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ParticipantStatus {
    Available,
    Working,
    Delegated,
    Error,
}

/// The ordered history of turns for one participant.
///
/// Append-only by construction: there is no public way to remove, reorder, or
/// mutate a turn once it is in. Each transcript is exclusively owned by one
/// session, so there is exactly one mutator and no locking.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Transcript { turns: Vec::new() }
    }

    pub(crate) fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    /// The full ordered history, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// JSON rendering of the history, for presentation layers that want the
    /// transcript as plain data.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.turns)
    }
}

/// A named role with its own priming instruction, model binding, transcript,
/// and status.
pub struct Participant {
    pub(crate) name: String,
    pub(crate) role_instruction: String,
    pub(crate) client: Arc<dyn ClientWrapper>,
    pub(crate) transcript: Transcript,
    pub(crate) status: ParticipantStatus,
}

impl Participant {
    pub fn new(
        name: impl Into<String>,
        role_instruction: impl Into<String>,
        client: Arc<dyn ClientWrapper>,
    ) -> Self {
        Participant {
            name: name.into(),
            role_instruction: role_instruction.into(),
            client,
            transcript: Transcript::new(),
            status: ParticipantStatus::Available,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role_instruction(&self) -> &str {
        &self.role_instruction
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    pub fn status(&self) -> ParticipantStatus {
        self.status
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}

/// Set a participant's status and push the change to the observer.
pub(crate) async fn set_status(
    participant: &mut Participant,
    observer: &Option<Arc<dyn SessionObserver>>,
    status: ParticipantStatus,
) {
    participant.status = status;
    notify(
        observer,
        SessionEvent::StatusChanged {
            participant: participant.name.clone(),
            status,
        },
    )
    .await;
}

/// Append a turn to the participant's transcript and announce it.
pub(crate) async fn submit_turn(
    participant: &mut Participant,
    observer: &Option<Arc<dyn SessionObserver>>,
    turn: Turn,
) {
    notify(
        observer,
        SessionEvent::TurnSubmitted {
            participant: participant.name.clone(),
            turn: turn.clone(),
        },
    )
    .await;
    participant.transcript.push(turn);
}

/// Run one non-streaming reply for the participant, appending the result to
/// its transcript. Infallible from the caller's point of view: a backing-call
/// failure becomes an error-text assistant turn and status `Error`.
pub(crate) async fn generate_into(
    participant: &mut Participant,
    observer: &Option<Arc<dyn SessionObserver>>,
) -> Turn {
    set_status(participant, observer, ParticipantStatus::Working).await;
    notify(
        observer,
        SessionEvent::ReplyStarted {
            participant: participant.name.clone(),
        },
    )
    .await;

    let outcome = participant
        .client
        .generate(&participant.role_instruction, participant.transcript.turns())
        .await
        .map_err(|err| err.to_string());

    finalize_reply(participant, observer, outcome).await
}

/// Run one streaming reply for the participant: pull the fragment sequence in
/// arrival order, announcing each fragment, then finalize the concatenation.
/// The stream is consumed exactly once; a failure to open it, or an error
/// fragment mid-flight, finalizes with an error-text turn instead.
pub(crate) async fn generate_streaming_into(
    participant: &mut Participant,
    observer: &Option<Arc<dyn SessionObserver>>,
) -> Turn {
    set_status(participant, observer, ParticipantStatus::Working).await;
    notify(
        observer,
        SessionEvent::ReplyStarted {
            participant: participant.name.clone(),
        },
    )
    .await;

    let stream_result = participant
        .client
        .generate_stream(&participant.role_instruction, participant.transcript.turns())
        .await
        .map_err(|err| err.to_string());

    let outcome = match stream_result {
        Ok(mut fragments) => {
            let mut accumulated = String::new();
            let mut stream_failure: Option<String> = None;

            while let Some(item) = fragments.next().await {
                match item {
                    Ok(fragment) => {
                        if !fragment.text.is_empty() {
                            accumulated.push_str(&fragment.text);
                            notify(
                                observer,
                                SessionEvent::ReplyFragment {
                                    participant: participant.name.clone(),
                                    text: fragment.text,
                                    accumulated_chars: accumulated.len(),
                                },
                            )
                            .await;
                        }
                        if fragment.is_final {
                            break;
                        }
                    }
                    Err(err) => {
                        stream_failure = Some(err.to_string());
                        break;
                    }
                }
            }

            match stream_failure {
                None => Ok(Turn::assistant(accumulated)),
                Some(err) => Err(err),
            }
        }
        Err(err) => Err(err),
    };

    finalize_reply(participant, observer, outcome).await
}

/// Append the reply (or its error-text substitute) and settle the status.
async fn finalize_reply(
    participant: &mut Participant,
    observer: &Option<Arc<dyn SessionObserver>>,
    outcome: Result<Turn, String>,
) -> Turn {
    let (reply, status) = match outcome {
        Ok(reply) => (reply, ParticipantStatus::Available),
        Err(err) => {
            log::error!(
                "duologue::session: backing call failed for '{}': {}",
                participant.name,
                err
            );
            (
                Turn::assistant(format!("An error occurred: {}", err)),
                ParticipantStatus::Error,
            )
        }
    };

    let usage = participant.client.get_last_usage().await;
    participant.transcript.push(reply.clone());
    notify(
        observer,
        SessionEvent::ReplyCompleted {
            participant: participant.name.clone(),
            turn: reply.clone(),
            usage,
        },
    )
    .await;
    set_status(participant, observer, status).await;

    reply
}

/// A conversation session with a single participant.
///
/// The session is an explicit object with an explicit creation point: all
/// conversation state lives here, passed by `&mut` into every operation.
/// One submitted turn is processed fully (including streaming consumption)
/// before the next external input is accepted.
pub struct ConversationSession {
    id: Uuid,
    participant: Participant,
    observer: Option<Arc<dyn SessionObserver>>,
}

impl ConversationSession {
    /// Creates a new session owning the given participant's transcript.
    pub fn new(participant: Participant) -> Self {
        ConversationSession {
            id: Uuid::new_v4(),
            participant,
            observer: None,
        }
    }

    /// Registers an observer that receives every session event.
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn participant(&self) -> &Participant {
        &self.participant
    }

    pub fn transcript(&self) -> &Transcript {
        self.participant.transcript()
    }

    pub fn status(&self) -> ParticipantStatus {
        self.participant.status()
    }

    /// Appends a user turn to the transcript.
    ///
    /// Empty input is the caller's validation problem; it is logged and
    /// ignored rather than treated as an error. Returns whether the turn was
    /// actually submitted.
    pub async fn submit_user_turn(&mut self, text: &str) -> bool {
        if text.is_empty() {
            log::warn!(
                "duologue::session: ignoring empty user turn for '{}'",
                self.participant.name
            );
            return false;
        }
        submit_turn(&mut self.participant, &self.observer, Turn::user(text)).await;
        true
    }

    /// Sends the role instruction plus the full ordered transcript to the
    /// backing model and appends the reply turn.
    ///
    /// Never fails: a backing-call error yields a reply turn carrying a
    /// human-readable error message, and the session stays usable.
    pub async fn generate_reply(&mut self) -> Turn {
        generate_into(&mut self.participant, &self.observer).await
    }

    /// Like [`generate_reply`](Self::generate_reply), but consumes the reply
    /// as a fragment stream, emitting a
    /// [`ReplyFragment`](crate::event::SessionEvent::ReplyFragment) event per
    /// fragment before finalizing.
    pub async fn generate_reply_streaming(&mut self) -> Turn {
        generate_streaming_into(&mut self.participant, &self.observer).await
    }

    /// Convenience: submit a user turn and generate the reply for it.
    /// Returns `None` when the input was empty and nothing happened.
    pub async fn send(&mut self, text: &str) -> Option<Turn> {
        if !self.submit_user_turn(text).await {
            return None;
        }
        Some(self.generate_reply().await)
    }

    /// Streaming variant of [`send`](Self::send).
    pub async fn send_streaming(&mut self, text: &str) -> Option<Turn> {
        if !self.submit_user_turn(text).await {
            return None;
        }
        Some(self.generate_reply_streaming().await)
    }
}
