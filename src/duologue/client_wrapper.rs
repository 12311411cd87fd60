use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::Mutex;

/// A ClientWrapper is a wrapper around a specific cloud LLM service.
/// It provides a common interface to generate replies from an ordered
/// conversational context. It does not keep track of the conversation itself;
/// for that we use a ConversationSession, which owns the transcript and other
/// session-specific state and uses a ClientWrapper to talk to the LLM.
// src/duologue/client_wrapper.rs

/// Represents the possible roles for a turn.
///
/// `System` never appears in a transcript; it only exists so providers can
/// carry the participant's role instruction on the wire. Transcript turns are
/// always `User` or `Assistant`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    System,
    // a message sent by a human user (or the coordinator, when delegated)
    User,
    // content generated by the backing model as a response to a user turn
    Assistant,
}

/// How many tokens were spent on prompt vs. completion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub total_tokens: usize,
}

/// One message exchanged within a conversation, tagged with its speaker role.
///
/// Turns are immutable once appended to a [`Transcript`](crate::Transcript):
/// the transcript is append-only and replayed verbatim to the model, so
/// chronological order is semantically meaningful.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Turn {
    /// The role associated with the turn.
    pub role: Role,
    /// The actual content of the turn.
    pub text: String,
    /// Set when the turn originated with another participant, e.g. a
    /// delegated question carries the coordinator's name and a mirrored
    /// report carries the analyst's name.
    pub participant_label: Option<String>,
    /// When the turn was created. Transcript order is chronological.
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Turn {
            role,
            text: text.into(),
            participant_label: None,
            created_at: Utc::now(),
        }
    }

    /// A turn spoken by the human user (or synthesized on their behalf).
    pub fn user(text: impl Into<String>) -> Self {
        Turn::new(Role::User, text)
    }

    /// A turn generated by the backing model.
    pub fn assistant(text: impl Into<String>) -> Self {
        Turn::new(Role::Assistant, text)
    }

    /// Tags the turn as originating with the named participant.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.participant_label = Some(label.into());
        self
    }
}

/// One element of a streaming reply.
#[derive(Clone, Debug)]
pub struct ReplyFragment {
    /// The incremental text in this fragment.
    pub text: String,
    /// Whether this is the final fragment in the stream.
    pub is_final: bool,
}

/// Type alias for a Send-able error box, used for per-fragment stream errors.
pub type SendError = Box<dyn Error + Send>;

/// A finite, ordered sequence of reply fragments, consumed exactly once.
/// Note: the stream may not be Send-safe and must be consumed in the same task.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<ReplyFragment, SendError>>>>;

/// Boxed future returned by [`ClientWrapper::generate_stream`].
///
/// Streaming is expressed as a plain boxed future rather than an
/// `async_trait` method because provider SDK streams are not necessarily
/// `Send`, and `async_trait` would demand a `Send` future.
pub type FragmentStreamFuture<'a> =
    Pin<Box<dyn Future<Output = Result<FragmentStream, Box<dyn Error>>> + 'a>>;

/// Trait defining the interface to generate replies from an LLM service.
///
/// The contract is deliberately small: given a role instruction and an
/// ordered context of prior turns, produce one assistant turn (atomically or
/// as a fragment stream). The collaborator can fail and can be slow; both are
/// the session's problem to absorb, not the caller's.
#[async_trait]
pub trait ClientWrapper: Send + Sync {
    /// The model identifier this client sends requests to.
    fn model_name(&self) -> &str;

    /// Generate a complete assistant turn from the ordered context.
    /// - `role_instruction`: the participant's priming instruction.
    /// - `context`: the full transcript, oldest turn first.
    async fn generate(
        &self,
        role_instruction: &str,
        context: &[Turn],
    ) -> Result<Turn, Box<dyn Error>>;

    /// Generate a reply as a lazy sequence of text fragments.
    ///
    /// This method has a default implementation that returns an error, so
    /// clients that only support atomic replies don't break. Clients that
    /// support streaming should override it.
    fn generate_stream<'a>(
        &'a self,
        _role_instruction: &'a str,
        _context: &'a [Turn],
    ) -> FragmentStreamFuture<'a> {
        Box::pin(async { Err("Streaming not supported by this client".into()) })
    }

    /// Hook to retrieve usage from the *last* `generate()` call.
    /// Default impl reads `usage_slot()`, so clients only need to fill the slot.
    async fn get_last_usage(&self) -> Option<TokenUsage> {
        match self.usage_slot() {
            Some(slot) => slot.lock().await.clone(),
            None => None,
        }
    }

    /// ClientWrapper implementations supporting TokenUsage tracking should
    /// return their slot by overriding this method.
    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        None
    }
}
