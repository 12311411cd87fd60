//! # Duologue
//!
//! Duologue is a small Rust library for running turn-based conversational
//! sessions against hosted Large Language Models, with optional task hand-off
//! between two named participants.
//!
//! The crate provides:
//!
//! * **Stateful Conversations**: [`ConversationSession`] maintains an
//!   append-only [`Transcript`] of [`Turn`]s for a single [`Participant`] and
//!   replays it verbatim as context on every reply.
//! * **Streaming Replies**: replies can arrive as a finite, ordered sequence
//!   of [`ReplyFragment`]s, surfaced one at a time so a presentation layer can
//!   render a "still typing" affordance before the turn is finalized.
//! * **Coordinator/Analyst Hand-off**: [`DelegationSession`] routes a user
//!   turn to a second participant when a [`DelegationRouter`] keyword matches,
//!   mirrors the reply back into the coordinator's transcript, and tracks a
//!   single in-flight [`HandoffPacket`].
//! * **Push Observability**: [`SessionObserver`] receives [`SessionEvent`]s
//!   (submitted turns, fragments, status changes, hand-offs) as they happen —
//!   no polling, no redraw loops.
//! * **Provider Flexibility**: the [`ClientWrapper`] trait is implemented for
//!   OpenAI and Google Gemini (through its OpenAI-compatible endpoint), and is
//!   easy to mock in tests.
//!
//! ## Core Concepts
//!
//! ### ConversationSession: one participant, one transcript
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use duologue::clients::openai::{Model, OpenAIClient};
//! use duologue::{ConversationSession, Participant};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(OpenAIClient::new_with_model_enum(
//!         &std::env::var("OPEN_AI_SECRET")?,
//!         Model::GPT41Mini,
//!     ));
//!
//!     let participant = Participant::new("Assistant", "You are helpful.", client);
//!     let mut session = ConversationSession::new(participant);
//!
//!     if let Some(reply) = session.send("Hello, how are you?").await {
//!         println!("Assistant: {}", reply.text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! A failed backing call never aborts the conversation: the session substitutes
//! a reply turn carrying a human-readable error message and stays usable.
//!
//! ### DelegationSession: two participants, one pending hand-off
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use duologue::clients::openai::{Model, OpenAIClient};
//! use duologue::{DelegationSession, Participant};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let key = std::env::var("OPEN_AI_SECRET")?;
//!     let coordinator = Participant::new(
//!         "Coordinator",
//!         "You are a general-purpose assistant.",
//!         Arc::new(OpenAIClient::new_with_model_enum(&key, Model::GPT41Mini)),
//!     );
//!     let analyst = Participant::new(
//!         "Analyst",
//!         "You are a data science specialist.",
//!         Arc::new(OpenAIClient::new_with_model_enum(&key, Model::GPT41Nano)),
//!     );
//!
//!     let mut session = DelegationSession::new(coordinator, analyst);
//!
//!     // Matches the router's "data science" keyword set, so the Analyst
//!     // answers and the reply is mirrored back into the Coordinator's
//!     // transcript as a labeled report.
//!     session.submit("What is a Pandas DataFrame?").await;
//!     Ok(())
//! }
//! ```

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// The helper is intentionally lightweight so that applications embedding
/// Duologue can opt in to simple `RUST_LOG` driven diagnostics without having
/// to choose a specific logging backend upfront.
///
/// ```rust
/// duologue::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::init();
    });
}

// Import the top-level `duologue` module.
pub mod duologue;

// Re-exporting key items for easier external access.
pub use duologue::client_wrapper;
pub use duologue::client_wrapper::{
    ClientWrapper, FragmentStream, FragmentStreamFuture, ReplyFragment, Role, SendError,
    TokenUsage, Turn,
};
pub use duologue::clients;
pub use duologue::config;
pub use duologue::config::{ParticipantConfig, Provider};
pub use duologue::delegation;
pub use duologue::delegation::{DelegationRouter, DelegationSession, HandoffPacket};
pub use duologue::event;
pub use duologue::event::{SessionEvent, SessionObserver};
pub use duologue::session;
pub use duologue::session::{ConversationSession, Participant, ParticipantStatus, Transcript};
