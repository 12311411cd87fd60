//! Session event system.
//!
//! Provides a callback-based observability layer for conversation and
//! delegation sessions. Implement [`SessionObserver`] to receive real-time
//! notifications about:
//!
//! - **Submitted turns**: each user turn as it lands in a transcript
//! - **Reply lifecycle**: start, streamed fragments, and the finalized turn
//! - **Status changes**: per-participant `Available`/`Working`/`Delegated`/`Error`
//! - **Hand-offs**: packets issued (including overwrites) and delivered
//!
//! Events are pushed as they happen. A presentation layer renders them
//! however it likes; the session never sleeps, polls, or redraws.
//!
//! # Example
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use duologue::event::{SessionEvent, SessionObserver};
//!
//! struct Printer;
//!
//! #[async_trait]
//! impl SessionObserver for Printer {
//!     async fn on_session_event(&self, event: &SessionEvent) {
//!         match event {
//!             SessionEvent::ReplyFragment { participant, text, .. } => {
//!                 print!("{}", text);
//!                 let _ = participant;
//!             }
//!             SessionEvent::StatusChanged { participant, status } => {
//!                 eprintln!("[{} is now {:?}]", participant, status);
//!             }
//!             _ => {}
//!         }
//!     }
//! }
//! ```

use crate::client_wrapper::{TokenUsage, Turn};
use crate::delegation::HandoffPacket;
use crate::session::ParticipantStatus;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Events emitted by [`ConversationSession`](crate::ConversationSession) and
/// [`DelegationSession`](crate::DelegationSession).
///
/// Every variant carries the name of the participant it concerns, so a
/// handler can drive a two-pane rendering without external state. Variants
/// are plain data; rendering is entirely the subscriber's concern.
#[derive(Clone, Debug, Serialize)]
pub enum SessionEvent {
    /// A user turn (or a delegated question synthesized on the user's behalf)
    /// was appended to the participant's transcript.
    TurnSubmitted { participant: String, turn: Turn },

    /// The participant's backing model call is about to start.
    ReplyStarted { participant: String },

    /// One streamed fragment arrived. `accumulated_chars` is the length of
    /// the reply text so far, for "still typing" affordances.
    ReplyFragment {
        participant: String,
        text: String,
        accumulated_chars: usize,
    },

    /// The reply turn was finalized and appended to the transcript. On a
    /// backing-call failure this still fires, with the error-text turn.
    ReplyCompleted {
        participant: String,
        turn: Turn,
        usage: Option<TokenUsage>,
    },

    /// The participant moved to a new status.
    StatusChanged {
        participant: String,
        status: ParticipantStatus,
    },

    /// A hand-off packet was stored as pending. If a packet was already
    /// pending it is returned in `replaced` and will never be processed.
    HandoffIssued {
        packet: HandoffPacket,
        replaced: Option<HandoffPacket>,
    },

    /// The pending packet was consumed: the target replied and the report
    /// was mirrored back into the source transcript.
    HandoffDelivered {
        from: String,
        to: String,
        report: Turn,
    },
}

/// Observer receiving [`SessionEvent`]s.
///
/// The single method has a default no-op implementation, so subscribers only
/// match on the variants they care about. The observer is shared as
/// `Arc<dyn SessionObserver>` and invoked inline on the session's control
/// thread; handlers should return quickly.
#[async_trait]
pub trait SessionObserver: Send + Sync {
    async fn on_session_event(&self, _event: &SessionEvent) {}
}

/// Emit an event to the observer, if one is registered.
pub(crate) async fn notify(observer: &Option<Arc<dyn SessionObserver>>, event: SessionEvent) {
    if let Some(observer) = observer {
        observer.on_session_event(&event).await;
    }
}
