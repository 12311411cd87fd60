//! Coordinator/Analyst delegation over two exclusively-owned transcripts.
//!
//! A [`DelegationSession`] owns two [`Participant`]s. Every user turn lands in
//! the Coordinator's transcript; a [`DelegationRouter`] then decides, from the
//! text alone, whether the turn is handed to the Analyst. On a hand-off the
//! Analyst answers the question in its own transcript and the reply is
//! mirrored back into the Coordinator's transcript as a labeled report — the
//! only cross-transcript write in the system.
//!
//! At most one [`HandoffPacket`] is pending at any time. Issuing a second
//! delegation before the first is delivered overwrites it; the earlier packet
//! is discarded, never processed. This mirrors the single-slot behavior of
//! the system this crate models and is a known limitation, not a bug.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use duologue::clients::openai::{Model, OpenAIClient};
//! use duologue::{DelegationSession, Participant};
//!
//! # async fn example(key: &str) {
//! let coordinator = Participant::new(
//!     "Coordinator",
//!     "You answer general questions and route data science work.",
//!     Arc::new(OpenAIClient::new_with_model_enum(key, Model::GPT41Mini)),
//! );
//! let analyst = Participant::new(
//!     "Analyst",
//!     "You are a data science specialist.",
//!     Arc::new(OpenAIClient::new_with_model_enum(key, Model::GPT41Nano)),
//! );
//! let mut session = DelegationSession::new(coordinator, analyst);
//!
//! // Routed to the Analyst; the Coordinator's transcript ends with a
//! // labeled report of the Analyst's answer.
//! session.submit("What is a Pandas DataFrame?").await;
//!
//! // Not routed; the Coordinator answers it itself.
//! session.submit("What's the weather?").await;
//! # }
//! ```

use crate::client_wrapper::Turn;
use crate::event::{notify, SessionEvent, SessionObserver};
use crate::session::{
    generate_into, generate_streaming_into, set_status, submit_turn, Participant,
    ParticipantStatus, Transcript,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// A single in-flight unit of work passed from the Coordinator to the
/// Analyst. Cleared immediately when consumed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffPacket {
    /// The matched topic, e.g. `"data science"`.
    pub task_description: String,
    /// The user text to forward verbatim as the delegated question.
    pub payload_text: String,
}

/// Decides whether a user turn is delegated, from its text alone.
///
/// This is a deliberately crude classifier: a case-insensitive substring
/// match against a fixed keyword set. It is pure and deterministic — the
/// same text always yields the same decision. The type exists as a seam for
/// a real intent router; do not try to make the predicate clever.
#[derive(Clone, Debug)]
pub struct DelegationRouter {
    keywords: Vec<String>,
}

impl Default for DelegationRouter {
    /// The topics the Analyst handles out of the box.
    fn default() -> Self {
        DelegationRouter::new(&["data science", "pandas", "dataframe"])
    }
}

impl DelegationRouter {
    /// Build a router over the given topic keywords. Matching is
    /// case-insensitive substring containment, so `"data science tips"`
    /// matches `"data science"` but `"datascience"` does not.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        DelegationRouter {
            keywords: keywords
                .iter()
                .map(|keyword| keyword.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Returns a packet for the first matching keyword, or `None`.
    pub fn route(&self, last_user_text: &str) -> Option<HandoffPacket> {
        let haystack = last_user_text.to_lowercase();
        self.keywords
            .iter()
            .find(|keyword| haystack.contains(keyword.as_str()))
            .map(|keyword| HandoffPacket {
                task_description: keyword.clone(),
                payload_text: last_user_text.to_string(),
            })
    }
}

/// A two-participant session mediating turn submission, reply generation, and
/// task hand-off between a Coordinator and an Analyst.
///
/// Each participant exclusively owns its transcript; the session is the
/// single mutator of both. One submitted turn is processed fully — including
/// at most one hand-off — before the next external input.
pub struct DelegationSession {
    id: Uuid,
    coordinator: Participant,
    analyst: Participant,
    router: DelegationRouter,
    /// At most one unconsumed packet exists at any time.
    pending: Option<HandoffPacket>,
    observer: Option<Arc<dyn SessionObserver>>,
}

impl DelegationSession {
    pub fn new(coordinator: Participant, analyst: Participant) -> Self {
        DelegationSession {
            id: Uuid::new_v4(),
            coordinator,
            analyst,
            router: DelegationRouter::default(),
            pending: None,
            observer: None,
        }
    }

    /// Replaces the default keyword router.
    pub fn with_router(mut self, router: DelegationRouter) -> Self {
        self.router = router;
        self
    }

    /// Registers an observer that receives every session event.
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn coordinator(&self) -> &Participant {
        &self.coordinator
    }

    pub fn analyst(&self) -> &Participant {
        &self.analyst
    }

    pub fn coordinator_transcript(&self) -> &Transcript {
        self.coordinator.transcript()
    }

    pub fn analyst_transcript(&self) -> &Transcript {
        self.analyst.transcript()
    }

    /// The packet waiting to be delivered, if any.
    pub fn pending_handoff(&self) -> Option<&HandoffPacket> {
        self.pending.as_ref()
    }

    /// Pure routing decision for the given user text. Does not mutate the
    /// session; [`submit`](Self::submit) calls this and acts on the result.
    pub fn maybe_delegate(&self, last_user_text: &str) -> Option<HandoffPacket> {
        self.router.route(last_user_text)
    }

    /// Processes one submitted user turn end to end.
    ///
    /// The turn is appended to the Coordinator's transcript. If the router
    /// matches, the packet is issued and delivered to the Analyst and the
    /// returned turn is the mirrored report; otherwise the Coordinator
    /// generates its own reply. Either way the Coordinator's transcript grows
    /// by exactly two turns. Returns `None` when the input was empty and
    /// nothing happened.
    pub async fn submit(&mut self, text: &str) -> Option<Turn> {
        if text.is_empty() {
            log::warn!("duologue::delegation: ignoring empty user turn");
            return None;
        }

        submit_turn(&mut self.coordinator, &self.observer, Turn::user(text)).await;

        match self.maybe_delegate(text) {
            Some(packet) => {
                set_status(
                    &mut self.coordinator,
                    &self.observer,
                    ParticipantStatus::Working,
                )
                .await;
                self.issue_handoff(packet).await;
                self.deliver_handoff().await
            }
            None => Some(generate_into(&mut self.coordinator, &self.observer).await),
        }
    }

    /// Streaming variant of [`submit`](Self::submit). Only the Coordinator's
    /// own replies stream; a delegated reply is produced by the Analyst
    /// atomically and mirrored once complete.
    pub async fn submit_streaming(&mut self, text: &str) -> Option<Turn> {
        if text.is_empty() {
            log::warn!("duologue::delegation: ignoring empty user turn");
            return None;
        }

        submit_turn(&mut self.coordinator, &self.observer, Turn::user(text)).await;

        match self.maybe_delegate(text) {
            Some(packet) => {
                set_status(
                    &mut self.coordinator,
                    &self.observer,
                    ParticipantStatus::Working,
                )
                .await;
                self.issue_handoff(packet).await;
                self.deliver_handoff().await
            }
            None => Some(generate_streaming_into(&mut self.coordinator, &self.observer).await),
        }
    }

    /// Stores a packet as pending, overwriting (not queueing) any packet
    /// already in the slot, and moves the Coordinator to `Delegated`.
    pub async fn issue_handoff(&mut self, packet: HandoffPacket) {
        let replaced = self.pending.replace(packet.clone());
        if let Some(ref discarded) = replaced {
            log::warn!(
                "duologue::delegation: overwriting pending hand-off '{}'",
                discarded.task_description
            );
        }
        notify(&self.observer, SessionEvent::HandoffIssued { packet, replaced }).await;
        set_status(
            &mut self.coordinator,
            &self.observer,
            ParticipantStatus::Delegated,
        )
        .await;
    }

    /// Consumes the pending packet: synthesizes the delegated question into
    /// the Analyst's transcript, generates the Analyst's reply there, and
    /// mirrors the reply back into the Coordinator's transcript as a report
    /// labeled with the Analyst's name.
    ///
    /// Atomic from the caller's point of view: both transcripts grow
    /// together, and when the Analyst's backing call fails the mirrored
    /// report carries the error text instead. The Coordinator exits
    /// `Delegated` back to `Available` exactly here. Returns `None` when no
    /// packet was pending.
    pub async fn deliver_handoff(&mut self) -> Option<Turn> {
        let packet = self.pending.take()?;

        let question = Turn::user(packet.payload_text).with_label(self.coordinator.name().to_string());
        submit_turn(&mut self.analyst, &self.observer, question).await;

        let reply = generate_into(&mut self.analyst, &self.observer).await;

        let report = Turn::assistant(format!("{} reports: {}", self.analyst.name(), reply.text))
            .with_label(self.analyst.name().to_string());
        self.coordinator.transcript.push(report.clone());

        notify(
            &self.observer,
            SessionEvent::HandoffDelivered {
                from: self.coordinator.name().to_string(),
                to: self.analyst.name().to_string(),
                report: report.clone(),
            },
        )
        .await;
        set_status(
            &mut self.coordinator,
            &self.observer,
            ParticipantStatus::Available,
        )
        .await;

        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_matches_case_insensitively() {
        let router = DelegationRouter::default();

        for text in [
            "data science",
            "Data Science",
            "DATA SCIENCE",
            "data science tips",
            "I need some Data Science help",
        ] {
            let packet = router.route(text).expect(text);
            assert_eq!(packet.payload_text, text);
            assert_eq!(packet.task_description, "data science");
        }
    }

    #[test]
    fn router_uses_substring_semantics() {
        let router = DelegationRouter::new(&["data science"]);

        // No space, no match.
        assert!(router.route("datascience").is_none());
        assert!(router.route("What's the weather?").is_none());
        assert!(router.route("").is_none());
    }

    #[test]
    fn router_is_deterministic() {
        let router = DelegationRouter::default();
        let first = router.route("pandas question");
        let second = router.route("pandas question");
        assert_eq!(first, second);
    }

    #[test]
    fn router_reports_the_matched_topic() {
        let router = DelegationRouter::default();
        let packet = router.route("What is a Pandas DataFrame?").unwrap();
        // "pandas" is listed before "dataframe", so it wins.
        assert_eq!(packet.task_description, "pandas");
        assert_eq!(packet.payload_text, "What is a Pandas DataFrame?");
    }
}
