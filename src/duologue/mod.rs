// src/duologue/mod.rs

pub mod client_wrapper;
pub mod clients;
pub mod config;
pub mod delegation;
pub mod event;
pub mod session;

// Let's explicitly export the session types so we don't have to access them via
// duologue::session::ConversationSession and instead as duologue::ConversationSession
pub use delegation::DelegationSession;
pub use session::ConversationSession;
