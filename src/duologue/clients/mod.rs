//! Provider specific [`ClientWrapper`](crate::client_wrapper::ClientWrapper) implementations.
//!
//! Each submodule offers a concrete client that speaks a particular vendor's API while
//! conforming to the uniform Duologue contract.

pub mod common;
pub mod http_pool;

pub mod gemini;
pub mod openai;
