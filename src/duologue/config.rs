//! Configuration for Duologue participants.
//!
//! Provides the [`ParticipantConfig`] struct: name, role instruction,
//! provider, model identifier, and API credential for one participant. Users
//! construct it manually — no file parsing dependencies are required.
//!
//! A missing or empty credential is a startup precondition failure: it is
//! surfaced once, when the client is built, and a session never starts. It is
//! never a runtime error of a running session.
//!
//! # Example
//!
//! ```rust,no_run
//! use duologue::config::{ParticipantConfig, Provider};
//! use duologue::Participant;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ParticipantConfig::from_env(
//!     "Coordinator",
//!     "You are a general-purpose assistant.",
//!     Provider::OpenAI,
//!     "gpt-4.1-mini",
//! )?;
//!
//! let participant = Participant::new(
//!     config.name.clone(),
//!     config.role_instruction.clone(),
//!     config.build_client()?,
//! );
//! # Ok(())
//! # }
//! ```

use crate::client_wrapper::ClientWrapper;
use crate::clients::gemini::GeminiClient;
use crate::clients::openai::OpenAIClient;
use std::error::Error;
use std::sync::Arc;

/// Environment variable holding the OpenAI API credential.
pub const OPENAI_SECRET_ENV: &str = "OPEN_AI_SECRET";
/// Environment variable holding the Gemini API credential.
pub const GEMINI_SECRET_ENV: &str = "GEMINI_SECRET";

/// The hosted LLM vendor backing a participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Gemini,
}

/// Static configuration for one participant; not mutated at runtime.
#[derive(Clone, Debug)]
pub struct ParticipantConfig {
    /// Display name, e.g. `"Coordinator"` or `"Analyst"`.
    pub name: String,
    /// The priming instruction sent ahead of the transcript on every call.
    pub role_instruction: String,
    /// Which vendor the participant talks to.
    pub provider: Provider,
    /// Backing model identifier, e.g. `"gpt-4.1-mini"`.
    pub model: String,
    /// API credential. Must be non-empty before a session can start.
    pub secret_key: String,
}

impl ParticipantConfig {
    pub fn new(
        name: impl Into<String>,
        role_instruction: impl Into<String>,
        provider: Provider,
        model: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        ParticipantConfig {
            name: name.into(),
            role_instruction: role_instruction.into(),
            provider,
            model: model.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Builds a config reading the credential from the provider's environment
    /// variable (`OPEN_AI_SECRET` or `GEMINI_SECRET`). Fails when the
    /// variable is unset or empty.
    pub fn from_env(
        name: impl Into<String>,
        role_instruction: impl Into<String>,
        provider: Provider,
        model: impl Into<String>,
    ) -> Result<Self, Box<dyn Error>> {
        let env_var = match provider {
            Provider::OpenAI => OPENAI_SECRET_ENV,
            Provider::Gemini => GEMINI_SECRET_ENV,
        };
        let secret_key = std::env::var(env_var)
            .map_err(|_| format!("missing API credential: set {}", env_var))?;

        let config = Self::new(name, role_instruction, provider, model, secret_key);
        config.validate()?;
        Ok(config)
    }

    /// Checks the startup preconditions without building a client.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.secret_key.is_empty() {
            return Err(format!("empty API credential for participant '{}'", self.name).into());
        }
        if self.model.is_empty() {
            return Err(format!("empty model identifier for participant '{}'", self.name).into());
        }
        Ok(())
    }

    /// Validates the config and constructs the provider client.
    pub fn build_client(&self) -> Result<Arc<dyn ClientWrapper>, Box<dyn Error>> {
        self.validate()?;
        let client: Arc<dyn ClientWrapper> = match self.provider {
            Provider::OpenAI => Arc::new(OpenAIClient::new_with_model_string(
                &self.secret_key,
                &self.model,
            )),
            Provider::Gemini => Arc::new(GeminiClient::new_with_model_string(
                &self.secret_key,
                &self.model,
            )),
        };
        Ok(client)
    }
}
