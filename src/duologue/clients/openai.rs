//! The `OpenAIClient` struct implements `ClientWrapper` for OpenAI's Chat API,
//! capturing both the assistant reply and detailed token usage (input vs output)
//! for cost tracking.
//!
//! # Key Features
//!
//! - **generate(...)**: returns a complete assistant [`Turn`].
//! - **generate_stream(...)**: returns the reply as a finite fragment sequence.
//! - **Automatic Usage Capture**: stores the latest `TokenUsage` internally;
//!   call `get_last_usage()` after `generate()` to retrieve actual usage stats.
//!
//! # Example
//!
//! ```rust,no_run
//! use duologue::clients::openai::{Model, OpenAIClient};
//! use duologue::client_wrapper::{ClientWrapper, Turn};
//!
//! #[tokio::main]
//! async fn main() {
//!     let secret_key: String = std::env::var("OPEN_AI_SECRET").expect("OPEN_AI_SECRET not set");
//!     let client = OpenAIClient::new_with_model_enum(&secret_key, Model::GPT41Nano);
//!
//!     let context = vec![Turn::user("Hello!")];
//!     let reply = client.generate("You are an assistant.", &context).await.unwrap();
//!     println!("Assistant: {}", reply.text);
//!
//!     if let Some(usage) = client.get_last_usage().await {
//!         println!(
//!             "Tokens — input: {}, output: {}, total: {}",
//!             usage.input_tokens, usage.output_tokens, usage.total_tokens
//!         );
//!     }
//! }
//! ```
use std::error::Error;

use async_trait::async_trait;
use futures_util::stream::StreamExt;
use openai_rust::chat;
use openai_rust2 as openai_rust;

use crate::client_wrapper::{
    ClientWrapper, FragmentStreamFuture, ReplyFragment, SendError, TokenUsage, Turn,
};
use crate::clients::common::{fragments_to_stream, format_context, send_and_track, StreamError};
use crate::clients::http_pool::get_http_client;
use tokio::sync::Mutex;

const OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Official model identifiers supported by OpenAI's Chat Completions API.
#[allow(non_camel_case_types)]
pub enum Model {
    /// `gpt-5` – high reasoning, medium latency.
    GPT5,
    /// `gpt-5-mini` – fast variant of GPT-5 with balanced cost and quality.
    GPT5Mini,
    /// `gpt-4o` – Omni model with text + image inputs.
    GPT4o,
    /// `gpt-4o-mini` – cost effective GPT-4o derivative.
    GPT4oMini,
    /// `gpt-4.1` – general availability GPT-4.1.
    GPT41,
    /// `gpt-4.1-mini` – reduced cost GPT-4.1 tier.
    GPT41Mini,
    /// `gpt-4.1-nano` – ultra low cost GPT-4.1 derivative.
    GPT41Nano,
}

/// Convert a [`Model`] variant into the string identifier expected by the REST API.
pub fn model_to_string(model: Model) -> String {
    match model {
        Model::GPT5 => "gpt-5".to_string(),
        Model::GPT5Mini => "gpt-5-mini".to_string(),
        Model::GPT4o => "gpt-4o".to_string(),
        Model::GPT4oMini => "gpt-4o-mini".to_string(),
        Model::GPT41 => "gpt-4.1".to_string(),
        Model::GPT41Mini => "gpt-4.1-mini".to_string(),
        Model::GPT41Nano => "gpt-4.1-nano".to_string(),
    }
}

/// Client wrapper for OpenAI's Chat Completions API.
///
/// The wrapper maintains the selected model identifier plus an internal
/// [`TokenUsage`] slot so callers can inspect how many tokens each request
/// consumed. It reuses the pooled HTTP client from
/// [`crate::clients::http_pool`].
pub struct OpenAIClient {
    /// Underlying SDK client pointing at the REST endpoint.
    client: openai_rust::Client,
    /// Model name that will be injected into each request.
    model: String,
    /// Storage for the token usage returned by the most recent request.
    token_usage: Mutex<Option<TokenUsage>>,
}

impl OpenAIClient {
    /// Construct a new client using the provided API key and [`Model`] variant.
    pub fn new_with_model_enum(secret_key: &str, model: Model) -> Self {
        Self::new_with_model_string(secret_key, &model_to_string(model))
    }

    /// Construct a new client using the provided API key and explicit model name.
    ///
    /// This is the most general constructor and can be used for unofficial model
    /// identifiers (e.g. OpenAI compatible self-hosted deployments).
    pub fn new_with_model_string(secret_key: &str, model_name: &str) -> Self {
        OpenAIClient {
            client: openai_rust::Client::new_with_client(
                secret_key,
                get_http_client(OPENAI_BASE_URL),
            ),
            model: model_name.to_string(),
            token_usage: Mutex::new(None),
        }
    }

    /// Construct a client targeting a custom OpenAI compatible base URL.
    pub fn new_with_base_url(secret_key: &str, model_name: &str, base_url: &str) -> Self {
        OpenAIClient {
            client: openai_rust::Client::new_with_client_and_base_url(
                secret_key,
                get_http_client(base_url),
                base_url,
            ),
            model: model_name.to_string(),
            token_usage: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ClientWrapper for OpenAIClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        role_instruction: &str,
        context: &[Turn],
    ) -> Result<Turn, Box<dyn Error>> {
        let formatted_messages = format_context(role_instruction, context);

        let url_path_string = "/v1/chat/completions".to_string();

        let result = send_and_track(
            &self.client,
            &self.model,
            formatted_messages,
            Some(url_path_string),
            &self.token_usage,
        )
        .await;

        match result {
            Ok(content) => Ok(Turn::assistant(content)),
            Err(err) => {
                if log::log_enabled!(log::Level::Error) {
                    log::error!("OpenAIClient::generate(...): OpenAI API Error: {}", err);
                }
                Err(err)
            }
        }
    }

    fn generate_stream<'a>(
        &'a self,
        role_instruction: &'a str,
        context: &'a [Turn],
    ) -> FragmentStreamFuture<'a> {
        Box::pin(async move {
            let formatted_messages = format_context(role_instruction, context);

            let url_path_string = "/v1/chat/completions".to_string();

            let chat_arguments = chat::ChatArguments::new(&self.model, formatted_messages);

            let stream_result = self
                .client
                .create_chat_stream(chat_arguments, Some(url_path_string))
                .await;

            match stream_result {
                Ok(mut chunk_stream) => {
                    // Drain the SDK stream eagerly; its chunks are not Send-safe
                    // so they cannot cross the trait boundary directly.
                    let mut fragments: Vec<Result<ReplyFragment, SendError>> = Vec::new();

                    while let Some(chunk_result) = chunk_stream.next().await {
                        let fragment: Result<ReplyFragment, SendError> = match chunk_result {
                            Ok(chunk) => {
                                let text = chunk
                                    .choices
                                    .first()
                                    .and_then(|choice| choice.delta.content.clone())
                                    .unwrap_or_default();

                                let is_final = chunk
                                    .choices
                                    .first()
                                    .and_then(|choice| choice.finish_reason.as_ref())
                                    .is_some();

                                Ok(ReplyFragment { text, is_final })
                            }
                            Err(err) => {
                                if log::log_enabled!(log::Level::Error) {
                                    log::error!(
                                        "OpenAIClient::generate_stream(...): Stream chunk error: {}",
                                        err
                                    );
                                }
                                Err(Box::new(StreamError(format!("Stream chunk error: {}", err)))
                                    as SendError)
                            }
                        };

                        fragments.push(fragment);
                    }

                    Ok(fragments_to_stream(fragments))
                }
                Err(err) => {
                    if log::log_enabled!(log::Level::Error) {
                        log::error!("OpenAIClient::generate_stream(...): OpenAI API Error: {}", err);
                    }
                    Err(err.into())
                }
            }
        })
    }

    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        Some(&self.token_usage)
    }
}
