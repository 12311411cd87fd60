use crate::client_wrapper::{ClientWrapper, TokenUsage, Turn};
use crate::clients::common::{format_context, send_and_track};
use async_trait::async_trait;
use log::error;
use openai_rust2 as openai_rust;
use std::error::Error;
use tokio::sync::Mutex;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

/// Client wrapper for Google Gemini, driven through its OpenAI-compatible
/// chat completions endpoint. Non-streaming only.
pub struct GeminiClient {
    client: openai_rust::Client,
    pub model: String,
    token_usage: Mutex<Option<TokenUsage>>,
}

/// Gemini chat model identifiers.
pub enum Model {
    Gemini25Pro,
    Gemini25Flash,
    Gemini20Flash,
    Gemini20FlashLite,
    Gemini15Pro,
    Gemini15Flash,
}

pub fn model_to_string(model: Model) -> String {
    match model {
        Model::Gemini25Pro => "gemini-2.5-pro".to_string(),
        Model::Gemini25Flash => "gemini-2.5-flash".to_string(),
        Model::Gemini20Flash => "gemini-2.0-flash".to_string(),
        Model::Gemini20FlashLite => "gemini-2.0-flash-lite".to_string(),
        Model::Gemini15Pro => "gemini-1.5-pro".to_string(),
        Model::Gemini15Flash => "gemini-1.5-flash".to_string(),
    }
}

impl GeminiClient {
    pub fn new_with_model_string(secret_key: &str, model_name: &str) -> Self {
        Self::new_with_base_url(secret_key, model_name, GEMINI_BASE_URL)
    }

    pub fn new_with_model_enum(secret_key: &str, model: Model) -> Self {
        Self::new_with_model_string(secret_key, &model_to_string(model))
    }

    /// This function is used to create a GeminiClient with a custom base URL.
    /// The default base URL is "<https://generativelanguage.googleapis.com/v1beta/>"
    pub fn new_with_base_url(secret_key: &str, model_name: &str, base_url: &str) -> Self {
        GeminiClient {
            client: openai_rust::Client::new_with_base_url(secret_key, base_url),
            model: model_name.to_string(),
            token_usage: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ClientWrapper for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        role_instruction: &str,
        context: &[Turn],
    ) -> Result<Turn, Box<dyn Error>> {
        let formatted_messages = format_context(role_instruction, context);

        // Use the shared helper to send & track usage
        let url_path = Some("/v1beta/chat/completions".to_string());
        let result = send_and_track(
            &self.client,
            &self.model,
            formatted_messages,
            url_path,
            &self.token_usage,
        )
        .await;

        match result {
            Ok(content) => Ok(Turn::assistant(content)),
            Err(err) => {
                if log::log_enabled!(log::Level::Error) {
                    error!("GeminiClient::generate error: {}", err);
                }
                Err(err)
            }
        }
    }

    /// Token usage for the last request; without this override there would be
    /// no tracking because the default `usage_slot()` returns `None`.
    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        Some(&self.token_usage)
    }
}
