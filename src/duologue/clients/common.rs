use crate::client_wrapper::{FragmentStream, ReplyFragment, Role, SendError, TokenUsage, Turn};
use futures_util::stream;
use openai_rust::chat;
use openai_rust2 as openai_rust;
use std::error::Error;
use std::fmt;
use tokio::sync::Mutex;

/// Error wrapper for per-fragment stream failures.
#[derive(Debug)]
pub struct StreamError(pub String);

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for StreamError {}

/// Convert a role instruction plus ordered turns into the wire format
/// expected by openai_rust. The instruction rides as a leading system
/// message; participant labels are a session-level concept and never go
/// on the wire.
pub fn format_context(role_instruction: &str, context: &[Turn]) -> Vec<chat::Message> {
    let mut formatted = Vec::with_capacity(context.len() + 1);
    formatted.push(chat::Message {
        role: "system".to_owned(),
        content: role_instruction.to_owned(),
    });
    for turn in context {
        formatted.push(chat::Message {
            role: match turn.role {
                Role::System => "system".to_owned(),
                Role::User => "user".to_owned(),
                Role::Assistant => "assistant".to_owned(),
            },
            content: turn.text.clone(),
        });
    }
    formatted
}

/// Send a chat request, record its usage, and return the assistant's content.
pub async fn send_and_track(
    api: &openai_rust::Client,
    model: &str,
    formatted_msgs: Vec<chat::Message>,
    url_path: Option<String>,
    usage_slot: &Mutex<Option<TokenUsage>>,
) -> Result<String, Box<dyn Error>> {
    let chat_arguments = chat::ChatArguments::new(model, formatted_msgs);

    let response = api.create_chat(chat_arguments, url_path).await;

    match response {
        Ok(response) => {
            let usage = TokenUsage {
                input_tokens: response.usage.prompt_tokens as usize,
                output_tokens: response.usage.completion_tokens as usize,
                total_tokens: response.usage.total_tokens as usize,
            };

            // Store it for get_last_usage()
            *usage_slot.lock().await = Some(usage);

            Ok(response.choices[0].message.content.clone())
        }
        Err(err) => {
            log::error!(
                "duologue::clients::common::send_and_track(...): API Error: {}",
                err
            );
            Err(err.into())
        }
    }
}

/// Convert an already-collected fragment sequence into a [`FragmentStream`].
///
/// Useful for clients (and test doubles) that buffer provider chunks before
/// handing them to the session's pull loop.
pub fn fragments_to_stream(fragments: Vec<Result<ReplyFragment, SendError>>) -> FragmentStream {
    Box::pin(stream::iter(fragments))
}
