use duologue::client_wrapper::{ClientWrapper, Role, Turn};
use duologue::clients::common::format_context;
use duologue::clients::gemini::{self, GeminiClient};
use duologue::clients::openai::{self, OpenAIClient};

#[test]
fn openai_model_names_match_the_rest_api() {
    assert_eq!(openai::model_to_string(openai::Model::GPT41Nano), "gpt-4.1-nano");
    assert_eq!(openai::model_to_string(openai::Model::GPT4oMini), "gpt-4o-mini");
    assert_eq!(openai::model_to_string(openai::Model::GPT5), "gpt-5");
}

#[test]
fn gemini_model_names_match_the_rest_api() {
    assert_eq!(
        gemini::model_to_string(gemini::Model::Gemini25Flash),
        "gemini-2.5-flash"
    );
    assert_eq!(
        gemini::model_to_string(gemini::Model::Gemini15Pro),
        "gemini-1.5-pro"
    );
}

#[test]
fn clients_report_their_model_name() {
    let openai_client = OpenAIClient::new_with_model_enum("fake_key", openai::Model::GPT41Mini);
    assert_eq!(openai_client.model_name(), "gpt-4.1-mini");

    let gemini_client = GeminiClient::new_with_model_enum("fake_key", gemini::Model::Gemini25Pro);
    assert_eq!(gemini_client.model_name(), "gemini-2.5-pro");
}

#[test]
fn format_context_leads_with_the_role_instruction() {
    let context = vec![
        Turn::user("question"),
        Turn::assistant("answer").with_label("Analyst"),
    ];

    let formatted = format_context("You are terse.", &context);

    assert_eq!(formatted.len(), 3);
    assert_eq!(formatted[0].role, "system");
    assert_eq!(formatted[0].content, "You are terse.");
    assert_eq!(formatted[1].role, "user");
    assert_eq!(formatted[1].content, "question");
    // Labels are session-level metadata and never reach the wire format.
    assert_eq!(formatted[2].role, "assistant");
    assert_eq!(formatted[2].content, "answer");
}

#[test]
fn turns_are_chronological() {
    let first = Turn::user("first");
    let second = Turn::assistant("second");
    assert!(first.created_at <= second.created_at);
    assert_eq!(first.role, Role::User);
}
