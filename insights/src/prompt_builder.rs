use crate::models::{ChatMessage, CompletionRequest, Role};

pub const MAX_TOKENS: u32 = 1024;
pub const TEMPERATURE: f32 = 0.7;

const SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant that answers questions strictly based on the provided PDF content.";

/// Builds the two-message completion request for one question about one document.
///
/// `document_text` is expected to be truncated already; it is interpolated as-is.
pub fn build_prompt(model: &str, document_text: &str, question: &str) -> CompletionRequest {
    CompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: Role::System,
                content: SYSTEM_INSTRUCTION.to_string(),
            },
            ChatMessage {
                role: Role::User,
                content: format!("PDF content:\n{document_text}\n\nQuestion: {question}"),
            },
        ],
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    }
}
