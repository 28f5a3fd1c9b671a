use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Largest accepted PDF upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Upper bound on the trimmed question length, in characters.
pub const MAX_QUESTION_CHARS: usize = 250;
/// Extracted text is cut to this many characters before it reaches the prompt.
pub const MAX_DOCUMENT_CHARS: usize = 30_000;
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// A PDF received in a multipart request. Lives in memory for one request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Admission check for a declared media type.
pub fn check_media_type(media_type: Option<&str>) -> Result<(), QueryError> {
    match media_type {
        Some(PDF_MEDIA_TYPE) => Ok(()),
        _ => Err(QueryError::UnsupportedMediaType),
    }
}

/// Admission check for a (possibly partial) upload size.
pub fn check_upload_size(size: usize) -> Result<(), QueryError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(QueryError::FileTooLarge);
    }
    Ok(())
}

/// A question whose trimmed form is 1..=250 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question(String);

impl Question {
    pub fn parse(raw: Option<&str>) -> Result<Self, QueryError> {
        let trimmed = raw.map(str::trim).unwrap_or_default();
        let len = trimmed.chars().count();
        if len == 0 || len > MAX_QUESTION_CHARS {
            return Err(QueryError::InvalidQuestion);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Cuts `text` to at most `max_chars` characters without splitting one.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Author of a message, both in completion requests and in the chat transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Payload sent once per query to the chat-completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub content: Option<String>,
}

/// `{"error": {"message": ...}}` as returned by OpenAI-compatible APIs.
#[derive(Debug, Deserialize)]
pub struct UpstreamErrorBody {
    pub error: UpstreamErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct UpstreamErrorDetail {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryAnswer {
    pub success: bool,
    pub answer: String,
}

impl QueryAnswer {
    pub fn new(answer: String) -> Self {
        Self {
            success: true,
            answer,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Either shape of a `/api/query` response body, as seen by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryReply {
    #[serde(default)]
    pub success: bool,
    pub answer: Option<String>,
    pub error: Option<String>,
}
