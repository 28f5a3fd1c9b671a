//! Client side of the chat: one attached PDF, a transcript, and a loading flag.
//!
//! [`ChatSession`] mirrors what the browser UI does. The transport is a
//! [`QueryApi`] so the session can run against the real server or a stub.

use crate::models::{QueryReply, Role, MAX_UPLOAD_BYTES, PDF_MEDIA_TYPE};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::path::Path;
use thiserror::Error;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error — please try again later.";
const OCTET_STREAM_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
}

/// A file picked by the user, before it is sent anywhere.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// Declares the media type from the file extension, as a browser file picker does.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let is_pdf = Path::new(&name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        let media_type = if is_pdf {
            PDF_MEDIA_TYPE
        } else {
            OCTET_STREAM_MEDIA_TYPE
        };

        Self {
            name,
            media_type: media_type.to_string(),
            bytes,
        }
    }

    pub fn pdf(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: PDF_MEDIA_TYPE.to_string(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    FileAttached,
    AwaitingAnswer,
}

/// Reasons the session refused an action. Nothing in the session changes when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("File too large — max 10MB")]
    FileTooLarge,
    #[error("Please upload a PDF first")]
    NoDocument,
    #[error("Question is empty")]
    EmptyQuestion,
    #[error("A question is already being answered")]
    Busy,
}

/// A submitted question waiting for its answer.
#[derive(Debug, Clone)]
pub struct PendingQuery {
    pub question: String,
    pub file: Option<SelectedFile>,
}

#[async_trait]
pub trait QueryApi: Send + Sync {
    async fn query(&self, question: &str, file: Option<&SelectedFile>) -> Result<QueryReply>;
}

#[derive(Debug, Default)]
pub struct ChatSession {
    file: Option<SelectedFile>,
    transcript: Vec<TranscriptEntry>,
    loading: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn active_file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// `FileAttached` holds only until the first question about the file;
    /// once an answer is in, the session is back to `Idle`.
    pub fn state(&self) -> SessionState {
        if self.loading {
            SessionState::AwaitingAnswer
        } else if self.file.is_some() && self.transcript.is_empty() {
            SessionState::FileAttached
        } else {
            SessionState::Idle
        }
    }

    /// Character count shown next to the input box.
    pub fn char_count(input: &str) -> usize {
        input.chars().count()
    }

    pub fn attach_file(&mut self, file: SelectedFile) -> Result<(), SessionError> {
        if file.size() > MAX_UPLOAD_BYTES {
            return Err(SessionError::FileTooLarge);
        }
        self.file = Some(file);
        self.transcript.clear();
        Ok(())
    }

    /// Records the user's question and enters the loading state.
    pub fn begin_submit(&mut self, input: &str) -> Result<PendingQuery, SessionError> {
        let question = input.trim();
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }
        if self.file.is_none() && self.transcript.is_empty() {
            return Err(SessionError::NoDocument);
        }
        if self.loading {
            return Err(SessionError::Busy);
        }

        self.transcript.push(TranscriptEntry {
            role: Role::User,
            content: question.to_string(),
        });
        self.loading = true;

        Ok(PendingQuery {
            question: question.to_string(),
            file: self.file.clone(),
        })
    }

    /// Appends exactly one assistant entry for the outcome and leaves loading.
    pub fn finish_submit(&mut self, outcome: Result<QueryReply>) {
        let content = match outcome {
            Ok(reply) if reply.success => reply.answer.unwrap_or_default(),
            Ok(reply) => format!("Error: {}", reply.error.unwrap_or_default()),
            Err(e) => {
                log::warn!("Query request failed: {e:#}");
                NETWORK_ERROR_MESSAGE.to_string()
            }
        };

        self.transcript.push(TranscriptEntry {
            role: Role::Assistant,
            content,
        });
        self.loading = false;
    }

    pub async fn submit(&mut self, input: &str, api: &dyn QueryApi) -> Result<(), SessionError> {
        let pending = self.begin_submit(input)?;
        let outcome = api.query(&pending.question, pending.file.as_ref()).await;
        self.finish_submit(outcome);
        Ok(())
    }
}

/// Posts `pdf` and `question` as multipart form fields to `{base_url}/api/query`.
pub struct HttpQueryApi {
    client: Client,
    base_url: String,
}

impl HttpQueryApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl QueryApi for HttpQueryApi {
    async fn query(&self, question: &str, file: Option<&SelectedFile>) -> Result<QueryReply> {
        let mut form = Form::new();
        if let Some(file) = file {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.name.clone())
                .mime_str(&file.media_type)?;
            form = form.part("pdf", part);
        }
        form = form.text("question", question.to_string());

        let reply = self
            .client
            .post(format!("{}/api/query", self.base_url))
            .multipart(form)
            .send()
            .await?
            .json::<QueryReply>()
            .await?;

        Ok(reply)
    }
}
