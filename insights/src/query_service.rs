use crate::completion_service::CompletionBackend;
use crate::document_processor::TextExtractor;
use crate::error::{QueryError, QueryResult};
use crate::models::*;
use crate::prompt_builder::build_prompt;
use std::sync::Arc;

/// Validates a query, extracts the document and relays both to the model.
pub struct QueryService {
    extractor: Arc<dyn TextExtractor>,
    completion: Arc<dyn CompletionBackend>,
    model: String,
}

impl QueryService {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        completion: Arc<dyn CompletionBackend>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            extractor,
            completion,
            model: model.into(),
        }
    }

    /// Runs the whole pipeline for one request.
    ///
    /// Question checks come before the file check; neither touches the
    /// extractor or the completion backend when it fails. `request_id`
    /// prefixes every log line written for this request.
    pub async fn answer(
        &self,
        request_id: &str,
        question: Option<&str>,
        file: Option<UploadedFile>,
    ) -> QueryResult<String> {
        let question = Question::parse(question)?;
        let file = file.ok_or(QueryError::MissingFile)?;

        let text = self.extract(request_id, file).await?;
        let document_text = truncate_chars(&text, MAX_DOCUMENT_CHARS);

        let request = build_prompt(&self.model, document_text, question.as_str());
        self.completion.complete(&request).await
    }

    async fn extract(&self, request_id: &str, file: UploadedFile) -> QueryResult<String> {
        let extractor = Arc::clone(&self.extractor);
        let size = file.size();
        log::info!(
            "[{request_id}] Extracting text from {} ({size} bytes)",
            file.filename.as_deref().unwrap_or("upload"),
        );

        let text = tokio::task::spawn_blocking(move || extractor.extract(&file.bytes))
            .await
            .map_err(|e| QueryError::Extraction(format!("PDF parser aborted: {e}")))??;

        log::debug!(
            "[{request_id}] Extracted {} characters from {size} byte PDF",
            text.chars().count()
        );
        Ok(text)
    }
}
