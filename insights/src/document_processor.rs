use crate::error::{QueryError, QueryResult};
use regex::Regex;
use std::sync::OnceLock;

/// Turns raw document bytes into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> QueryResult<String>;
}

/// Best-effort PDF text extraction backed by `pdf-extract`.
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> QueryResult<String> {
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| QueryError::Extraction(e.to_string()))?;

        Ok(clean_text(&text))
    }
}

fn clean_text(text: &str) -> String {
    static BLANK_RUNS: OnceLock<Regex> = OnceLock::new();
    let re = BLANK_RUNS.get_or_init(|| Regex::new(r"\n[ \t\r\x0C]*(?:\n[ \t\r\x0C]*)+\n").unwrap());

    re.replace_all(text, "\n\n").trim().to_string()
}
