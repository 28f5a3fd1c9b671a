pub mod models;
pub mod error;
pub mod config;
pub mod document_processor;
pub mod prompt_builder;
pub mod completion_service;
pub mod query_service;
pub mod chat_client;

pub use models::*;
pub use error::{QueryError, QueryResult};
pub use config::Config;
pub use document_processor::{PdfTextExtractor, TextExtractor};
pub use prompt_builder::build_prompt;
pub use completion_service::{ChatCompletionClient, CompletionBackend};
pub use query_service::QueryService;
pub use chat_client::{ChatSession, HttpQueryApi, QueryApi, SelectedFile, SessionError};
