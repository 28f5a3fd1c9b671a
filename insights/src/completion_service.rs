use crate::config::Config;
use crate::error::{QueryError, QueryResult};
use crate::models::*;
use async_trait::async_trait;
use reqwest::Client;

/// Sends one completion request and returns the answer text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> QueryResult<String>;
}

/// Client for an OpenAI-compatible chat-completions endpoint (Groq by default).
pub struct ChatCompletionClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl ChatCompletionClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl CompletionBackend for ChatCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> QueryResult<String> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;

        // Error bodies are honoured whatever the status says.
        if let Ok(upstream) = serde_json::from_str::<UpstreamErrorBody>(&body) {
            return Err(QueryError::Upstream(upstream.error.message));
        }
        if !status.is_success() {
            return Err(QueryError::Upstream(format!(
                "Request failed with status code {}",
                status.as_u16()
            )));
        }

        let completion: CompletionResponse = serde_json::from_str(&body).map_err(|e| {
            QueryError::Upstream(format!("Unexpected response from completion API: {e}"))
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| QueryError::Upstream("Completion API returned no choices".to_string()))?
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| {
                QueryError::Upstream("Completion API returned an empty message".to_string())
            })?;

        Ok(content.trim().to_string())
    }
}
