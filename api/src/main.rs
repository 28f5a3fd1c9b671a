use anyhow::Result;
use file_insights::{ChatCompletionClient, Config, PdfTextExtractor, QueryService};
use insights_api::{router, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment variables and logging
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;

    let completion = ChatCompletionClient::new(&config)?;
    let query_service = QueryService::new(
        Arc::new(PdfTextExtractor::new()),
        Arc::new(completion),
        config.model.clone(),
    );

    let app = router(AppState::new(query_service), &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    log::info!(
        "Backend server running on {} (model {})",
        listener.local_addr()?,
        config.model
    );
    axum::serve(listener, app).await?;

    Ok(())
}
