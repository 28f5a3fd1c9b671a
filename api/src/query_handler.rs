use crate::error_response::ApiError;
use crate::state::AppState;
use crate::upload::QueryForm;
use axum::{extract::State, Json};
use file_insights::QueryAnswer;
use uuid::Uuid;

pub async fn health() -> &'static str {
    "OK"
}

pub async fn handle_query(
    State(state): State<AppState>,
    form: QueryForm,
) -> Result<Json<QueryAnswer>, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    log::info!(
        "[{request_id}] Query received ({} byte file)",
        form.file.as_ref().map_or(0, |f| f.size())
    );

    match state
        .query_service
        .answer(&request_id, form.question.as_deref(), form.file)
        .await
    {
        Ok(answer) => {
            log::info!("[{request_id}] Answered with {} characters", answer.chars().count());
            Ok(Json(QueryAnswer::new(answer)))
        }
        Err(e) if e.is_validation() => {
            log::debug!("[{request_id}] Rejected: {e}");
            Err(e.into())
        }
        Err(e) => {
            log::error!("[{request_id}] Error: {e:?}");
            Err(e.into())
        }
    }
}
