use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use file_insights::{ErrorResponse, QueryError};

/// Every failure leaves the server as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    Query(QueryError),
    BadRequest(String),
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::Query(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Query(QueryError::FileTooLarge) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Query(err) if err.is_validation() => StatusCode::BAD_REQUEST,
            ApiError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Query(err) => err.to_string(),
            ApiError::BadRequest(message) => message,
        };
        let error = if message.trim().is_empty() {
            "Server error".to_string()
        } else {
            message
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
