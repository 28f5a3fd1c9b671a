pub mod error_response;
pub mod query_handler;
pub mod routes;
pub mod state;
pub mod upload;

pub use error_response::ApiError;
pub use routes::router;
pub use state::AppState;
