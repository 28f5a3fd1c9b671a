use file_insights::QueryService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub query_service: Arc<QueryService>,
}

impl AppState {
    pub fn new(query_service: QueryService) -> Self {
        Self {
            query_service: Arc::new(query_service),
        }
    }
}
