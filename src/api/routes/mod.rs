mod index;
mod jobs;
mod subscriptions;

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};

use crate::core::config::AppConfig;
use crate::domain::JobStatus;
use crate::hub::Hub;

#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<Hub<JobStatus>>,
    pub config: Arc<AppConfig>,
}

pub fn router(hub: Arc<Hub<JobStatus>>, config: Arc<AppConfig>) -> Router {
    let state = AppState { hub, config };

    Router::new()
        .route("/", get(index::index))
        .route("/jobs", post(jobs::create_job))
        .route("/jobs/{id}", get(jobs::show_job))
        .route("/jobs/{id}/stream", get(jobs::stream_job))
        .route("/subscriptions", get(subscriptions::list_subscriptions))
        .with_state(state)
}

pub async fn handle_404() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found")
}
