use axum::extract::State;
use axum::response::Html;

use super::AppState;
use crate::api::render;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render::index(&state.config))
}
