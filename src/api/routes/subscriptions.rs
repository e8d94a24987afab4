use axum::Json;
use axum::extract::State;
use serde::Serialize;

use super::AppState;

#[derive(Serialize)]
pub struct TopicView {
    pub name: String,
    pub subscriber_count: usize,
    pub subscriber_ids: Vec<String>,
}

/// `GET /subscriptions` — lists every currently registered topic, its
/// subscriber count, and the id of each attached subscriber.
pub async fn list_subscriptions(State(state): State<AppState>) -> Json<Vec<TopicView>> {
    let topics = state.hub.list_topics().await;
    let mut views = Vec::with_capacity(topics.len());
    for topic in topics {
        let ids = state.hub.list_subscribers(&topic.name).await;
        views.push(TopicView {
            name: topic.name,
            subscriber_count: topic.subscriber_count,
            subscriber_ids: ids.into_iter().map(|id| format!("{id:032x}")).collect(),
        });
    }
    Json(views)
}
