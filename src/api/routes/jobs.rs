use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Form, Path, State};
use axum::response::{Html, IntoResponse, Redirect};
use serde::Deserialize;

use super::AppState;
use crate::api::render;
use crate::api::types::ApiError;
use crate::domain::run_job;

#[derive(Deserialize)]
pub struct CreateJobForm {
    id: u64,
}

fn topic_name(job_id: u64) -> String {
    format!("job:{job_id}")
}

/// `POST /jobs` — starts a job's producer task unless one with this id is
/// already running, then redirects to its page. Mirrors the original
/// system's `createJob`, which spawned `runJob` and redirected the same way.
pub async fn create_job(
    State(state): State<AppState>,
    Form(form): Form<CreateJobForm>,
) -> impl IntoResponse {
    let topic = topic_name(form.id);
    if state.hub.get_topic(&topic).await.is_some() {
        return Redirect::to(&format!("/jobs/{}", form.id));
    }

    let hub = state.hub.clone();
    tokio::spawn(async move { run_job(hub, form.id).await });

    Redirect::to(&format!("/jobs/{}", form.id))
}

pub async fn show_job(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Html<String> {
    Html(render::job(&state.config, id))
}

/// `GET /jobs/:id/stream` — upgrades to a WebSocket and relays the job's
/// topic to the browser, ping-then-read, one frame per payload. The
/// original system used the same full-duplex-socket contract (`gorilla/
/// websocket`) for this exact purpose.
pub async fn stream_job(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    ws: WebSocketUpgrade,
) -> axum::response::Response {
    let topic = topic_name(id);
    match state.hub.subscribe(&topic).await {
        Ok(sub) => ws.on_upgrade(move |socket| relay(socket, state, topic, sub)),
        Err(e) => ApiError::not_found("JOB_NOT_FOUND", e.to_string()).into_response(),
    }
}

async fn relay(
    mut socket: WebSocket,
    state: AppState,
    topic: String,
    mut sub: crate::hub::Subscription<crate::domain::JobStatus>,
) {
    loop {
        if !sub.liveness.ping().await {
            break;
        }
        let Some(status) = sub.messages.read().await else {
            break;
        };
        let text = match serde_json::to_string(&status) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "unable to serialize job status");
                continue;
            }
        };
        if socket.send(Message::Text(text.into())).await.is_err() {
            tracing::debug!(topic = %topic, "client gone, evicting subscriber");
            state.hub.try_remove_subscriber(&topic, sub.id);
            break;
        }
    }
}
