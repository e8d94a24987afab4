//! A job's progress, published to its topic as it runs.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::hub::Hub;

/// One update on a job's progress, serialized to the streaming socket as a
/// JSON text frame.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum JobStatus {
    #[serde(rename = "message")]
    Message {
        percent_complete: f32,
        message: String,
    },
    #[serde(rename = "complete")]
    Complete {
        percent_complete: f32,
        message: String,
    },
}

fn topic_name(job_id: u64) -> String {
    format!("job:{job_id}")
}

/// Runs a demo job: creates its topic, publishes four progress updates a
/// second apart, then tears the topic down. Grounded in the original
/// system's `runJob`, which drove the same four-message, one-second-apart
/// schedule over its own hub.
pub async fn run_job(hub: Arc<Hub<JobStatus>>, job_id: u64) {
    let topic = topic_name(job_id);

    if let Err(e) = hub.create_topic(&topic).await {
        tracing::warn!(topic = %topic, error = %e, "run_job: unable to create topic");
        return;
    }
    tracing::info!(topic = %topic, "job started");

    let steps = [
        (0.25, "Hello 1"),
        (0.50, "Hello 2"),
        (0.75, "Hello 3"),
        (1.0, "Hello 4"),
    ];

    for (i, (percent, message)) in steps.iter().enumerate() {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let status = if i + 1 == steps.len() {
            JobStatus::Complete {
                percent_complete: *percent,
                message: message.to_string(),
            }
        } else {
            JobStatus::Message {
                percent_complete: *percent,
                message: message.to_string(),
            }
        };
        match hub.publish_to(&topic, status).await {
            Ok(()) => {}
            Err(e @ crate::hub::HubError::QueueFull) => {
                tracing::warn!(topic = %topic, error = %e, "run_job: dropping update, queue full");
            }
            Err(e) => {
                tracing::warn!(topic = %topic, error = %e, "run_job: topic vanished mid-run");
                return;
            }
        }
    }

    if let Err(e) = hub.remove_topic(&topic).await {
        tracing::debug!(topic = %topic, error = %e, "run_job: topic already removed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_name_matches_job_id() {
        assert_eq!(topic_name(42), "job:42");
    }

    #[test]
    fn job_status_serializes_with_type_tag() {
        let status = JobStatus::Message {
            percent_complete: 0.5,
            message: "Hello 2".to_string(),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["percentComplete"], 0.5);
        assert_eq!(json["message"], "Hello 2");
    }

    #[tokio::test]
    async fn run_job_publishes_and_removes_topic() {
        let hub = Arc::new(Hub::<JobStatus>::new(16));
        let h2 = hub.clone();
        let job_task = tokio::spawn(async move { run_job(h2, 1).await });

        // give run_job a moment to create the topic before we subscribe
        tokio::time::sleep(Duration::from_millis(50)).await;
        let mut sub = hub.subscribe("job:1").await.unwrap();
        let liveness = sub.liveness;
        let pinger = tokio::spawn(async move {
            while liveness.ping().await {}
        });

        let mut received = Vec::new();
        while let Some(status) = sub.messages.read().await {
            received.push(status);
        }

        job_task.await.unwrap();
        pinger.await.unwrap();

        assert_eq!(received.len(), 4);
        assert!(matches!(received.last(), Some(JobStatus::Complete { .. })));
        assert!(hub.get_topic("job:1").await.is_none());
    }
}
