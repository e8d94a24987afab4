//! The real-time job-progress broadcast hub.
//!
//! `Hub<T>` is the in-process pub/sub core: a topic registry, a subscriber
//! registry, and a single dispatcher task that serializes every mutation
//! through a command queue. See the module-level docs on [`lock`] and
//! [`channel`] for the two building blocks it's made of.

mod channel;
mod command;
mod error;
mod lock;

pub use channel::{LivenessTx, MessageRx};
pub use error::HubError;

use std::sync::Arc;

use tokio::sync::mpsc;

use command::{Command, HubState, spawn_dispatcher};
use lock::WriterPreferringLock;

/// A subscriber handle returned by [`Hub::subscribe`]. The consumer side
/// owns this: ping the hub via `liveness`, read payloads via `messages`.
pub struct Subscription<T> {
    pub id: u128,
    pub liveness: LivenessTx,
    pub messages: MessageRx<T>,
}

#[derive(Clone, Debug)]
pub struct TopicInfo {
    pub name: String,
    pub subscriber_count: usize,
}

/// A topic's identity as returned by [`Hub::get_topic`]; carries only the
/// name, since existence (not subscriber count) is the only thing this
/// record exists to answer.
#[derive(Clone, Debug)]
pub struct TopicRecord {
    pub name: String,
}

pub struct Hub<T> {
    state: Arc<WriterPreferringLock<HubState<T>>>,
    commands: mpsc::Sender<Command<T>>,
    dispatcher: tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl<T> Hub<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Allocates the registries and command queue, and spawns the
    /// dispatcher task. `queue_capacity` bounds the command queue; a full
    /// queue makes [`Hub::publish_to`] return `QueueFull` immediately, while
    /// [`Hub::remove_topic`] still blocks until a slot frees up.
    pub fn new(queue_capacity: usize) -> Self {
        let state = Arc::new(WriterPreferringLock::new(HubState::new()));
        let (commands, handle) = spawn_dispatcher(state.as_ref().clone(), queue_capacity);
        Self {
            state,
            commands,
            dispatcher: tokio::sync::Mutex::new(Some(handle)),
        }
    }

    pub async fn create_topic(&self, name: &str) -> Result<(), HubError> {
        let mut guard = self.state.write().await;
        if guard.topics.contains_key(name) {
            return Err(HubError::TopicAlreadyExists(name.to_string()));
        }
        guard
            .topics
            .insert(name.to_string(), command::Topic { name: name.to_string() });
        guard.subscribers.insert(name.to_string(), Vec::new());
        Ok(())
    }

    /// Returns the topic record, or `None` if no topic with this name is
    /// registered.
    pub async fn get_topic(&self, name: &str) -> Option<TopicRecord> {
        let guard = self.state.read().await;
        guard.topics.get(name).map(|t| TopicRecord { name: t.name.clone() })
    }

    pub async fn list_topics(&self) -> Vec<TopicInfo> {
        let guard = self.state.read().await;
        guard
            .topics
            .keys()
            .map(|name| TopicInfo {
                name: name.clone(),
                subscriber_count: guard.subscribers.get(name).map(|s| s.len()).unwrap_or(0),
            })
            .collect()
    }

    /// Returns a copy of the subscriber id list for a topic, or empty if the
    /// topic is absent.
    pub async fn list_subscribers(&self, name: &str) -> Vec<u128> {
        let guard = self.state.read().await;
        guard
            .subscribers
            .get(name)
            .map(|subs| subs.iter().map(|s| s.id).collect())
            .unwrap_or_default()
    }

    /// Subscribes to an existing topic, returning the consumer-held half of
    /// a fresh subscriber channel. A freshly minted id colliding with a live
    /// one is treated as fatal, not retried: it shuts the dispatcher down
    /// (closing every other subscriber on this hub) and returns
    /// `IdCollision`, since a collision in 128 bits of randomness means the
    /// id space can no longer be trusted.
    pub async fn subscribe(&self, name: &str) -> Result<Subscription<T>, HubError> {
        let mut guard = self.state.write().await;
        if !guard.topics.contains_key(name) {
            return Err(HubError::TopicNotFound(name.to_string()));
        }

        let id = uuid::Uuid::new_v4().as_u128();
        if guard.ids.contains(&id) {
            drop(guard);
            tracing::error!(id, "subscriber id collision, shutting down dispatcher");
            let _ = self.commands.send(Command::Shutdown).await;
            return Err(HubError::IdCollision);
        }
        guard.ids.insert(id);

        let (liveness_tx, liveness_rx) = channel::liveness_pair();
        let (messages_tx, messages_rx) = command::new_message_channel::<T>();
        let entry = command::new_subscriber_entry(messages_tx, liveness_rx, id);

        guard.subscribers.entry(name.to_string()).or_default().push(entry);

        Ok(Subscription {
            id,
            liveness: liveness_tx,
            messages: messages_rx,
        })
    }

    /// Checks the topic exists, then attempts a non-blocking enqueue of a
    /// publish command, surfacing `QueueFull` to the caller rather than
    /// blocking when the dispatcher is backed up.
    pub async fn publish_to(&self, name: &str, payload: T) -> Result<(), HubError> {
        {
            let guard = self.state.read().await;
            if !guard.topics.contains_key(name) {
                return Err(HubError::TopicNotFound(name.to_string()));
            }
        }
        // The topic may vanish between this check and the dispatcher
        // draining the command; that degrades to a silent no-op (4.D).
        match self.commands.try_send(Command::Publish {
            topic: name.to_string(),
            payload,
        }) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => Err(HubError::QueueFull),
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(topic = name, "publish_to: dispatcher already shut down");
                Ok(())
            }
        }
    }

    /// Non-blocking eviction request, used from the HTTP layer when a
    /// streaming socket write fails. Dropped silently if the queue is full
    /// — the dispatcher will evict on the next publish anyway.
    pub fn try_remove_subscriber(&self, name: &str, id: u128) {
        let _ = self.commands.try_send(Command::RemoveSubscriber {
            topic: name.to_string(),
            id,
        });
    }

    pub async fn remove_topic(&self, name: &str) -> Result<(), HubError> {
        {
            let guard = self.state.read().await;
            if !guard.topics.contains_key(name) {
                return Err(HubError::TopicNotFound(name.to_string()));
            }
        }
        if self
            .commands
            .send(Command::RemoveTopic {
                topic: name.to_string(),
            })
            .await
            .is_err()
        {
            tracing::warn!(topic = name, "remove_topic: dispatcher already shut down");
        }
        Ok(())
    }

    /// Enqueues shutdown and waits for the dispatcher task to finish
    /// draining every topic and subscriber.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
        if let Some(handle) = self.dispatcher.lock().await.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "hub dispatcher task panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scenario_a_basic_send_receive() {
        let hub = Hub::<String>::new(16);
        hub.create_topic("job:1").await.unwrap();
        let mut sub = hub.subscribe("job:1").await.unwrap();

        let liveness = sub.liveness;
        tokio::spawn(async move {
            liveness.ping().await;
        });
        hub.publish_to("job:1", "Hello".to_string()).await.unwrap();

        assert_eq!(sub.messages.read().await, Some("Hello".to_string()));
    }

    #[tokio::test]
    async fn scenario_b_early_close_no_send() {
        let (liveness_tx, mut liveness_rx) = channel::liveness_pair();
        liveness_tx.close();
        assert!(!liveness_rx.is_alive().await);
    }

    #[tokio::test]
    async fn scenario_c_two_subscribers_two_publishes() {
        let hub = Arc::new(Hub::<String>::new(16));
        hub.create_topic("job:1").await.unwrap();
        let mut a = hub.subscribe("job:1").await.unwrap();
        let mut b = hub.subscribe("job:1").await.unwrap();

        let a_live = a.liveness;
        let b_live = b.liveness;

        let a_task = tokio::spawn(async move {
            let mut got = Vec::new();
            for _ in 0..2 {
                a_live.ping().await;
                if let Some(v) = a.messages.read().await {
                    got.push(v);
                }
            }
            (a_live, a.messages, got)
        });
        let b_task = tokio::spawn(async move {
            let mut got = Vec::new();
            for _ in 0..2 {
                b_live.ping().await;
                if let Some(v) = b.messages.read().await {
                    got.push(v);
                }
            }
            (b_live, b.messages, got)
        });

        hub.publish_to("job:1", "Hello Mike".to_string())
            .await
            .unwrap();
        hub.publish_to("job:1", "Hello Carol".to_string())
            .await
            .unwrap();

        let (_a_live, _a_msgs, a_got) = a_task.await.unwrap();
        let (_b_live, _b_msgs, b_got) = b_task.await.unwrap();

        assert_eq!(a_got, vec!["Hello Mike", "Hello Carol"]);
        assert_eq!(b_got, vec!["Hello Mike", "Hello Carol"]);

        hub.shutdown().await;
    }

    #[tokio::test]
    async fn scenario_f_publish_to_missing_topic() {
        let hub = Hub::<String>::new(16);
        let err = hub.publish_to("job:1", "x".to_string()).await.unwrap_err();
        assert!(matches!(err, HubError::TopicNotFound(_)));
    }

    #[tokio::test]
    async fn scenario_g_late_subscription_miss() {
        let hub = Hub::<String>::new(16);
        hub.create_topic("job:1").await.unwrap();
        hub.remove_topic("job:1").await.unwrap();
        hub.shutdown().await;

        let hub2 = Hub::<String>::new(16);
        let err = hub2.subscribe("job:1").await.unwrap_err();
        assert!(matches!(err, HubError::TopicNotFound(_)));
    }

    #[tokio::test]
    async fn scenario_e_publish_then_topic_removal_closes_stream() {
        let hub = Hub::<String>::new(16);
        hub.create_topic("job:1").await.unwrap();
        let mut sub = hub.subscribe("job:1").await.unwrap();
        let liveness = sub.liveness;

        let liveness_task = tokio::spawn(async move {
            liveness.ping().await;
            liveness
        });
        hub.publish_to("job:1", "M1".to_string()).await.unwrap();
        assert_eq!(sub.messages.read().await, Some("M1".to_string()));
        let _liveness = liveness_task.await.unwrap();

        hub.remove_topic("job:1").await.unwrap();
        assert_eq!(sub.messages.read().await, None);

        let topics = hub.list_topics().await;
        assert!(topics.iter().all(|t| t.name != "job:1"));
    }

    #[tokio::test]
    async fn create_topic_twice_errors() {
        let hub = Hub::<String>::new(16);
        hub.create_topic("job:1").await.unwrap();
        let err = hub.create_topic("job:1").await.unwrap_err();
        assert!(matches!(err, HubError::TopicAlreadyExists(_)));
    }

    #[tokio::test]
    async fn shutdown_drains_and_closes_all_streams() {
        let hub = Hub::<String>::new(16);
        hub.create_topic("job:1").await.unwrap();
        let mut sub = hub.subscribe("job:1").await.unwrap();
        hub.shutdown().await;
        assert_eq!(sub.messages.read().await, None);
    }

    #[tokio::test]
    async fn get_topic_reflects_existence() {
        let hub = Hub::<String>::new(16);
        assert!(hub.get_topic("job:1").await.is_none());
        hub.create_topic("job:1").await.unwrap();
        assert_eq!(hub.get_topic("job:1").await.unwrap().name, "job:1");
    }

    #[tokio::test]
    async fn list_subscribers_returns_registered_ids() {
        let hub = Hub::<String>::new(16);
        hub.create_topic("job:1").await.unwrap();
        assert!(hub.list_subscribers("job:1").await.is_empty());

        let a = hub.subscribe("job:1").await.unwrap();
        let b = hub.subscribe("job:1").await.unwrap();
        let mut ids = hub.list_subscribers("job:1").await;
        ids.sort();
        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn publish_does_not_hide_subscriber_from_registry_mid_flight() {
        let hub = Arc::new(Hub::<String>::new(16));
        hub.create_topic("job:1").await.unwrap();
        let sub = hub.subscribe("job:1").await.unwrap();
        let sub_id = sub.id;

        let hub2 = hub.clone();
        let publish_task =
            tokio::spawn(async move { hub2.publish_to("job:1", "hi".to_string()).await });

        // Give the dispatcher a chance to pick up the command and start
        // waiting on this subscriber's liveness handshake before we look.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(hub.list_subscribers("job:1").await, vec![sub_id]);

        let liveness = sub.liveness;
        let mut messages = sub.messages;
        liveness.ping().await;
        assert_eq!(messages.read().await, Some("hi".to_string()));
        publish_task.await.unwrap().unwrap();
    }
}
