//! The command model and the dispatcher loop that drains it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use super::channel::{LivenessRx, MessageTx, message_pair};
use super::lock::WriterPreferringLock;

/// A subscriber as seen from the registry side: its id and the hub's sending
/// halves of its two streams, each behind its own `Mutex<Option<_>>` so the
/// dispatcher can hand out cheap `Arc` clones of the entry as a snapshot
/// without ever removing it from the live `subscribers` vec, and so a
/// forced close (topic removal, shutdown) can sever the stream even while
/// another task is mid-handshake with the same entry.
pub(super) struct SubscriberEntry<T> {
    pub(super) id: u128,
    messages: Mutex<Option<MessageTx<T>>>,
    liveness: Mutex<Option<LivenessRx>>,
}

impl<T> SubscriberEntry<T> {
    fn new(messages: MessageTx<T>, liveness: LivenessRx, id: u128) -> Arc<Self> {
        Arc::new(Self {
            id,
            messages: Mutex::new(Some(messages)),
            liveness: Mutex::new(Some(liveness)),
        })
    }

    async fn is_alive(&self) -> bool {
        match self.liveness.lock().await.as_mut() {
            Some(rx) => rx.is_alive().await,
            None => false,
        }
    }

    async fn send(&self, value: T) -> bool
    where
        T: Send,
    {
        match self.messages.lock().await.as_ref() {
            Some(tx) => tx.send(value).await,
            None => false,
        }
    }

    /// Drops both channel halves unconditionally, regardless of how many
    /// other `Arc` clones of this entry are in flight.
    async fn close(&self) {
        self.messages.lock().await.take();
        self.liveness.lock().await.take();
    }
}

pub(super) struct Topic {
    pub(super) name: String,
}

pub(super) struct HubState<T> {
    pub(super) topics: HashMap<String, Topic>,
    pub(super) subscribers: HashMap<String, Vec<Arc<SubscriberEntry<T>>>>,
    pub(super) ids: std::collections::HashSet<u128>,
}

impl<T> HubState<T> {
    pub(super) fn new() -> Self {
        Self {
            topics: HashMap::new(),
            subscribers: HashMap::new(),
            ids: std::collections::HashSet::new(),
        }
    }
}

pub(super) enum Command<T> {
    Publish { topic: String, payload: T },
    RemoveSubscriber { topic: String, id: u128 },
    RemoveTopic { topic: String },
    Shutdown,
}

/// Spawns the single-consumer dispatcher task and returns the command sender
/// plus its join handle. The dispatcher owns the only write-path to
/// subscriber `messages` streams during normal operation.
pub(super) fn spawn_dispatcher<T>(
    state: WriterPreferringLock<HubState<T>>,
    capacity: usize,
) -> (mpsc::Sender<Command<T>>, tokio::task::JoinHandle<()>)
where
    T: Clone + Send + Sync + 'static,
{
    let (tx, mut rx) = mpsc::channel::<Command<T>>(capacity);

    let handle = tokio::spawn(async move {
        while let Some(cmd) = rx.recv().await {
            match cmd {
                Command::Shutdown => {
                    rx.close();
                    break;
                }
                Command::RemoveTopic { topic } => {
                    remove_topic(&state, &topic).await;
                }
                Command::RemoveSubscriber { topic, id } => {
                    remove_subscriber(&state, &topic, id).await;
                }
                Command::Publish { topic, payload } => {
                    publish(&state, &topic, payload).await;
                }
            }
        }

        // Drain: close every remaining subscriber's message stream and wipe
        // both registries, unconditionally (no liveness check — see
        // RemoveTopic's note on the same subject).
        drain_and_close(&state).await;
        tracing::debug!("hub dispatcher drained and shut down");
    });

    (tx, handle)
}

async fn drain_and_close<T>(state: &WriterPreferringLock<HubState<T>>)
where
    T: Send + Sync + 'static,
{
    let entries: Vec<Arc<SubscriberEntry<T>>> = {
        let mut guard = state.write().await;
        let entries = guard.subscribers.drain().flat_map(|(_, subs)| subs).collect();
        guard.topics.clear();
        guard.ids.clear();
        entries
    };
    for entry in entries {
        entry.close().await;
    }
}

async fn remove_topic<T>(state: &WriterPreferringLock<HubState<T>>, topic: &str)
where
    T: Send + Sync + 'static,
{
    let removed: Vec<Arc<SubscriberEntry<T>>> = {
        let mut guard = state.write().await;
        if !guard.topics.contains_key(topic) {
            tracing::debug!(topic, "remove_topic: topic already gone");
            return;
        }
        let subs = guard.subscribers.remove(topic).unwrap_or_default();
        for sub in &subs {
            guard.ids.remove(&sub.id);
        }
        guard.topics.remove(topic);
        subs
    };
    // Dropping the reference doesn't by itself close the channel — another
    // task may still hold a snapshot `Arc` of the same entry mid-publish —
    // so close() is called explicitly; no liveness check, see 4.E's
    // resolved open question.
    for entry in removed {
        entry.close().await;
    }
}

async fn remove_subscriber<T>(state: &WriterPreferringLock<HubState<T>>, topic: &str, id: u128)
where
    T: Send + Sync + 'static,
{
    let removed = {
        let mut guard = state.write().await;
        let pos = match guard.subscribers.get(topic) {
            Some(subs) => subs.iter().position(|s| s.id == id),
            None => {
                tracing::debug!(topic, "remove_subscriber: topic already gone");
                None
            }
        };
        match pos {
            Some(pos) => {
                let entry = guard.subscribers.get_mut(topic).unwrap().remove(pos);
                guard.ids.remove(&id);
                Some(entry)
            }
            None => None,
        }
    };
    if let Some(entry) = removed {
        entry.close().await;
    }
}

async fn publish<T>(state: &WriterPreferringLock<HubState<T>>, topic: &str, payload: T)
where
    T: Clone + Send + Sync + 'static,
{
    // Snapshot the subscriber list under a single read-lock: a `Vec` of
    // `Arc` clones, not a temporary removal. The live `subscribers[topic]`
    // entry is untouched for the whole iteration, so a concurrent
    // `list_subscribers`/`get_topic` call never sees a subscriber go
    // missing mid-publish.
    let snapshot: Vec<Arc<SubscriberEntry<T>>> = {
        let guard = state.read().await;
        match guard.subscribers.get(topic) {
            Some(subs) => subs.clone(),
            None => return,
        }
    };

    for entry in snapshot {
        if !entry.is_alive().await {
            remove_subscriber(state, topic, entry.id).await;
            continue;
        }
        if !entry.send(payload.clone()).await {
            remove_subscriber(state, topic, entry.id).await;
        }
    }
}

pub(super) fn new_subscriber_entry<T>(
    messages: MessageTx<T>,
    liveness: LivenessRx,
    id: u128,
) -> Arc<SubscriberEntry<T>> {
    SubscriberEntry::new(messages, liveness, id)
}

pub(super) fn new_message_channel<T>() -> (MessageTx<T>, super::channel::MessageRx<T>) {
    message_pair()
}
