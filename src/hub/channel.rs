//! Per-subscriber handshake channel.
//!
//! Each subscriber gets two single-slot, rendezvous-style streams: `liveness`
//! (consumer -> hub) and `messages` (hub -> consumer). Both are built on
//! `tokio::sync::mpsc` channels of capacity 1 paired with a `oneshot` ack, so
//! that `send`/`ping` do not complete until the other side has actually taken
//! the value — a true handshake rather than a buffered queue.

use tokio::sync::{mpsc, oneshot};

/// One slot of `T` plus an ack channel, used for both directions.
struct Slot<T> {
    value: T,
    ack: oneshot::Sender<()>,
}

pub struct LivenessTx {
    tx: mpsc::Sender<Slot<()>>,
}

pub struct LivenessRx {
    rx: mpsc::Receiver<Slot<()>>,
}

pub struct MessageTx<T> {
    tx: mpsc::Sender<Slot<T>>,
}

pub struct MessageRx<T> {
    rx: mpsc::Receiver<Slot<T>>,
}

/// Consumer sends one ping; resolves once the hub's `is_alive` call has
/// taken it. Returns `false` if the hub side has already hung up.
impl LivenessTx {
    pub async fn ping(&self) -> bool {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self
            .tx
            .send(Slot {
                value: (),
                ack: ack_tx,
            })
            .await
            .is_err()
        {
            return false;
        }
        ack_rx.await.is_ok()
    }

    /// Drop this sender to signal the consumer is gone.
    pub fn close(self) {
        drop(self);
    }
}

impl LivenessRx {
    /// Reads one ping. Returns `true` if the consumer is alive, `false` if
    /// the consumer has closed its liveness stream.
    pub async fn is_alive(&mut self) -> bool {
        match self.rx.recv().await {
            Some(slot) => {
                let _ = slot.ack.send(());
                true
            }
            None => false,
        }
    }
}

impl<T> MessageTx<T> {
    /// Sends one payload; resolves once the consumer's `read` call has
    /// taken it. Returns `false` if the consumer has gone away.
    pub async fn send(&self, value: T) -> bool {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Slot { value, ack: ack_tx }).await.is_err() {
            return false;
        }
        ack_rx.await.is_ok()
    }
}

impl<T> MessageRx<T> {
    /// Reads one payload. Returns `None` once the hub has closed this
    /// subscriber's message stream.
    pub async fn read(&mut self) -> Option<T> {
        match self.rx.recv().await {
            Some(slot) => {
                let _ = slot.ack.send(());
                Some(slot.value)
            }
            None => None,
        }
    }
}

/// Builds the hub-held half and the consumer-held half of a subscriber's
/// liveness stream.
pub fn liveness_pair() -> (LivenessTx, LivenessRx) {
    let (tx, rx) = mpsc::channel(1);
    (LivenessTx { tx }, LivenessRx { rx })
}

/// Builds the hub-held half and the consumer-held half of a subscriber's
/// message stream.
pub fn message_pair<T>() -> (MessageTx<T>, MessageRx<T>) {
    let (tx, rx) = mpsc::channel(1);
    (MessageTx { tx }, MessageRx { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ping_then_is_alive_rendezvous() {
        let (tx, mut rx) = liveness_pair();
        let pinger = tokio::spawn(async move { tx.ping().await });
        assert!(rx.is_alive().await);
        assert!(pinger.await.unwrap());
    }

    #[tokio::test]
    async fn closed_liveness_reports_not_alive() {
        let (tx, mut rx) = liveness_pair();
        tx.close();
        assert!(!rx.is_alive().await);
    }

    #[tokio::test]
    async fn send_then_read_rendezvous() {
        let (tx, mut rx) = message_pair::<&'static str>();
        let sender = tokio::spawn(async move { tx.send("hello").await });
        assert_eq!(rx.read().await, Some("hello"));
        assert!(sender.await.unwrap());
    }

    #[tokio::test]
    async fn closed_messages_reads_as_none() {
        let (tx, mut rx) = message_pair::<&'static str>();
        drop(tx);
        assert_eq!(rx.read().await, None);
    }
}
