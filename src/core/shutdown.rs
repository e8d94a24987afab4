//! Centralized shutdown management, adapted from the teacher's own
//! `ShutdownService`: here there is only one subsystem to drain — the hub's
//! dispatcher — since there is no database or analytics layer to checkpoint.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use super::constants::SHUTDOWN_TIMEOUT_SECS;
use crate::hub::Hub;

#[derive(Clone)]
pub struct ShutdownService<T> {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
    hub: Arc<Hub<T>>,
}

impl<T> ShutdownService<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(hub: Arc<Hub<T>>) -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
            handles: Arc::new(Mutex::new(Vec::new())),
            hub,
        }
    }

    /// Register a background task handle to be awaited during shutdown.
    pub async fn register(&self, handle: JoinHandle<()>) {
        self.handles.lock().await.push(handle);
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.rx.clone()
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Triggers shutdown and waits for registered background tasks, then
    /// drains the hub's dispatcher.
    pub async fn shutdown(&self) {
        tracing::debug!("initiating graceful shutdown...");
        self.trigger();

        let handles = std::mem::take(&mut *self.handles.lock().await);
        let task_count = handles.len();
        tracing::debug!(count = task_count, "waiting for background tasks to finish...");

        let timeout = Duration::from_secs(SHUTDOWN_TIMEOUT_SECS);
        match tokio::time::timeout(timeout, futures::future::join_all(handles)).await {
            Ok(_) => tracing::debug!("all background tasks completed"),
            Err(_) => tracing::warn!(
                timeout_secs = timeout.as_secs(),
                "timeout waiting for background tasks"
            ),
        }

        tracing::debug!("shutting down hub dispatcher...");
        self.hub.shutdown().await;

        tracing::debug!("shutdown complete");
    }

    pub fn wait(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.rx.clone();
        async move {
            let _ = rx.wait_for(|&v| v).await;
        }
    }

    /// Installs Ctrl+C/SIGTERM handlers that auto-trigger shutdown.
    pub fn install_signal_handlers(&self) {
        let service = self.clone();
        tokio::spawn(async move {
            let ctrl_c = async {
                tokio::signal::ctrl_c()
                    .await
                    .expect("failed to install Ctrl+C handler");
            };

            #[cfg(unix)]
            let terminate = async {
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("failed to install SIGTERM handler")
                    .recv()
                    .await;
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => tracing::debug!("received Ctrl+C, shutting down"),
                _ = terminate => tracing::debug!("received SIGTERM, shutting down"),
            }

            service.trigger();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_shutdown() -> ShutdownService<String> {
        let hub = Arc::new(Hub::<String>::new(16));
        ShutdownService::new(hub)
    }

    #[tokio::test]
    async fn not_triggered_initially() {
        let shutdown = make_shutdown();
        assert!(!shutdown.is_triggered());
    }

    #[tokio::test]
    async fn trigger_flips_flag() {
        let shutdown = make_shutdown();
        shutdown.trigger();
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn wait_returns_after_trigger() {
        let shutdown = make_shutdown();
        let wait_future = shutdown.wait();
        let handle = tokio::spawn(wait_future);

        tokio::task::yield_now().await;
        shutdown.trigger();

        tokio::time::timeout(Duration::from_millis(100), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn subscriber_receives_shutdown() {
        let shutdown = make_shutdown();
        let rx = shutdown.subscribe();
        assert!(!*rx.borrow());
        shutdown.trigger();
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn shutdown_drains_hub() {
        let hub = Arc::new(Hub::<String>::new(16));
        hub.create_topic("job:1").await.unwrap();
        let shutdown = ShutdownService::new(hub.clone());
        shutdown.shutdown().await;
        assert!(hub.list_topics().await.is_empty());
    }
}
