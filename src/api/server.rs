//! API server initialization: builds the axum `Router` and binds it.

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::app::CoreApp;

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Returns the `CoreApp` back so the caller can join any remaining
    /// background tasks after the listener shuts down.
    pub async fn start(self) -> Result<CoreApp> {
        let Self { app } = self;

        let shutdown = app.shutdown.clone();
        let host = app.config.server.host.clone();
        let port = app.config.server.port;
        let addr = SocketAddr::new(host.parse()?, port);

        let router = Router::new()
            .merge(routes::router(app.hub.clone(), app.config.clone()))
            .fallback(routes::handle_404)
            .layer(CompressionLayer::new())
            .layer(TraceLayer::new_for_http());

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "listening");
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}
