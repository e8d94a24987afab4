//! Core application: ties configuration, the hub, and the HTTP server
//! together, mirroring the teacher's own `CoreApp`.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::Cli;
use crate::core::config::AppConfig;
use crate::core::constants::ENV_LOG;
use crate::core::shutdown::ShutdownService;
use crate::domain::JobStatus;
use crate::hub::Hub;

pub struct CoreApp {
    pub shutdown: ShutdownService<JobStatus>,
    pub config: Arc<AppConfig>,
    pub hub: Arc<Hub<JobStatus>>,
}

impl CoreApp {
    /// Runs the application with CLI argument parsing — the sole entry
    /// point called from `main`.
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("application starting");

        let cli = Cli::parse();
        let app = Self::init(&cli)?;
        Self::start_server(app).await
    }

    fn init(cli: &Cli) -> Result<Self> {
        let config = Arc::new(AppConfig::load(cli));
        let hub = Arc::new(Hub::new(config.hub_queue_capacity));
        let shutdown = ShutdownService::new(hub.clone());

        Ok(Self {
            shutdown,
            config,
            hub,
        })
    }

    fn init_logging() {
        let default_filter = "info,jobhub=info".to_string();
        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        app.shutdown.install_signal_handlers();

        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            app.config.hub_queue_capacity,
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }
}
