use clap::Parser;

use super::constants::{ENV_DEBUG, ENV_GOOGLE_ANALYTICS_ID, ENV_HOST, ENV_HUB_QUEUE_CAPACITY, ENV_PORT};

#[derive(Parser)]
#[command(name = "jobhub")]
#[command(version, about = "Real-time job-progress broadcast hub", long_about = None)]
pub struct Cli {
    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Enable debug logging
    #[arg(long, global = true, env = ENV_DEBUG)]
    pub debug: bool,

    /// Google Analytics measurement id, included in rendered pages when
    /// running in production
    #[arg(long, global = true, env = ENV_GOOGLE_ANALYTICS_ID)]
    pub google_analytics_id: Option<String>,

    /// Command queue capacity for the hub dispatcher
    #[arg(long, global = true, env = ENV_HUB_QUEUE_CAPACITY)]
    pub hub_queue_capacity: Option<usize>,
}
