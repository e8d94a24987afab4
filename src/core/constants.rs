//! Named constants for configuration defaults and environment variable keys.

pub const APP_NAME: &str = "jobhub";

// === Environment variable keys ===
pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_APP_ENV: &str = "APP_ENV";
pub const ENV_DEBUG: &str = "DEBUG";
pub const ENV_GOOGLE_ANALYTICS_ID: &str = "GOOGLE_ANALYTICS_ID";
pub const ENV_HUB_QUEUE_CAPACITY: &str = "HUB_QUEUE_CAPACITY";
pub const ENV_LOG: &str = "JOBHUB_LOG";

// === Defaults ===
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8081;
pub const DEFAULT_APP_ENV: &str = "development";
pub const DEFAULT_HUB_QUEUE_CAPACITY: usize = 100;

// === Shutdown ===
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;
