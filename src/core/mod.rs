//! Application shell: CLI, configuration, constants, shutdown, banner.

pub mod banner;
pub mod cli;
pub mod config;
pub mod constants;
pub mod shutdown;
