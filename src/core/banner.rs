//! Startup banner.

use super::constants::APP_NAME;

pub fn print_banner(host: &str, port: u16, hub_queue_capacity: usize) {
    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!(
        "  \x1b[32m\u{2794}\x1b[0m  \x1b[1m{:<16}\x1b[0m http://{}:{}",
        "Web UI:", host, port
    );
    println!(
        "  \x1b[90m\u{2794}  {:<16} {}\x1b[0m",
        "Hub queue cap:", hub_queue_capacity
    );
    println!();
}
