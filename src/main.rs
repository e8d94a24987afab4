mod api;
mod app;
mod core;
mod domain;
mod hub;

use app::CoreApp;

#[tokio::main]
async fn main() {
    if let Err(e) = CoreApp::run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
