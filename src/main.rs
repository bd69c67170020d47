//! Runs the server.
//!
//! Usage: `rawhttp [CONFIG.json]`. Without a file the server listens on
//! 127.0.0.1:4444 with the default routes. Log level comes from `RUST_LOG`.

use std::env;
use std::process::ExitCode;

use log::error;
use rawhttp::{HttpServer, ServerConfig};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match env::args().nth(1) {
        Some(path) => match ServerConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load configuration from {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => ServerConfig::default(),
    };

    let server = HttpServer::new(config);
    match server.start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server error: {e}");
            ExitCode::FAILURE
        }
    }
}
