//! Slashtech marketing site server
//!
//! Entry point: loads configuration, initializes logging and serves the site.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use dotenvy::dotenv;
use slashtech_site::config::{AppConfig, load_genai_settings};
use slashtech_site::{server, telemetry};

#[tokio::main]
async fn main() {
    // Load .env (if present)
    let _ = dotenv();

    let config = match AppConfig::load() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    telemetry::init(config.logging.json);

    let settings = match load_genai_settings() {
        Ok(s) => s,
        Err(msg) => {
            tracing::error!(name: "genai.config.invalid", error = %msg, "Configuration error");
            std::process::exit(1);
        }
    };

    if let Err(e) = server::start_server(config, settings).await {
        tracing::error!(name: "server.failed", error = %e, "Server error");
        std::process::exit(1);
    }
}
