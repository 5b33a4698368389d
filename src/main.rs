//! LLM Hub local inference gateway
//!
//! An embedded HTTP server exposing an OpenAI-compatible chat-completion API
//! in front of an on-device language-model runtime, so other devices on the
//! network can talk to locally installed models.

mod api;
mod core;
mod integrity;
mod models;

use crate::api::endpoints::{AppState, create_router};
use crate::core::config::{Config, StaticProvider};
use crate::core::engine::EchoEngine;
use crate::core::logging::init_logging;
use crate::models::catalog::StaticCatalog;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Check for --help flag
    if std::env::args().any(|arg| arg == "--help") {
        print_help();
        return;
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration Error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config.server.log_level);

    // Print startup banner
    print_startup_banner(&config);

    if !config.server.enabled {
        warn!("Server is disabled in configuration (server.enabled = false); exiting");
        return;
    }

    if config.models.is_empty() {
        warn!("No models configured; chat completions will return 404");
    }

    // Create application state
    let app_state = AppState {
        config: Arc::new(StaticProvider::new(&config)),
        catalog: Arc::new(StaticCatalog::new(config.models.clone())),
        engine: Arc::new(EchoEngine::new()),
    };

    // Create router
    let app = create_router(app_state);

    // Bind to address
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Server listening on http://{}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Print startup banner with configuration
fn print_startup_banner(config: &Config) {
    println!("🚀 LLM Hub Local Server v0.1.0");
    println!("✅ Configuration loaded successfully");
    println!("   Server: {}:{}", config.server.host, config.server.port);
    println!("   Enabled: {}", config.server.enabled);
    println!("   Installed models: {}", config.models.len());
    match &config.server.selected_model {
        Some(model) => println!("   Pinned serving model: {}", model),
        None => println!("   Pinned serving model: (none, resolved per request)"),
    }
    println!();
}

/// Print help message
fn print_help() {
    println!("LLM Hub Local Server v0.1.0");
    println!();
    println!("Usage: llmhub-gateway [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --help    Display this help message");
    println!();
    println!("Environment variables:");
    println!("  CONFIG_PATH - Path to the TOML configuration (default: config.toml)");
    println!();
    println!("Configuration ([server] section):");
    println!("  host           - Listen address (default: 0.0.0.0)");
    println!("  port           - Listen port (default: 8080)");
    println!("  enabled        - Whether to serve at all (default: true)");
    println!("  log_level      - Logging level (default: info)");
    println!("  selected_model - Pin the serving model to an installed model name");
    println!();
    println!("Each [[models]] entry declares an installed model:");
    println!("  name, category (text|multimodal|...), source, format (gguf|task|...),");
    println!("  path (optional, enables integrity validation), size_bytes");
    println!();
    println!("Endpoints:");
    println!("  GET  /                    - liveness probe");
    println!("  GET  /v1/models           - installed chat-capable models");
    println!("  POST /v1/chat/completions - OpenAI-compatible chat API");
}
