// Copyright 2026 The Chat Relay Project
// SPDX-License-Identifier: Apache-2.0

use chat_relay::config;
use chat_relay::engine;
use chat_relay::proxy;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chat-relay", about = "Streaming chat relay for the Anthropic Messages API")]
struct Cli {
    /// Path to the chat-relay.yaml config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, env = "CHAT_RELAY_CONFIG")]
    config: String,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "CHAT_RELAY_HOST")]
    host: IpAddr,

    /// Port to listen on
    #[arg(long, default_value_t = 8787, env = "CHAT_RELAY_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .json()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let addr = SocketAddr::new(cli.host, cli.port);
    tracing::info!(%addr, "chat-relay starting");

    let source = config::FileSource {
        path: std::path::PathBuf::from(&cli.config),
    };
    let config = match config::load_config(&source) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!(path = %cli.config, "failed to load config: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        environment = %config.environment,
        model = %config.model.name,
        base_url = %config.upstream.base_url,
        config_hash = %config.config_hash,
        "config loaded"
    );
    if config.upstream.api_key.is_empty() {
        tracing::warn!("upstream api_key is empty; every chat request will fail upstream");
    }

    let upstream: Arc<dyn proxy::UpstreamClient> = match engine::build_engine_client(config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!("failed to build upstream client: {e}");
            std::process::exit(1);
        }
    };

    let app = proxy::build_router(upstream);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%addr, "failed to bind: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, "chat-relay listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
        std::process::exit(1);
    }
}
