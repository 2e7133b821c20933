//! NGOConnect CLI
//!
//! Thin front end over the client core:
//! 1. Loads config and the persisted session
//! 2. Builds the secure client (bearer injection + coordinated refresh)
//! 3. Runs one command and prints its JSON result to stdout
//!
//! Logs go to stderr as JSON so stdout stays machine-readable.

mod cli;
mod commands;
mod config;
mod error;

use anyhow::{Context, Result};
use clap::Parser;
use secure_client::{LoginRedirect, Navigation, SecureClient};
use session::SessionStore;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    let config_path = Config::resolve_path(cli.config.as_deref());
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        base_url = %config.api.base_url,
        timeout_secs = config.api.timeout_secs,
        persistent_session = config.session.path.is_some(),
        "configuration loaded"
    );

    let store = match &config.session.path {
        Some(path) => SessionStore::load(path.clone())
            .await
            .with_context(|| format!("failed to load session from {}", path.display()))?,
        None => SessionStore::in_memory(),
    };

    let navigator = Arc::new(LoginRedirect::new(config.api.login_redirect.clone()));
    let mut navigation = navigator.subscribe();

    let client = SecureClient::builder(config.api.base_url.clone(), Arc::new(store))
        .refresh_path(config.api.refresh_path.clone())
        .timeout(config.timeout())
        .navigator(navigator)
        .build()
        .context("failed to build API client")?;
    let api = api::Api::new(client, config.timeout())
        .context("failed to build API client")?
        .login_path(config.api.login_path.clone());

    let outcome = commands::run(&api, cli.command).await;

    if let Ok(Navigation::Login { path }) = navigation.try_recv() {
        warn!(path = %path, "session ended during this command");
    }

    let value = outcome?;
    let rendered = serde_json::to_string_pretty(&value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}
