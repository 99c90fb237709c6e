//! aws-gen-config
//!
//! Scrapes the account list from an AWS SSO start page with a real browser
//! and writes an AWS CLI config file containing an SSO profile for every
//! account/role combination.

pub mod browser;
pub mod config;
pub mod render;

use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

use browser::{scrape_accounts, BrowserError, BrowserSession};
use config::GenConfig;

/// Top-level errors surfaced to the CLI
#[derive(Error, Debug)]
pub enum GenError {
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Get log directory path
pub fn log_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("aws-gen-config").join("logs"))
}

/// Initialize logging
pub fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false);

    if let Some(log_dir) = log_dir() {
        let _ = std::fs::create_dir_all(&log_dir);
        let file_appender = tracing_appender::rolling::daily(&log_dir, "aws-gen-config.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(non_blocking);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();

        None
    }
}

/// Scrape the portal and write the generated config.
///
/// The browser is closed before any scrape error propagates, and the output
/// file is only touched after a successful scrape: a timeout leaves any
/// previous file as it was.
pub async fn run(config: &GenConfig) -> Result<(), GenError> {
    let session = BrowserSession::launch(config.browser_config()).await?;

    let scraped = scrape_accounts(&session, &config.start_url).await;
    session.close().await;
    let accounts = scraped?;

    if accounts.is_empty() {
        warn!("No accounts extracted; the generated file will only contain the session stanza");
    }

    let rendered = render::render_config(&accounts, config);
    std::fs::write(&config.output_path, &rendered)?;

    info!(
        "Wrote {} profiles for {} accounts to {}",
        accounts.len() * config.roles.len(),
        accounts.len(),
        config.output_path
    );

    Ok(())
}
