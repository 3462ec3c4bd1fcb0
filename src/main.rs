//! Glucotrack: diabetes-risk prediction client
//!
//! Main entry point for the terminal application.

use anyhow::{Context, Result};
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use glucotrack::adapters::sanitize::SanitizingMakeWriter;
use glucotrack::config::ClientConfig;
use glucotrack::tui::App;

fn main() -> Result<()> {
    // Logs written to the terminal would corrupt the TUI's alternate screen:
    // an interactive TTY logs to a file, anything else to stdout.
    let log_mode = std::env::var("GLUCOTRACK_LOG_MODE").unwrap_or_else(|_| "auto".to_string());

    let interactive = std::io::stdout().is_terminal();
    let use_file = match log_mode.as_str() {
        "file" => true,
        "stdout" => false,
        _ => interactive,
    };

    let (writer, _guard) = if use_file {
        let log_file =
            std::env::var("GLUCOTRACK_LOG_FILE").unwrap_or_else(|_| "glucotrack.log".to_string());

        if let Some(parent) = std::path::Path::new(&log_file).parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .with_context(|| format!("Failed to open log file {log_file}"))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(
        "Starting Glucotrack against {}{}",
        config.base_url,
        config.endpoints.prefix()
    );

    let mut app = App::new(config)?;
    app.run()?;

    tracing::info!("Glucotrack shutdown complete.");
    Ok(())
}
