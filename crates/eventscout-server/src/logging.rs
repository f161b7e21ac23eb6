//! Logging setup for the web server and the stdio MCP subcommands.

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;

/// Stderr logging for foreground commands.
pub fn setup_logging() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,eventscout_server=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// File logging for stdio MCP servers; stdout must stay clean for the
/// protocol. Keep the returned guard alive for the process lifetime.
pub fn setup_file_logging(name: &str) -> Result<WorkerGuard> {
    let log_dir = std::env::temp_dir().join("eventscout").join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, format!("{name}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Ok(guard)
}
