use anyhow::Context;
use bridge_traits::log::LogLevel;
use clap::{Parser, ValueEnum};
use core_runtime::config::{
    LibraryConfig, DEFAULT_BIND_ADDRESS, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_SERVER_URL,
};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use library_server::{create_router, spawn_event_log};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "library-server")]
#[command(about = "Serves the music library songs, playlists and thumbnails", long_about = None)]
struct Cli {
    /// Directory holding songs.json and playlists.json
    #[arg(long, env = "LIBRARY_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Directory for uploaded thumbnails (defaults to <data-dir>/assets/img)
    #[arg(long, env = "LIBRARY_ASSETS_DIR")]
    assets_dir: Option<PathBuf>,

    /// Socket address to listen on
    #[arg(long, env = "LIBRARY_BIND", default_value = DEFAULT_BIND_ADDRESS)]
    bind: String,

    /// Public base URL of this server
    #[arg(long, env = "LIBRARY_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    server_url: String,

    /// Largest accepted request body in bytes (thumbnails are sent inline)
    #[arg(long, env = "LIBRARY_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: usize,

    #[arg(long, env = "LIBRARY_LOG_LEVEL", value_enum, default_value_t = Level::Info)]
    log_level: Level,

    #[arg(long, env = "LIBRARY_LOG_FORMAT", value_enum)]
    log_format: Option<Format>,

    /// Raw filter directives, overriding the level (e.g. "core_library=debug")
    #[arg(long, env = "RUST_LOG")]
    log_filter: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    Pretty,
    Json,
    Compact,
}

impl From<Format> for LogFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Pretty => LogFormat::Pretty,
            Format::Json => LogFormat::Json,
            Format::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::default().with_level(cli.log_level.into());
    if let Some(format) = cli.log_format {
        logging = logging.with_format(format.into());
    }
    if let Some(filter) = cli.log_filter {
        logging = logging.with_filter(filter);
    }
    init_logging(logging).context("failed to initialise logging")?;

    let mut builder = LibraryConfig::builder()
        .data_dir(cli.data_dir)
        .bind_address(cli.bind)
        .server_url(cli.server_url)
        .max_upload_bytes(cli.max_upload_bytes);
    if let Some(assets_dir) = cli.assets_dir {
        builder = builder.assets_dir(assets_dir);
    }
    let config = builder.build().context("invalid configuration")?;

    let core = core_service::bootstrap_desktop(config)
        .await
        .context("failed to start library core")?;
    spawn_event_log(core.event_bus());
    let app = create_router(&core);

    let address = core.config().bind_address;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    tracing::info!(%address, "Library server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Library server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
