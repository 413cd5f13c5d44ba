//! seller-harvest
//!
//! Walks every seller facet of a retail listing page, opens one product per
//! seller, and records the seller's contact data with a durable resume cursor.

mod cli;
mod cmd_data;
mod cmd_run;

use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use harvest_config::{ConfigLoader, LoggingConfig};

use cli::{Cli, Commands};

/// Initialize tracing with console and file output.
///
/// Log files are written to `logging.dir` with daily rotation.
fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&logging.dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("seller-harvest")
        .filename_suffix("log")
        .max_log_files(logging.max_files)
        .build(&logging.dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Flushes the file writer on exit; must outlive the subscriber.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = ConfigLoader::load_or_default(&cli.config)?;

    init_tracing(&config.logging)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => cmd_run::run(config).await,
        Commands::Status => cmd_data::status(&config).await,
        Commands::Export { format, output } => {
            cmd_data::export(&config, format, output.as_deref()).await
        }
        Commands::Show { search } => cmd_data::show(&config, search.as_deref()).await,
        Commands::Clear => cmd_data::clear(&config).await,
        Commands::Config => cmd_data::show_config(&config),
    }
}
