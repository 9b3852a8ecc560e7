//! Gigdesk CLI - freelance marketplace from the terminal

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "gigdesk")]
#[command(about = "Find work, hire freelancers and manage payments on gigdesk")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Data directory for the stored session and logs
    #[arg(short = 'd', long, global = true, env = "GIGDESK_STATE_DIR")]
    data_dir: Option<PathBuf>,

    /// Configuration file (JSON, TOML or YAML)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// API root, overrides the configuration file
    #[arg(long, global = true, env = "GIGDESK_API_URL")]
    api_url: Option<String>,

    /// Timeout for the whole command in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "60")]
    timeout: u64,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = config::load(cli.config.as_deref(), cli.data_dir, cli.api_url)?;
    logging::init_logging(cli.log_level.into(), &settings.data_dir, cli.no_file_log)?;

    info!(base_url = %settings.base_url, "starting gigdesk");

    if cli.timeout == 0 {
        if let Err(e) = cli.command.execute(settings).await {
            error!("Command failed: {e:#}");
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    } else {
        let timeout_duration = Duration::from_secs(cli.timeout);
        match tokio::time::timeout(timeout_duration, cli.command.execute(settings)).await {
            Ok(Ok(())) => {
                info!("Command completed successfully");
            }
            Ok(Err(e)) => {
                error!("Command failed: {e:#}");
                eprintln!("error: {e:#}");
                std::process::exit(1);
            }
            Err(_) => {
                error!("Command timed out after {} seconds", cli.timeout);
                eprintln!("error: timed out after {} seconds", cli.timeout);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
