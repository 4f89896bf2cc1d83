use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use labdesk_tui::cli::{self, DatasetArgs};
use labdesk_tui::client::ServiceClient;
use labdesk_tui::config::LabConfig;
use labdesk_tui::logging::{cleanup_old_logs, init_logging, log_system_info, ConsoleMode};
use labdesk_tui::matrix::{Operation, Slot};

const DEFAULT_CONFIG_FILE: &str = "labdesk.toml";

#[derive(Parser)]
#[command(name = "labdesk")]
#[command(about = "Matrix workbench and CSV analysis client for the labdesk computation service")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./labdesk.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the computation service
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive matrix workbench (the default)
    Matrix {
        /// Rows for both grids at startup
        #[arg(long)]
        rows: Option<usize>,

        /// Columns for both grids at startup
        #[arg(long)]
        cols: Option<usize>,
    },

    /// Run a single matrix operation
    Op {
        /// add, subtract, multiply, transpose or determinant
        operation: Operation,

        /// Matrix a unary operation applies to (1 or 2)
        #[arg(long, default_value_t = 1)]
        slot: u8,

        /// First matrix as JSON, e.g. '[[1,2],[3,4]]'
        #[arg(long)]
        matrix1: Option<String>,

        /// Second matrix as JSON
        #[arg(long)]
        matrix2: Option<String>,
    },

    /// Upload a CSV and analyze it
    Dataset {
        /// CSV file to upload
        file: PathBuf,

        /// Column to compute statistics for
        #[arg(long)]
        analyze: Option<String>,

        /// Column to draw a bar chart of
        #[arg(long)]
        bar: Option<String>,

        /// X and Y columns for a scatter plot
        #[arg(long, num_args = 2, value_names = ["X", "Y"])]
        scatter: Option<Vec<String>>,

        /// Correlation heatmap of the numeric columns
        #[arg(long)]
        heatmap: bool,

        /// Ask the service for dataset insights
        #[arg(long)]
        insights: bool,

        /// Directory charts are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Show the effective configuration
    Config {
        /// Write it to this file instead of printing it
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

/// Defaults, then the config file, then `LABDESK_*` variables, then flags
fn load_config(cli: &Cli) -> Result<LabConfig> {
    let mut config = match &cli.config {
        Some(path) => LabConfig::load_from_file(path)?.with_env_overrides(),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            LabConfig::load_from_file(DEFAULT_CONFIG_FILE)?.with_env_overrides()
        }
        None => LabConfig::load_from_env(),
    };

    if let Some(url) = &cli.base_url {
        config.service.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    let command = cli.command.unwrap_or(Commands::Matrix {
        rows: None,
        cols: None,
    });

    let console = match command {
        Commands::Matrix { .. } => ConsoleMode::Silent,
        _ => ConsoleMode::Stderr,
    };
    let _guard = init_logging(&config.logging, console)?;
    log_system_info(&config.service.base_url);
    if config.logging.enable_file_logging {
        match cleanup_old_logs(&config.logging) {
            Ok(removed) if removed > 0 => info!("Removed {} old log files", removed),
            Ok(_) => {}
            Err(e) => warn!("Log cleanup failed: {}", e),
        }
    }

    let client = ServiceClient::http(config.service.base_url.clone())?;

    match command {
        Commands::Matrix { rows, cols } => {
            if let Some(rows) = rows {
                config.grid.default_rows = rows;
            }
            if let Some(cols) = cols {
                config.grid.default_cols = cols;
            }
            run_matrix(&config, client).await?;
        }
        Commands::Op {
            operation,
            slot,
            matrix1,
            matrix2,
        } => {
            let slot = Slot::from_number(slot)?;
            cli::op_command(client, operation, slot, matrix1, matrix2).await?;
        }
        Commands::Dataset {
            file,
            analyze,
            bar,
            scatter,
            heatmap,
            insights,
            out_dir,
        } => {
            let scatter = match scatter.as_deref() {
                Some([x, y]) => Some((x.clone(), y.clone())),
                _ => None,
            };
            let args = DatasetArgs {
                file,
                analyze,
                bar,
                scatter,
                heatmap,
                insights,
                out_dir,
            };
            cli::dataset_command(client, args).await?;
        }
        Commands::Config { write } => {
            cli::config_command(&config, write)?;
        }
    }

    Ok(())
}

#[cfg(feature = "tui")]
async fn run_matrix(config: &LabConfig, client: ServiceClient) -> Result<()> {
    let session = labdesk_tui::matrix::MatrixSession::new(config.grid.default_rows, config.grid.default_cols)?;
    labdesk_tui::tui::run_workbench(session, client).await
}

#[cfg(not(feature = "tui"))]
async fn run_matrix(_config: &LabConfig, _client: ServiceClient) -> Result<()> {
    anyhow::bail!("labdesk was built without the `tui` feature; use `labdesk op` instead")
}
