//! mule-trace command line client.
//!
//! ```text
//! mule-trace check <ID>          one verdict, then wait for the proof to be mined
//! mule-trace batch <FILE>        analyze a CSV file and print the result table
//! mule-trace console             interactive host with login gate
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::BufReader;

use mule_trace::batch::{BatchSettings, BatchWorkflow, CommandClipboard};
use mule_trace::check::{CheckSettings, SingleCheckWorkflow};
use mule_trace::config::{load_config, validation::validate_config, ClientConfig, ConfigError};
use mule_trace::host::render::{render_batch, render_check};
use mule_trace::host::{Console, ConfiguredCredentials, WorkflowHost};
use mule_trace::lifecycle::{signals, Shutdown};
use mule_trace::observability::{logging, metrics};
use mule_trace::HttpGateway;

#[derive(Parser)]
#[command(name = "mule-trace")]
#[command(about = "Fraud checks and batch analysis against a mule-trace backend", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Development mode: log every backend request and response
    #[arg(long, global = true)]
    dev: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a single transaction ID
    Check {
        id: String,
        /// Print the verdict and exit without waiting for mining
        #[arg(long)]
        no_watch: bool,
    },
    /// Analyze a CSV file of transactions
    Batch {
        file: PathBuf,
        /// Copy the hash of this row (1-based) to the clipboard
        #[arg(long)]
        copy: Option<usize>,
    },
    /// Interactive console
    Console,
}

fn resolve_config(cli: &Cli) -> Result<ClientConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if let Some(base_url) = &cli.base_url {
        config.backend.base_url = base_url.clone();
    }
    if cli.dev {
        config.observability.dev_mode = true;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    logging::init_logging(&config.observability);
    tracing::debug!(
        base_url = %config.backend.base_url,
        poll_interval_ms = config.polling.interval_ms,
        dev_mode = config.observability.dev_mode,
        "Configuration loaded"
    );

    let gateway = Arc::new(HttpGateway::new(
        &config.backend,
        config.observability.dev_mode,
    )?);

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    match cli.command {
        Commands::Check { id, no_watch } => {
            run_check(gateway, &config, &id, !no_watch, shutdown).await
        }
        Commands::Batch { file, copy } => run_batch(gateway, &config, &file, copy).await,
        Commands::Console => {
            if config.observability.metrics_enabled {
                match config.observability.metrics_address.parse() {
                    Ok(addr) => metrics::init_metrics(addr),
                    Err(_) => tracing::error!(
                        metrics_address = %config.observability.metrics_address,
                        "Failed to parse metrics address"
                    ),
                }
            }
            if config.auth.password == "CHANGE_ME" {
                tracing::warn!("Using the placeholder login password; set [auth] in the config file");
            }

            let clipboard = Arc::new(CommandClipboard::from_config(
                config.batch.clipboard_command.as_deref(),
            ));
            let auth = ConfiguredCredentials::from_config(&config.auth);
            let host = WorkflowHost::new(gateway, clipboard, &config, auth);

            Console::new(host)
                .run(BufReader::new(tokio::io::stdin()), shutdown)
                .await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_check(
    gateway: Arc<HttpGateway>,
    config: &ClientConfig,
    id: &str,
    watch: bool,
    shutdown: Shutdown,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let tx_url_base = config.explorer.tx_url_base.as_str();
    let workflow = SingleCheckWorkflow::new(gateway, CheckSettings::from_config(config));
    let mut stop = shutdown.subscribe();

    let outcome = tokio::select! {
        outcome = workflow.submit(id) => outcome,
        _ = stop.recv() => return Ok(ExitCode::from(130)),
    };
    print_lines(render_check(&workflow.view(), tx_url_base));
    if outcome.is_err() {
        return Ok(ExitCode::FAILURE);
    }

    if watch && workflow.view().reference().is_some() {
        let mut updates = workflow.subscribe();
        loop {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let view = updates.borrow_and_update().clone();
                    if view.is_mined() {
                        print_lines(render_check(&view, tx_url_base));
                        break;
                    }
                }
                _ = stop.recv() => {
                    eprintln!("Stopped waiting for mining.");
                    break;
                }
            }
        }
    }

    workflow.teardown();
    Ok(ExitCode::SUCCESS)
}

async fn run_batch(
    gateway: Arc<HttpGateway>,
    config: &ClientConfig,
    file: &Path,
    copy: Option<usize>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let clipboard = Arc::new(CommandClipboard::from_config(
        config.batch.clipboard_command.as_deref(),
    ));
    let settings = BatchSettings::from_config(config);
    let preview = settings.hash_preview_chars;
    let workflow = BatchWorkflow::new(gateway, clipboard, settings);

    let outcome = workflow.submit(Some(file)).await;
    print_lines(render_batch(&workflow.view(), preview));
    if outcome.is_err() {
        return Ok(ExitCode::FAILURE);
    }

    if let Some(row) = copy {
        let Some(index) = row.checked_sub(1) else {
            eprintln!("Rows are numbered from 1.");
            return Ok(ExitCode::FAILURE);
        };
        match workflow.copy(index).await {
            Ok(hash) => println!("Copied {hash}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
