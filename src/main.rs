//! `tsl-stats`: look up TETR.IO league stats for a list of players.
//!
//! ```text
//! tsl-stats [--config stats.toml] [--proxy URL] [--json] [--avatar-dir DIR] [USER...]
//! ```
//!
//! Users come from the arguments, or one per line on stdin when none are
//! given. Ctrl-C stops outstanding lookups and prints what finished.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use tsl_stats::config::{load_config, validate_config, ConfigError, StatsConfig};
use tsl_stats::lifecycle::signals;
use tsl_stats::observability::{logging, metrics};
use tsl_stats::{lookup_all, LookupError, Shutdown, StatsClient, UserRecord};

#[derive(Parser)]
#[command(name = "tsl-stats")]
#[command(about = "Look up TETR.IO rank, TR and 40L records", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Proxy for all upstream requests (overrides the config file)
    #[arg(short, long)]
    proxy: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Download avatars into this directory
    #[arg(long)]
    avatar_dir: Option<PathBuf>,

    /// User names or IDs; read from stdin when omitted
    users: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => StatsConfig::default(),
    };
    if let Some(proxy) = cli.proxy.clone() {
        config.transport.proxy = Some(proxy);
        validate_config(&config).map_err(ConfigError::Validation)?;
    }
    if cli.avatar_dir.is_some() {
        config.batch.avatars = true;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tsl-stats starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let inputs = if cli.users.is_empty() {
        read_stdin_users().await?
    } else {
        cli.users.clone()
    };
    if inputs.is_empty() {
        tracing::warn!("No users given");
        return Ok(ExitCode::SUCCESS);
    }

    let client = Arc::new(StatsClient::from_config(&config)?);
    let shutdown = Shutdown::new();
    tokio::spawn(signals::watch(shutdown.clone()));

    let results = lookup_all(client, inputs.clone(), &config.batch, &shutdown).await;

    if cli.json {
        print_json(&inputs, &results)?;
    } else {
        print_table(&inputs, &results);
    }

    if let Some(dir) = &cli.avatar_dir {
        save_avatars(dir, &results).await?;
    }

    let failed = results.iter().filter(|r| r.is_err()).count();
    tracing::info!(total = results.len(), failed, "Done");
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn read_stdin_users() -> std::io::Result<Vec<String>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut users = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if !line.is_empty() {
            users.push(line.to_string());
        }
    }
    Ok(users)
}

fn print_table(inputs: &[String], results: &[Result<UserRecord, LookupError>]) {
    for (input, result) in inputs.iter().zip(results) {
        match result {
            Ok(r) => println!(
                "{:>3}  {:<16}  {:<3}  {:>10.2}  {}",
                r.index,
                r.display_name(),
                r.rank.as_str().to_uppercase(),
                r.tr,
                r.sprint_display()
            ),
            Err(e) => eprintln!("{input}: {e}"),
        }
    }
}

fn print_json(inputs: &[String], results: &[Result<UserRecord, LookupError>]) -> serde_json::Result<()> {
    let rows: Vec<serde_json::Value> = inputs
        .iter()
        .zip(results)
        .enumerate()
        .map(|(i, (input, result))| match result {
            Ok(record) => serde_json::to_value(record),
            Err(e) => Ok(serde_json::json!({
                "index": i + 1,
                "input": input,
                "error": e.to_string(),
            })),
        })
        .collect::<serde_json::Result<_>>()?;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

async fn save_avatars(dir: &Path, results: &[Result<UserRecord, LookupError>]) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    for record in results.iter().flatten() {
        if let Some(avatar) = &record.avatar {
            let path = dir.join(format!("{}.jpg", record.display_name()));
            tokio::fs::write(&path, avatar).await?;
            tracing::debug!(path = %path.display(), "Avatar saved");
        }
    }
    Ok(())
}
