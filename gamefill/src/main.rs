//! gamefill - games table enrichment
//!
//! Loads the games dataset, fills missing completion time, release year and
//! review score cells from HowLongToBeat, and saves the filled cells back.
//!
//! Only failing to load or save the dataset aborts a run; every per-row
//! problem ends in a not-found cell and a logged reason.

use anyhow::{Context, Result};
use clap::Parser;
use gamefill::db::{init_database_pool, load_table, save_table, TableLayout};
use gamefill::{HltbClient, TableUpdater, TracingSink, UpdateOptions};
use gamefill_common::config::{
    load_toml_config, resolve_config_path, resolve_dataset_path, write_toml_config, TomlConfig,
};
use gamefill_common::logging::init_tracing;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "gamefill", version, about = "Fill missing game details in a games table")]
struct Cli {
    /// SQLite dataset to enrich (overrides GAMEFILL_DATASET and the config file)
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Config file (overrides GAMEFILL_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum lookups in flight
    #[arg(long)]
    concurrency: Option<usize>,

    /// Re-query cells previous runs marked as not found
    #[arg(long, default_value_t = false)]
    retry_not_found: bool,

    /// Enrich but do not save
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Log level or filter directive
    #[arg(long)]
    log_level: Option<String>,

    /// Write the effective configuration to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config.as_deref());
    let (mut config, config_problem) = match config_path.as_deref().map(load_toml_config) {
        Some(Ok(config)) => (config, None),
        Some(Err(e)) => (TomlConfig::default(), Some(e)),
        None => (TomlConfig::default(), None),
    };

    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(concurrency) = cli.concurrency {
        config.enrich.concurrency = concurrency;
    }
    if cli.retry_not_found {
        config.enrich.retry_not_found = true;
    }

    init_tracing(&config.logging)?;

    info!("Starting gamefill {}", env!("CARGO_PKG_VERSION"));
    match (&config_path, config_problem) {
        (Some(path), None) => info!("Config: {}", path.display()),
        (_, Some(e)) => warn!("{}; using defaults", e),
        (None, None) => info!("No config file found, using defaults"),
    }

    config.validate()?;

    if let Some(path) = cli.write_config {
        write_toml_config(&config, &path)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        info!("Configuration written to {}", path.display());
        return Ok(());
    }

    let dataset = resolve_dataset_path(cli.dataset.as_deref(), &config);
    info!("Dataset: {}", dataset.display());

    let pool = init_database_pool(&dataset)
        .await
        .with_context(|| format!("Failed to open dataset {}", dataset.display()))?;

    let layout = TableLayout::from(&config.table);
    let mut table = load_table(&pool, &layout)
        .await
        .with_context(|| format!("Failed to load table '{}'", layout.table))?;

    let lookup = HltbClient::from_config(&config.lookup)
        .context("Failed to create HowLongToBeat client")?;
    let updater = TableUpdater::new(
        Arc::new(lookup),
        Arc::new(TracingSink),
        UpdateOptions::from(&config),
    );

    let summary = updater.update(&mut table).await;
    info!(
        selected = summary.rows_selected,
        processed = summary.rows_processed,
        found = summary.fields_found,
        not_found = summary.fields_not_found,
        invalid_titles = summary.invalid_titles,
        lookup_failures = summary.lookup_failures,
        no_matches = summary.no_matches,
        "Update complete"
    );

    if cli.dry_run {
        info!("Dry run: dataset left unchanged");
    } else {
        let cells = save_table(&pool, &layout, &table)
            .await
            .with_context(|| format!("Failed to save dataset {}", dataset.display()))?;
        info!("Saved {} cells to {}", cells, dataset.display());
    }

    pool.close().await;
    Ok(())
}
