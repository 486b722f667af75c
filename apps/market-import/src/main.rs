//! Market Import Binary
//!
//! Imports one delimited market data file into JSON-lines storage.
//!
//! # Usage
//!
//! ```bash
//! market-import <config.yaml> <input-file>
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter (overrides `logging.level`)
//! - Any variable referenced as `${VAR}` in the config file; a `.env` file in
//!   the current or an ancestor directory is loaded first.

use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, bail};
use market_import::application::importer::Importer;
use market_import::application::parser::ImportInput;
use market_import::config::load_config;
use market_import::domain::messages::SecurityRecord;
use market_import::infrastructure::persistence::{InMemoryBoardProvider, InMemorySecurityRegistry};
use market_import::infrastructure::storage::JsonLinesStorage;
use market_import::observability::init_tracing;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let (config_path, input_path) = parse_args()?;
    let config = load_config(Some(&config_path))
        .with_context(|| format!("loading configuration from {config_path}"))?;
    init_tracing(&config.logging)?;

    tracing::info!(
        config = %config_path,
        input = %input_path,
        schema = %config.import.schema,
        storage = %config.storage.root,
        "Starting market import"
    );

    let settings = config.importer_settings()?;
    let mut fields = config.field_set()?;
    let file = File::open(&input_path).with_context(|| format!("opening {input_path}"))?;
    let input = ImportInput::seekable(file).with_context(|| format!("reading metadata of {input_path}"))?;

    let mut importer = Importer::new(
        Arc::new(InMemorySecurityRegistry::new()),
        Arc::new(InMemoryBoardProvider::new()),
        Arc::new(JsonLinesStorage::new(&config.storage.root)),
        settings,
    )
    .with_security_listener(Box::new(|security: &SecurityRecord, is_new: bool| {
        tracing::debug!(security_id = %security.security_id, is_new, "Security stored");
    }));

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let import_token = cancel.clone();
    let summary = tokio::task::spawn_blocking(move || {
        let mut progress = |percent: u8| tracing::info!(percent, "Import progress");
        importer.import(input, &mut fields, &mut progress, &import_token)
    })
    .await
    .context("import task failed")??;

    let last_time = summary
        .last_time
        .map_or_else(|| "-".to_string(), |t| t.to_rfc3339());
    if summary.cancelled {
        println!("cancelled after {} messages (last time {last_time})", summary.count);
    } else {
        println!("imported {} messages (last time {last_time})", summary.count);
    }
    Ok(())
}

fn parse_args() -> anyhow::Result<(String, String)> {
    let mut args = std::env::args().skip(1);
    match (args.next(), args.next(), args.next()) {
        (Some(config), Some(input), None) => Ok((config, input)),
        _ => bail!("usage: market-import <config.yaml> <input-file>"),
    }
}

/// Cancel the import on Ctrl-C.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, cancelling import");
                cancel.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "Failed to listen for interrupt"),
        }
    });
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
