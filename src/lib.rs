pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::providers::StoreKind;
use anyhow::Result;
use tracing::{debug, info};

/// Queries the application can run against a rate store.
#[derive(Debug, Clone)]
pub enum AppCommand {
    Rate {
        from: String,
        to: String,
        date: Option<String>,
    },
    Month {
        from: String,
        to: String,
        year: i32,
        month: u32,
    },
}

/// Resolves config and store, runs the command and returns its rendered output.
pub async fn execute(
    command: AppCommand,
    config_path: Option<&str>,
    store_name: Option<&str>,
) -> Result<String> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let kind: StoreKind = store_name.unwrap_or(config.store.as_str()).parse()?;
    let store = providers::build_store(kind, &config)?;

    match command {
        AppCommand::Rate { from, to, date } => {
            let date = match date {
                Some(value) => cli::rate::parse_date(&value)?,
                None => cli::rate::default_date(),
            };
            cli::rate::rate_report(store.as_ref(), &from, &to, date).await
        }
        AppCommand::Month {
            from,
            to,
            year,
            month,
        } => cli::month::month_report(store.as_ref(), &from, &to, year, month).await,
    }
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    store_name: Option<&str>,
) -> Result<()> {
    info!("Exchange rates starting...");
    let output = execute(command, config_path, store_name).await?;
    println!("{output}");
    Ok(())
}
