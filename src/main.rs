//! Vitrine - render a content-managed site from a headless content store.

mod build;
mod cli;
mod config;
mod document;
mod inspect;
mod logger;
mod pages;
mod render;
mod schema;
mod serve;
mod store;
mod utils;

use anyhow::{Context, Result, bail};
use build::build_site;
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use document::{Fetched, fetch_document};
use serve::serve_site;
use std::path::Path;
use store::{ContentStore, Store};
use tokio::runtime::Runtime;

fn main() {
    if let Err(e) = run() {
        log!("error"; "{e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    if !cli.needs_store() {
        println!("{}", serde_json::to_string_pretty(&schema::all())?);
        return Ok(());
    }

    let config: &'static SiteConfig = Box::leak(Box::new(load_config(cli)?));

    let runtime = Runtime::new().context("Failed to start async runtime")?;
    let store = Store::from_config(&config.store).context("Failed to open content store")?;
    log!("store"; "{}", store.describe());

    match &cli.command {
        Commands::Build { .. } => runtime.block_on(build_site(config, &store)),
        Commands::Serve { .. } => serve_site(config, store, runtime.handle()),
        Commands::Fetch { id } => runtime.block_on(print_document(&store, id)),
        Commands::Images { json } => runtime.block_on(inspect::run(&store, config, *json)),
        Commands::Schema => Ok(()),
    }
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)?
    } else {
        SiteConfig::default()
    };
    config.update_with_cli(cli);
    config.validate(cli)?;

    Ok(config)
}

/// `vitrine fetch <id>`: the typed document as JSON.
async fn print_document<S: ContentStore>(store: &S, id: &str) -> Result<()> {
    match fetch_document(store, id).await? {
        Fetched::Found(doc) => {
            println!("{}", serde_json::to_string_pretty(&doc)?);
            Ok(())
        }
        Fetched::NotFound => bail!("no document with id `{id}`"),
    }
}
