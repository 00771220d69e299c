use anyhow::{Context, Result};
use blockchain::NetworkClients;
use clap::Parser;
use directories::ProjectDirs;
use lookup::cli::{self, Cli};
use lookup::{logging, LookupService};
use shared::config::Config;
use std::sync::Arc;
use storage::{FileStore, KeyValueStore, PreferenceStore, RedisStore};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let config = Config::from_env()?;
    logging::init(config.logging.format);
    tracing::debug!("Configuration loaded successfully");

    let backend = open_backend(&config).await?;
    let preferences = PreferenceStore::load(backend).await;

    let clients = NetworkClients::from_config(&config.rpc)?;
    let service = LookupService::new(clients, preferences.clone());

    let outcome = cli::run(args.command, &service).await;

    // Durability is checked once, right before exit
    if let Err(e) = preferences.flush().await {
        tracing::error!("Preferences were not saved: {}", e);
    }

    outcome
}

async fn open_backend(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    if let Some(url) = &config.storage.redis_url {
        let store = RedisStore::new(url, "wallet-lookup").await?;
        tracing::info!("Using Redis preference store");
        return Ok(Arc::new(store));
    }

    let dir = match &config.storage.data_dir {
        Some(dir) => dir.clone(),
        None => ProjectDirs::from("io", "wallet-lookup", "wallet-lookup")
            .context("Could not determine a data directory; set WALLET_DATA_DIR")?
            .data_dir()
            .to_path_buf(),
    };

    let store = FileStore::open(&dir).await?;
    tracing::debug!("Using preference store at {}", store.dir().display());
    Ok(Arc::new(store))
}
