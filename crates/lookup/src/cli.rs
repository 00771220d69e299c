use clap::{Parser, Subcommand};
use shared::models::{LookupResult, NetworkMode};
use tracing::info;

use crate::display::{self, EXAMPLE_ADDRESS};
use crate::LookupService;

#[derive(Debug, Parser)]
#[command(name = "wallet-lookup", version, about = "Look up Solana wallet balances, tokens and activity")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch balance, token holdings and recent activity for an address
    Lookup {
        address: String,
        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look up the sample wallet
    Example {
        #[arg(long)]
        json: bool,
    },
    /// Show, re-run or clear recent searches
    History {
        #[arg(long, conflicts_with = "rerun")]
        clear: bool,
        #[arg(long, default_value_t = 5)]
        limit: usize,
        /// Repeat the lookup at this position (0 = most recent)
        #[arg(long)]
        rerun: Option<usize>,
    },
    /// Manage favorite addresses
    Favorites {
        #[command(subcommand)]
        action: Option<FavoriteAction>,
    },
    /// Show or change the network used for lookups
    Network {
        #[arg(long, conflicts_with = "set")]
        toggle: bool,
        #[arg(long)]
        set: Option<NetworkMode>,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavoriteAction {
    List,
    Add { address: String },
    Remove { address: String },
    Toggle { address: String },
}

/// Execute one command and print its output to stdout
pub async fn run(command: Command, service: &LookupService) -> anyhow::Result<()> {
    let preferences = service.preferences();

    match command {
        Command::Lookup { address, json } => {
            let result = service.lookup(&address).await?;
            print_result(&result, json, preferences.is_favorite(&result.address))?;
        }
        Command::Example { json } => {
            let result = service.lookup(EXAMPLE_ADDRESS).await?;
            print_result(&result, json, preferences.is_favorite(&result.address))?;
        }
        Command::History {
            clear,
            limit,
            rerun,
        } => {
            if clear {
                preferences.clear_history();
                println!("Search history cleared");
            } else if let Some(index) = rerun {
                let result = service.lookup_from_history(index).await?;
                print_result(&result, false, preferences.is_favorite(&result.address))?;
            } else {
                let recent = preferences.recent_history(limit);
                if recent.is_empty() {
                    println!("No recent searches");
                }
                for (i, address) in recent.iter().enumerate() {
                    println!("{:>2}  {}", i, display::short(address, 8));
                }
            }
        }
        Command::Favorites { action } => match action.unwrap_or(FavoriteAction::List) {
            FavoriteAction::List => {
                let favorites = preferences.favorites();
                if favorites.is_empty() {
                    println!("No favorites yet");
                }
                for address in favorites {
                    println!("{}", address);
                }
            }
            FavoriteAction::Add { address } => {
                let address = crate::validate_address(&address)?;
                preferences.add_favorite(&address);
                println!("Added {} to favorites", display::short(&address, 8));
            }
            FavoriteAction::Remove { address } => {
                preferences.remove_favorite(address.trim());
                println!("Removed {} from favorites", display::short(address.trim(), 8));
            }
            FavoriteAction::Toggle { address } => {
                let address = crate::validate_address(&address)?;
                if preferences.toggle_favorite(&address) {
                    println!("Added {} to favorites", display::short(&address, 8));
                } else {
                    println!("Removed {} from favorites", display::short(&address, 8));
                }
            }
        },
        Command::Network { toggle, set } => {
            if toggle {
                let mode = preferences.toggle_network_mode();
                info!("Switched network to {}", mode);
            } else if let Some(mode) = set {
                preferences.set_network_mode(mode);
            }
            println!("Network: {}", preferences.network_mode());
        }
    }

    Ok(())
}

fn print_result(result: &LookupResult, json: bool, favorite: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    print!("{}", display::render_lookup(result, chrono::Utc::now().timestamp()));
    if favorite {
        println!("\n* favorite");
    }
    Ok(())
}
