use blockchain::{ActivityResolver, BalanceResolver, NetworkClients, TokenResolver};
use chrono::Utc;
use shared::models::LookupResult;
use shared::{Error, Result};
use storage::PreferenceStore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Trim user input and reject blank addresses before any I/O happens
pub fn validate_address(input: &str) -> Result<String> {
    let address = input.trim();
    if address.is_empty() {
        return Err(Error::Validation("Please enter a wallet address".to_string()));
    }
    Ok(address.to_string())
}

/// Wallet lookup: balance, token holdings and recent activity in one snapshot.
///
/// The three remote queries run as independent tasks against the endpoint of
/// the currently selected network. The lookup is all-or-nothing: the first
/// failing query fails the whole lookup, the remaining tasks are left to
/// finish on their own and their results are dropped. Only successful
/// lookups are recorded in the search history.
#[derive(Clone)]
pub struct LookupService {
    clients: NetworkClients,
    preferences: PreferenceStore,
}

impl LookupService {
    pub fn new(clients: NetworkClients, preferences: PreferenceStore) -> Self {
        Self {
            clients,
            preferences,
        }
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    pub async fn lookup(&self, input: &str) -> Result<LookupResult> {
        let address = validate_address(input)?;
        let network = self.preferences.network_mode();
        let client = self.clients.for_mode(network);

        info!("Looking up {} on {} ({})", address, network, client.endpoint());

        let balance = spawn_resolver({
            let resolver = BalanceResolver::new(client.clone());
            let address = address.clone();
            async move { resolver.resolve(&address).await }
        });
        let tokens = spawn_resolver({
            let resolver = TokenResolver::new(client.clone());
            let address = address.clone();
            async move { resolver.resolve(&address).await }
        });
        let activity = spawn_resolver({
            let resolver = ActivityResolver::new(client);
            let address = address.clone();
            async move { resolver.resolve(&address).await }
        });

        let joined = tokio::try_join!(
            join_resolver("balance", balance),
            join_resolver("tokens", tokens),
            join_resolver("activity", activity),
        );

        let (balance, tokens, activity) = match joined {
            Ok(parts) => parts,
            Err(e) => {
                warn!("Lookup for {} failed: {}", address, e);
                return Err(e);
            }
        };

        self.preferences.add_to_history(&address);

        debug!(
            "Lookup for {} returned {} tokens and {} signatures",
            address,
            tokens.len(),
            activity.len()
        );

        Ok(LookupResult {
            address,
            balance,
            tokens,
            activity,
            network,
            fetched_at: Utc::now(),
        })
    }

    /// Repeat the lookup for the history entry at `index` (0 = most recent)
    pub async fn lookup_from_history(&self, index: usize) -> Result<LookupResult> {
        let address = self
            .preferences
            .search_history()
            .into_iter()
            .nth(index)
            .ok_or_else(|| {
                Error::Validation(format!("No search history entry at position {}", index))
            })?;

        self.lookup(&address).await
    }
}

fn spawn_resolver<T, F>(resolve: F) -> JoinHandle<Result<T>>
where
    T: Send + 'static,
    F: std::future::Future<Output = Result<T>> + Send + 'static,
{
    tokio::spawn(resolve)
}

async fn join_resolver<T>(name: &str, handle: JoinHandle<Result<T>>) -> Result<T> {
    handle
        .await
        .map_err(|e| Error::Internal(format!("{} resolver task failed: {}", name, e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_address_trims() {
        assert_eq!(validate_address("  ABC123\n").unwrap(), "ABC123");
    }

    #[test]
    fn test_validate_address_rejects_blank() {
        assert!(validate_address("").unwrap_err().is_validation());
        assert!(validate_address(" \t\n").unwrap_err().is_validation());
    }
}
