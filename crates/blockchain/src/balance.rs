use serde_json::Value;
use shared::models::Balance;
use shared::{Error, Result};
use std::sync::Arc;
use tracing::debug;

use crate::client::RpcCaller;
use crate::types::{BalanceResponse, METHOD_GET_BALANCE};

/// Resolves the native SOL balance of an address
#[derive(Clone)]
pub struct BalanceResolver {
    client: Arc<dyn RpcCaller>,
}

impl BalanceResolver {
    pub fn new(client: Arc<dyn RpcCaller>) -> Self {
        Self { client }
    }

    /// Fetch the balance in lamports and scale it to SOL.
    ///
    /// Remote and transport errors are passed through untouched.
    pub async fn resolve(&self, address: &str) -> Result<Balance> {
        debug!("Fetching SOL balance for address: {}", address);

        let raw = self
            .client
            .call(METHOD_GET_BALANCE, vec![Value::from(address)])
            .await?;

        let response: BalanceResponse = serde_json::from_value(raw)
            .map_err(|e| Error::Transport(format!("Unexpected getBalance result: {}", e)))?;

        let lamports = response.lamports();
        debug!("Retrieved SOL balance: {} lamports", lamports);
        Ok(Balance::from_lamports(lamports))
    }
}
