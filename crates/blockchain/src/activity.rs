use serde_json::{json, Value};
use shared::models::ActivityEntry;
use shared::{Error, Result};
use std::sync::Arc;
use tracing::debug;

use crate::client::RpcCaller;
use crate::types::{SignatureInfo, METHOD_GET_SIGNATURES_FOR_ADDRESS, SIGNATURE_PAGE_SIZE};

/// Resolves the most recent transaction signatures of an address
#[derive(Clone)]
pub struct ActivityResolver {
    client: Arc<dyn RpcCaller>,
}

impl ActivityResolver {
    pub fn new(client: Arc<dyn RpcCaller>) -> Self {
        Self { client }
    }

    /// First page of signatures, newest first as reported by the node
    pub async fn resolve(&self, address: &str) -> Result<Vec<ActivityEntry>> {
        debug!("Fetching recent signatures for address: {}", address);

        let raw = self
            .client
            .call(
                METHOD_GET_SIGNATURES_FOR_ADDRESS,
                vec![Value::from(address), json!({ "limit": SIGNATURE_PAGE_SIZE })],
            )
            .await?;

        if raw.is_null() {
            return Ok(Vec::new());
        }

        let signatures: Vec<SignatureInfo> = serde_json::from_value(raw).map_err(|e| {
            Error::Transport(format!("Unexpected getSignaturesForAddress result: {}", e))
        })?;

        let activity: Vec<ActivityEntry> = signatures
            .into_iter()
            .take(SIGNATURE_PAGE_SIZE)
            .map(|info| ActivityEntry {
                succeeded: info.err.is_none(),
                occurred_at: info.block_time,
                signature: info.signature,
            })
            .collect();

        debug!("Retrieved {} signatures", activity.len());
        Ok(activity)
    }
}
