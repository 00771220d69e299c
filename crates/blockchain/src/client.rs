use async_trait::async_trait;
use serde_json::Value;
use shared::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::types::{RpcRequest, RpcResponse};

/// Request ids are unique for the lifetime of the process, across all clients
static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> u64 {
    NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed)
}

/// Anything that can answer a JSON-RPC method call.
///
/// Resolvers depend on this trait rather than on the HTTP client so that the
/// endpoint can be swapped per network or scripted in tests.
#[async_trait]
pub trait RpcCaller: Send + Sync {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value>;

    /// Human readable endpoint description for logs
    fn endpoint(&self) -> &str;
}

/// JSON-RPC 2.0 client over HTTP POST
#[derive(Debug, Clone)]
pub struct JsonRpcClient {
    rpc_url: String,
    http: reqwest::Client,
}

impl JsonRpcClient {
    /// Create a client that relies on the HTTP stack's default timeouts
    pub fn new(rpc_url: impl Into<String>) -> Self {
        let rpc_url = rpc_url.into();
        info!("Initializing JSON-RPC client for {}", rpc_url);

        Self {
            rpc_url,
            http: reqwest::Client::new(),
        }
    }

    /// Create a client whose requests fail with a transport error after `timeout`
    pub fn with_timeout(rpc_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let rpc_url = rpc_url.into();
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            info!("Initializing JSON-RPC client for {} with {:?} timeout", rpc_url, timeout);
            builder = builder.timeout(timeout);
        } else {
            info!("Initializing JSON-RPC client for {}", rpc_url);
        }

        let http = builder
            .build()
            .map_err(|e| Error::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { rpc_url, http })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

#[async_trait]
impl RpcCaller for JsonRpcClient {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        let id = next_request_id();
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params: &params,
        };

        debug!("Sending RPC request {} (id {}) to {}", method, id, self.rpc_url);

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Failed to send RPC request: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read RPC response: {}", e)))?;

        // Rate limits and access errors arrive as non-2xx replies that still carry an error envelope
        let envelope = match serde_json::from_slice::<RpcResponse>(&body) {
            Ok(envelope) if status.is_success() || envelope.error.is_some() => envelope,
            Ok(_) => {
                return Err(Error::Transport(format!(
                    "RPC request failed with status: {}",
                    status
                )))
            }
            Err(e) if status.is_success() => {
                return Err(Error::Transport(format!("Failed to parse RPC response: {}", e)))
            }
            Err(_) => {
                return Err(Error::Transport(format!(
                    "RPC request failed with status: {}",
                    status
                )))
            }
        };

        if let Some(error) = envelope.error {
            let message = error
                .message
                .unwrap_or_else(|| "Unknown error".to_string());
            warn!("RPC {} (id {}) returned error: {}", method, id, message);
            return Err(Error::Remote {
                code: error.code,
                message,
            });
        }

        debug!("RPC {} (id {}) succeeded", method, id);
        Ok(envelope.result.unwrap_or(Value::Null))
    }

    fn endpoint(&self) -> &str {
        &self.rpc_url
    }
}
