use shared::config::RpcConfig;
use shared::models::NetworkMode;
use shared::Result;
use std::sync::Arc;
use tracing::info;

use crate::client::{JsonRpcClient, RpcCaller};

/// One RPC client per network mode
#[derive(Clone)]
pub struct NetworkClients {
    main: Arc<dyn RpcCaller>,
    dev: Arc<dyn RpcCaller>,
}

impl NetworkClients {
    pub fn new(main: Arc<dyn RpcCaller>, dev: Arc<dyn RpcCaller>) -> Self {
        Self { main, dev }
    }

    /// Build HTTP clients for the configured mainnet and devnet endpoints
    pub fn from_config(config: &RpcConfig) -> Result<Self> {
        let timeout = config.timeout();
        if timeout.is_none() {
            info!("No RPC timeout configured, relying on transport defaults");
        }

        let main = JsonRpcClient::with_timeout(config.endpoint(NetworkMode::Main), timeout)?;
        let dev = JsonRpcClient::with_timeout(config.endpoint(NetworkMode::Dev), timeout)?;

        Ok(Self::new(Arc::new(main), Arc::new(dev)))
    }

    pub fn for_mode(&self, mode: NetworkMode) -> Arc<dyn RpcCaller> {
        match mode {
            NetworkMode::Main => self.main.clone(),
            NetworkMode::Dev => self.dev.clone(),
        }
    }
}
