use crate::models::NetworkMode;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAINNET_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub rpc: RpcConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    pub mainnet_url: String,
    pub devnet_url: String,
    /// Per-request timeout; `None` keeps the HTTP client's default (no timeout)
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory for the file-backed preference store
    pub data_dir: Option<PathBuf>,
    /// When set, preferences are kept in Redis instead of on disk
    pub redis_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            mainnet_url: DEFAULT_MAINNET_RPC_URL.to_string(),
            devnet_url: DEFAULT_DEVNET_RPC_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl RpcConfig {
    pub fn endpoint(&self, mode: NetworkMode) -> &str {
        match mode {
            NetworkMode::Main => &self.mainnet_url,
            NetworkMode::Dev => &self.devnet_url,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let format = match env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "pretty".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            other => anyhow::bail!("Unsupported LOG_FORMAT: {}", other),
        };

        Ok(Config {
            rpc: RpcConfig {
                mainnet_url: env::var("SOLANA_MAINNET_RPC_URL")
                    .unwrap_or_else(|_| DEFAULT_MAINNET_RPC_URL.to_string()),
                devnet_url: env::var("SOLANA_DEVNET_RPC_URL")
                    .unwrap_or_else(|_| DEFAULT_DEVNET_RPC_URL.to_string()),
                timeout_secs: env::var("RPC_TIMEOUT_SECS")
                    .ok()
                    .map(|v| v.parse())
                    .transpose()?,
            },
            storage: StorageConfig {
                data_dir: env::var_os("WALLET_DATA_DIR").map(PathBuf::from),
                redis_url: env::var("PREFERENCES_REDIS_URL").ok(),
            },
            logging: LoggingConfig { format },
        })
    }
}
