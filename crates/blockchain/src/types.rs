use serde::{Deserialize, Serialize};
use serde_json::Value;

/// SPL token program that owns fungible token accounts
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Number of signatures requested per activity lookup
pub const SIGNATURE_PAGE_SIZE: usize = 10;

pub const METHOD_GET_BALANCE: &str = "getBalance";
pub const METHOD_GET_TOKEN_ACCOUNTS_BY_OWNER: &str = "getTokenAccountsByOwner";
pub const METHOD_GET_SIGNATURES_FOR_ADDRESS: &str = "getSignaturesForAddress";

/// Outgoing JSON-RPC 2.0 request
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: &'a [Value],
}

/// Incoming JSON-RPC 2.0 response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `getBalance` result; older nodes answer with a bare number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BalanceResponse {
    WithContext { value: u64 },
    Bare(u64),
}

impl BalanceResponse {
    pub fn lamports(&self) -> u64 {
        match self {
            BalanceResponse::WithContext { value } => *value,
            BalanceResponse::Bare(value) => *value,
        }
    }
}

/// `getTokenAccountsByOwner` result
#[derive(Debug, Clone, Deserialize)]
pub struct TokenAccountsResponse {
    #[serde(default)]
    pub value: Option<Vec<KeyedAccount>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyedAccount {
    #[serde(default)]
    pub pubkey: Option<String>,
    pub account: Value,
}

/// One entry of the `getSignaturesForAddress` result
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub err: Option<Value>,
}
