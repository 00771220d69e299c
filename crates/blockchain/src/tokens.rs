use anyhow::Context;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use shared::models::TokenHolding;
use shared::{Error, Result};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::client::RpcCaller;
use crate::types::{KeyedAccount, TokenAccountsResponse, METHOD_GET_TOKEN_ACCOUNTS_BY_OWNER, TOKEN_PROGRAM_ID};

/// Resolves the fungible token holdings of an address
#[derive(Clone)]
pub struct TokenResolver {
    client: Arc<dyn RpcCaller>,
}

impl TokenResolver {
    pub fn new(client: Arc<dyn RpcCaller>) -> Self {
        Self { client }
    }

    /// Get every SPL token account owned by `address` with a positive balance.
    ///
    /// Entries keep the order the node returned them in. One entry is produced
    /// per token account, so a mint held in two accounts shows up twice.
    pub async fn resolve(&self, address: &str) -> Result<Vec<TokenHolding>> {
        debug!("Fetching token accounts for address: {}", address);

        let raw = self
            .client
            .call(
                METHOD_GET_TOKEN_ACCOUNTS_BY_OWNER,
                vec![
                    Value::from(address),
                    json!({ "programId": TOKEN_PROGRAM_ID }),
                    json!({ "encoding": "jsonParsed" }),
                ],
            )
            .await?;

        if raw.is_null() {
            return Ok(Vec::new());
        }

        let response: TokenAccountsResponse = serde_json::from_value(raw).map_err(|e| {
            Error::Transport(format!("Unexpected getTokenAccountsByOwner result: {}", e))
        })?;

        let mut holdings = Vec::new();

        for account in response.value.unwrap_or_default() {
            match parse_token_holding(&account) {
                Ok(holding) if holding.amount > Decimal::ZERO => holdings.push(holding),
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        "Failed to parse token account {}: {:#}",
                        account.pubkey.as_deref().unwrap_or("<unknown>"),
                        e
                    );
                    continue;
                }
            }
        }

        debug!("Retrieved {} token holdings", holdings.len());
        Ok(holdings)
    }
}

/// Extract mint and UI amount from a `jsonParsed` token account
fn parse_token_holding(account: &KeyedAccount) -> anyhow::Result<TokenHolding> {
    let info = account
        .account
        .pointer("/data/parsed/info")
        .ok_or_else(|| anyhow::anyhow!("Missing info field"))?;

    let mint = info
        .get("mint")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing mint field"))?
        .to_string();

    let token_amount = info
        .get("tokenAmount")
        .ok_or_else(|| anyhow::anyhow!("Missing tokenAmount field"))?;

    let amount = match token_amount.get("uiAmountString").and_then(|v| v.as_str()) {
        Some(ui_amount) => Decimal::from_str(ui_amount).context("Failed to parse uiAmountString")?,
        None => match token_amount.get("uiAmount") {
            Some(Value::Number(n)) => n
                .as_f64()
                .and_then(Decimal::from_f64)
                .ok_or_else(|| anyhow::anyhow!("Unrepresentable uiAmount: {}", n))?,
            Some(Value::Null) | None => Decimal::ZERO,
            Some(other) => anyhow::bail!("Unexpected uiAmount: {}", other),
        },
    };

    Ok(TokenHolding { mint, amount })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedRpc;

    fn token_account(pubkey: &str, mint: &str, ui_amount: f64, ui_amount_string: &str) -> Value {
        json!({
            "pubkey": pubkey,
            "account": {
                "data": {
                    "program": "spl-token",
                    "parsed": {
                        "type": "account",
                        "info": {
                            "mint": mint,
                            "owner": "ABC123",
                            "tokenAmount": {
                                "amount": "0",
                                "decimals": 6,
                                "uiAmount": ui_amount,
                                "uiAmountString": ui_amount_string
                            }
                        }
                    },
                    "space": 165
                },
                "executable": false,
                "lamports": 2039280,
                "owner": TOKEN_PROGRAM_ID
            }
        })
    }

    #[tokio::test]
    async fn test_resolve_drops_zero_amounts() {
        let rpc = Arc::new(ScriptedRpc::new().answer(
            METHOD_GET_TOKEN_ACCOUNTS_BY_OWNER,
            json!({
                "context": {"slot": 1},
                "value": [
                    token_account("acc1", "MintZero", 0.0, "0"),
                    token_account("acc2", "MintHeld", 12.5, "12.5"),
                ]
            }),
        ));
        let resolver = TokenResolver::new(rpc.clone());

        let holdings = resolver.resolve("ABC123").await.unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].mint, "MintHeld");
        assert_eq!(holdings[0].amount, Decimal::new(125, 1));

        let calls = rpc.calls();
        assert_eq!(
            calls[0].1,
            vec![
                json!("ABC123"),
                json!({"programId": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"}),
                json!({"encoding": "jsonParsed"}),
            ]
        );
    }

    #[tokio::test]
    async fn test_resolve_null_result_is_empty() {
        let rpc = Arc::new(ScriptedRpc::new().answer(METHOD_GET_TOKEN_ACCOUNTS_BY_OWNER, Value::Null));
        let resolver = TokenResolver::new(rpc);
        assert!(resolver.resolve("ABC123").await.unwrap().is_empty());

        let rpc = Arc::new(
            ScriptedRpc::new().answer(METHOD_GET_TOKEN_ACCOUNTS_BY_OWNER, json!({"value": null})),
        );
        let resolver = TokenResolver::new(rpc);
        assert!(resolver.resolve("ABC123").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_keeps_remote_order_and_duplicate_mints() {
        let rpc = Arc::new(ScriptedRpc::new().answer(
            METHOD_GET_TOKEN_ACCOUNTS_BY_OWNER,
            json!({
                "value": [
                    token_account("acc1", "MintB", 3.0, "3"),
                    token_account("acc2", "MintA", 1.0, "1"),
                    token_account("acc3", "MintB", 2.0, "2"),
                ]
            }),
        ));
        let resolver = TokenResolver::new(rpc);

        let mints: Vec<String> = resolver
            .resolve("ABC123")
            .await
            .unwrap()
            .into_iter()
            .map(|h| h.mint)
            .collect();
        assert_eq!(mints, vec!["MintB", "MintA", "MintB"]);
    }

    #[tokio::test]
    async fn test_resolve_skips_unparsable_accounts() {
        let rpc = Arc::new(ScriptedRpc::new().answer(
            METHOD_GET_TOKEN_ACCOUNTS_BY_OWNER,
            json!({
                "value": [
                    {"pubkey": "raw", "account": {"data": ["AAAA", "base64"]}},
                    token_account("acc2", "MintHeld", 4.0, "4"),
                ]
            }),
        ));
        let resolver = TokenResolver::new(rpc);

        let holdings = resolver.resolve("ABC123").await.unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].mint, "MintHeld");
    }

    #[test]
    fn test_parse_falls_back_to_ui_amount() {
        let account: KeyedAccount = serde_json::from_value(json!({
            "pubkey": "acc",
            "account": {"data": {"parsed": {"info": {
                "mint": "Mint",
                "tokenAmount": {"amount": "2500000", "decimals": 6, "uiAmount": 2.5}
            }}}}
        }))
        .unwrap();

        let holding = parse_token_holding(&account).unwrap();
        assert_eq!(holding.amount, Decimal::new(25, 1));
    }
}
