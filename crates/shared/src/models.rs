use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest-unit amount per whole SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Decimal places implied by `LAMPORTS_PER_SOL`
pub const SOL_DECIMALS: u32 = 9;

/// Upper bound on remembered searches
pub const MAX_HISTORY: usize = 20;

/// Opaque account identifier, compared by exact string match
pub type Address = String;

// Balance models
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance(Decimal);

impl Balance {
    /// Convert a lamport amount into SOL without any rounding
    pub fn from_lamports(lamports: u64) -> Self {
        Self(Decimal::from_i128_with_scale(lamports as i128, SOL_DECIMALS))
    }

    pub fn sol(&self) -> Decimal {
        self.0
    }

    pub fn lamports(&self) -> u64 {
        (self.0 * Decimal::from(LAMPORTS_PER_SOL))
            .trunc()
            .to_u64()
            .unwrap_or(u64::MAX)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

// Token models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenHolding {
    pub mint: Address,
    pub amount: Decimal,
}

// Activity models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub signature: String,
    /// Unix seconds; `None` while the transaction is unconfirmed
    pub occurred_at: Option<i64>,
    pub succeeded: bool,
}

impl ActivityEntry {
    pub fn is_pending(&self) -> bool {
        self.occurred_at.is_none()
    }

    pub fn occurred_at_utc(&self) -> Option<DateTime<Utc>> {
        self.occurred_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
    }
}

// Lookup models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    pub address: Address,
    pub balance: Balance,
    pub tokens: Vec<TokenHolding>,
    pub activity: Vec<ActivityEntry>,
    pub network: NetworkMode,
    pub fetched_at: DateTime<Utc>,
}

// Preference models
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    #[default]
    Main,
    Dev,
}

impl NetworkMode {
    pub fn toggled(self) -> Self {
        match self {
            NetworkMode::Main => NetworkMode::Dev,
            NetworkMode::Dev => NetworkMode::Main,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkMode::Main => "main",
            NetworkMode::Dev => "dev",
        }
    }
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main" | "mainnet" | "mainnet-beta" => Ok(NetworkMode::Main),
            "dev" | "devnet" => Ok(NetworkMode::Dev),
            other => Err(format!("Unknown network mode: {}", other)),
        }
    }
}

/// Persisted user preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferenceState {
    /// Most recent first, unique, at most `MAX_HISTORY` entries
    pub search_history: Vec<Address>,
    /// Unique, newest first
    pub favorites: Vec<Address>,
    pub network_mode: NetworkMode,
}

impl PreferenceState {
    /// Restore the history and favorites invariants on a document of unknown origin
    pub fn normalized(mut self) -> Self {
        dedup_in_order(&mut self.search_history);
        self.search_history.truncate(MAX_HISTORY);
        dedup_in_order(&mut self.favorites);
        self
    }
}

fn dedup_in_order(items: &mut Vec<Address>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_from_lamports_is_exact() {
        let balance = Balance::from_lamports(5_000_000_000);
        assert_eq!(balance.sol(), Decimal::from(5));

        let dust = Balance::from_lamports(1);
        assert_eq!(dust.sol(), Decimal::new(1, 9));
        assert_eq!(dust.lamports(), 1);
    }

    #[test]
    fn test_amounts_serialize_as_exact_strings() {
        let balance = Balance::from_lamports(12_345_678_123_456_789);
        assert_eq!(
            serde_json::to_value(balance).unwrap(),
            serde_json::json!("12345678.123456789")
        );

        let holding = TokenHolding {
            mint: "Mint".to_string(),
            amount: Decimal::new(123_456_789_012_345_678, 9),
        };
        assert_eq!(
            serde_json::to_value(&holding).unwrap()["amount"],
            serde_json::json!("123456789.012345678")
        );
    }

    #[test]
    fn test_balance_round_trips_large_amounts() {
        let balance = Balance::from_lamports(u64::MAX);
        assert_eq!(balance.lamports(), u64::MAX);
    }

    #[test]
    fn test_balance_display_drops_trailing_zeros() {
        assert_eq!(Balance::from_lamports(1_500_000_000).to_string(), "1.5");
    }

    #[test]
    fn test_network_mode_toggle() {
        assert_eq!(NetworkMode::Main.toggled(), NetworkMode::Dev);
        assert_eq!(NetworkMode::Dev.toggled(), NetworkMode::Main);
        assert_eq!(NetworkMode::Main.toggled().toggled(), NetworkMode::Main);
    }

    #[test]
    fn test_network_mode_parse() {
        assert_eq!("devnet".parse::<NetworkMode>().unwrap(), NetworkMode::Dev);
        assert_eq!("MAIN".parse::<NetworkMode>().unwrap(), NetworkMode::Main);
        assert!("testnet".parse::<NetworkMode>().is_err());
    }

    #[test]
    fn test_activity_entry_pending() {
        let pending = ActivityEntry {
            signature: "sig".to_string(),
            occurred_at: None,
            succeeded: true,
        };
        assert!(pending.is_pending());
        assert!(pending.occurred_at_utc().is_none());

        let confirmed = ActivityEntry {
            occurred_at: Some(1_700_000_000),
            ..pending
        };
        assert_eq!(
            confirmed.occurred_at_utc().unwrap().timestamp(),
            1_700_000_000
        );
    }

    #[test]
    fn test_preference_state_serialized_shape() {
        let state = PreferenceState {
            search_history: vec!["A".to_string()],
            favorites: vec!["B".to_string()],
            network_mode: NetworkMode::Dev,
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "searchHistory": ["A"],
                "favorites": ["B"],
                "networkMode": "dev"
            })
        );
    }

    #[test]
    fn test_preference_state_missing_fields_default() {
        let state: PreferenceState = serde_json::from_str(r#"{"favorites":["X"]}"#).unwrap();
        assert_eq!(state.favorites, vec!["X".to_string()]);
        assert!(state.search_history.is_empty());
        assert_eq!(state.network_mode, NetworkMode::Main);
    }

    #[test]
    fn test_normalized_restores_invariants() {
        let mut history: Vec<String> = (0..30).map(|i| format!("addr{}", i)).collect();
        history.insert(1, "addr0".to_string());
        let state = PreferenceState {
            search_history: history,
            favorites: vec!["F".to_string(), "G".to_string(), "F".to_string()],
            network_mode: NetworkMode::Main,
        }
        .normalized();

        assert_eq!(state.search_history.len(), MAX_HISTORY);
        assert_eq!(state.search_history[0], "addr0");
        assert_eq!(state.search_history[1], "addr1");
        assert_eq!(state.favorites, vec!["F".to_string(), "G".to_string()]);
    }
}
