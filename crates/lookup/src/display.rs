//! Terminal rendering of lookup results

use rust_decimal::RoundingStrategy;
use shared::models::{Balance, LookupResult, NetworkMode};
use std::fmt::Write;

/// Known active mainnet wallet, handy for a first try
pub const EXAMPLE_ADDRESS: &str = "86xCnPeV69n6t3DnyGvkKobf9FdN2H9oiVDdaMpo2MMY";

/// Token holdings shown in the summary
pub const TOKENS_SHOWN: usize = 5;

/// `first n` + `...` + `last n` characters; short inputs are returned unchanged
pub fn short(s: &str, n: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= n * 2 {
        return s.to_string();
    }
    let head: String = chars[..n].iter().collect();
    let tail: String = chars[chars.len() - n..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Coarse relative time between two unix timestamps
pub fn time_ago(ts: i64, now: i64) -> String {
    let s = (now - ts).max(0);
    if s < 60 {
        format!("{}s ago", s)
    } else if s < 3_600 {
        format!("{}m ago", s / 60)
    } else if s < 86_400 {
        format!("{}h ago", s / 3_600)
    } else {
        format!("{}d ago", s / 86_400)
    }
}

pub fn explorer_tx_url(signature: &str, network: NetworkMode) -> String {
    match network {
        NetworkMode::Main => format!("https://solscan.io/tx/{}", signature),
        NetworkMode::Dev => format!("https://solscan.io/tx/{}?cluster=devnet", signature),
    }
}

/// Balance truncated to 4 decimals for display; the stored value is untouched
pub fn format_balance(balance: &Balance) -> String {
    let shown = balance
        .sol()
        .round_dp_with_strategy(4, RoundingStrategy::ToZero);
    format!("{:.4} SOL", shown)
}

pub fn render_lookup(result: &LookupResult, now: i64) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Wallet   {} ({})", short(&result.address, 8), result.network);
    let _ = writeln!(out, "Balance  {}", format_balance(&result.balance));

    if !result.tokens.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Tokens ({})", result.tokens.len());
        for token in result.tokens.iter().take(TOKENS_SHOWN) {
            let _ = writeln!(out, "  {:<16} {}", short(&token.mint, 6), token.amount.normalize());
        }
    }

    if !result.activity.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Recent activity");
        for entry in &result.activity {
            let when = match entry.occurred_at {
                Some(ts) => time_ago(ts, now),
                None => "pending".to_string(),
            };
            let status = if entry.succeeded { "Y" } else { "N" };
            let _ = writeln!(
                out,
                "  {} {:<20} {:>8}  {}",
                status,
                short(&entry.signature, 8),
                when,
                explorer_tx_url(&entry.signature, result.network)
            );
        }
    }

    out
}
