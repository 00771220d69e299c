pub mod activity;
pub mod balance;
pub mod client;
pub mod network;
pub mod tokens;
pub mod types;

#[cfg(test)]
mod mock;

pub use activity::ActivityResolver;
pub use balance::BalanceResolver;
pub use client::{JsonRpcClient, RpcCaller};
pub use network::NetworkClients;
pub use tokens::TokenResolver;
pub use types::*;
