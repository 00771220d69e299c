//! Durable user preferences for the wallet lookup tool
//!
//! A small asynchronous key-value abstraction with in-memory, file and Redis
//! backends, and the preference store that keeps search history, favorites
//! and the selected network on top of it.

pub mod kv;
pub mod preferences;

pub use kv::{FileStore, InMemoryStore, KeyValueStore, RedisStore};
pub use preferences::{PreferenceStore, PREFERENCES_KEY};
