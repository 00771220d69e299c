pub mod cli;
pub mod display;
pub mod logging;
pub mod lookup_service;

pub use lookup_service::{validate_address, LookupService};
