//! Core domain + application logic for the tally bots.
//!
//! This crate is framework-agnostic. Telegram lives behind ports (traits)
//! implemented in the adapter crate.

pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod roster;
pub mod security;
pub mod signup;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{BestEffort, Error, Result};
