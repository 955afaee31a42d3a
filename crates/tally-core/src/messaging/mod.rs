//! Messenger abstractions: inbound event types and outbound ports.

pub mod port;
pub mod types;
