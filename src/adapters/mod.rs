//! Adapters — concrete implementations of the port traits.

pub mod hardware;
pub mod sinks;
