//! storadm: Command-line administration for a storage cluster
//!
//! Provides the `storadm` CLI: backend control (enable, disable, defrag,
//! compact, read-only toggling, status) and monitor statistics queries.
//!
//! The binary parses arguments into an [`Invocation`](commands::Invocation)
//! without touching the network, opens a session through a
//! [`Connector`](storadm_core::Connector), runs exactly one action and prints
//! the result or the error as JSON.

pub mod bootstrap;
pub mod cli;
pub mod client;
pub mod commands;
pub mod logging;
pub mod output;

#[cfg(test)]
pub(crate) mod testing;
