//! storadm-protocol: Wire protocol for storadm node administration
//!
//! This crate defines the newline-delimited JSON protocol spoken between the
//! `storadm` client and the admin endpoint of a storage node, together with
//! the wire-visible value types (node addresses, backend status records).
//!
//! This is not the storage cluster's native protocol. It is a small
//! administration protocol of this workspace, spoken by the test nodes in
//! `storadm`'s test suite and by any node-side adapter that implements it.
//! Talking to a real cluster means providing another
//! `storadm_core::Connector`, not extending this crate.

pub mod address;
pub mod backend;
pub mod codec;
pub mod error;
pub mod message;

pub use address::{Address, AddressFamily, AddressParseError};
pub use backend::{BackendState, BackendStatus, DefragState, StartError, Timestamp};
pub use codec::{JsonLinesCodec, MAX_LINE_SIZE};
pub use error::ProtocolError;
pub use message::{BackendCommand, NodeRequest, NodeResponse, RouteEntry};
