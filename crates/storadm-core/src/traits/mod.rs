//! Core trait definitions

mod session;

pub use session::{ClusterSession, Connector, SessionOptions};
