//! Request and response messages for a node's admin endpoint
//!
//! Each request is answered by exactly one response on the same connection.
//! Messages are JSON objects tagged by a `type` field and framed one per line
//! by [`JsonLinesCodec`](crate::codec::JsonLinesCodec).
//!
//! # Message Flow
//!
//! 1. Client connects to the node's admin port
//! 2. Client sends a request (`route_list`, `backend_control`, ...)
//! 3. Node replies with the matching payload or an `error`
//! 4. Steps 2-3 repeat until the client closes the connection

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::address::Address;
use crate::backend::BackendStatus;

/// State change applied to a single backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendCommand {
    Enable,
    Disable,
    StartDefrag,
    StartCompact,
    StopDefrag,
    MakeReadonly,
    MakeWritable,
}

impl fmt::Display for BackendCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendCommand::Enable => "enable",
            BackendCommand::Disable => "disable",
            BackendCommand::StartDefrag => "start_defrag",
            BackendCommand::StartCompact => "start_compact",
            BackendCommand::StopDefrag => "stop_defrag",
            BackendCommand::MakeReadonly => "make_readonly",
            BackendCommand::MakeWritable => "make_writable",
        };
        f.write_str(name)
    }
}

/// One routing-table entry: a backend of a node serving a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub address: Address,
    pub group_id: u32,
    pub backend_id: u32,
}

/// Request sent to a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeRequest {
    /// Fetch the node's view of the cluster routing table
    RouteList,

    /// Change the state of one backend
    BackendControl {
        backend_id: u32,
        command: BackendCommand,
    },

    /// List all backends of the node
    BackendStatus,

    /// Fetch monitoring statistics for the given category bitmask
    MonitorStat { categories: u64 },
}

/// Response sent by a node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeResponse {
    /// Routing table entries
    Routes { routes: Vec<RouteEntry> },

    /// Backend list, after any requested state change
    Backends { backends: Vec<BackendStatus> },

    /// Opaque statistics document, numbers kept exactly as sent
    Stat { stat: Value },

    /// Node-side failure
    Error { code: i32, message: String },
}

const REQUEST_TYPES: &[&str] = &[
    "route_list",
    "backend_control",
    "backend_status",
    "monitor_stat",
];
const RESPONSE_TYPES: &[&str] = &["routes", "backends", "stat", "error"];

// Decoded by hand: `#[serde(tag)]` buffers fields in serde's content type,
// which cannot hold 128-bit or arbitrary-precision numbers.

/// Split a message object into its `type` tag and the remaining fields
fn split_tag<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<(String, Map<String, Value>), D::Error> {
    let mut fields = Map::<String, Value>::deserialize(deserializer)?;
    match fields.remove("type") {
        Some(Value::String(tag)) => Ok((tag, fields)),
        Some(other) => Err(de::Error::custom(format!(
            "message type must be a string, got {}",
            other
        ))),
        None => Err(de::Error::missing_field("type")),
    }
}

fn take(fields: &mut Map<String, Value>, name: &'static str) -> serde_json::Result<Value> {
    fields
        .remove(name)
        .ok_or_else(|| de::Error::missing_field(name))
}

fn field<T: DeserializeOwned>(
    fields: &mut Map<String, Value>,
    name: &'static str,
) -> serde_json::Result<T> {
    serde_json::from_value(take(fields, name)?)
}

fn request_from_fields(
    tag: &str,
    mut fields: Map<String, Value>,
) -> serde_json::Result<NodeRequest> {
    match tag {
        "route_list" => Ok(NodeRequest::RouteList),
        "backend_control" => Ok(NodeRequest::BackendControl {
            backend_id: field(&mut fields, "backend_id")?,
            command: field(&mut fields, "command")?,
        }),
        "backend_status" => Ok(NodeRequest::BackendStatus),
        "monitor_stat" => Ok(NodeRequest::MonitorStat {
            categories: field(&mut fields, "categories")?,
        }),
        other => Err(de::Error::unknown_variant(other, REQUEST_TYPES)),
    }
}

fn response_from_fields(
    tag: &str,
    mut fields: Map<String, Value>,
) -> serde_json::Result<NodeResponse> {
    match tag {
        "routes" => Ok(NodeResponse::Routes {
            routes: field(&mut fields, "routes")?,
        }),
        "backends" => Ok(NodeResponse::Backends {
            backends: field(&mut fields, "backends")?,
        }),
        // moved out untouched
        "stat" => Ok(NodeResponse::Stat {
            stat: take(&mut fields, "stat")?,
        }),
        "error" => Ok(NodeResponse::Error {
            code: field(&mut fields, "code")?,
            message: field(&mut fields, "message")?,
        }),
        other => Err(de::Error::unknown_variant(other, RESPONSE_TYPES)),
    }
}

impl<'de> Deserialize<'de> for NodeRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (tag, fields) = split_tag(deserializer)?;
        request_from_fields(&tag, fields).map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for NodeResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (tag, fields) = split_tag(deserializer)?;
        response_from_fields(&tag, fields).map_err(de::Error::custom)
    }
}
