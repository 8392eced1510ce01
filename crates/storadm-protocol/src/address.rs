//! Node addresses in `host:port:family` form

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Socket address family of a node address.
///
/// The numeric values are the POSIX `AF_*` constants used in the textual
/// `host:port:family` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressFamily {
    /// IPv4 (`AF_INET`)
    Inet,
    /// IPv6 (`AF_INET6`)
    Inet6,
}

impl AddressFamily {
    /// Numeric family code
    pub fn code(self) -> u16 {
        match self {
            AddressFamily::Inet => 2,
            AddressFamily::Inet6 => 10,
        }
    }

    /// Look up a family by its numeric code
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            2 => Some(AddressFamily::Inet),
            10 => Some(AddressFamily::Inet6),
            _ => None,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Address of a cluster node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    /// Hostname or IP literal
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Address family
    pub family: AddressFamily,
}

impl Address {
    /// Create a new address
    pub fn new(host: impl Into<String>, port: u16, family: AddressFamily) -> Self {
        Self {
            host: host.into(),
            port,
            family,
        }
    }

    /// Host/port pair suitable for `TcpStream::connect`
    pub fn socket_target(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.host, self.port, self.family)
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    /// Parse `host:port:family`, e.g. `"storage-01:1025:2"`.
    ///
    /// The host may itself contain colons (IPv6 literals); the port and
    /// family are taken from the right. Only canonical decimal numbers are
    /// accepted so that `to_string()` reproduces the input exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplitn(3, ':');
        let family_str = parts.next().unwrap_or_default();
        let port_str = parts.next().ok_or(AddressParseError::MissingPort)?;
        let host = parts.next().ok_or(AddressParseError::MissingFamily)?;

        if host.is_empty() {
            return Err(AddressParseError::EmptyHost);
        }

        let port = parse_canonical::<u16>(port_str)
            .ok_or_else(|| AddressParseError::InvalidPort(port_str.to_string()))?;

        let family = parse_canonical::<u16>(family_str)
            .and_then(AddressFamily::from_code)
            .ok_or_else(|| AddressParseError::InvalidFamily(family_str.to_string()))?;

        Ok(Address::new(host, port, family))
    }
}

fn parse_canonical<T>(s: &str) -> Option<T>
where
    T: FromStr + ToString,
{
    let value: T = s.parse().ok()?;
    (value.to_string() == s).then_some(value)
}

impl TryFrom<String> for Address {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

/// Errors when parsing an [`Address`] from `host:port:family`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    /// Fewer than two `:` separators
    #[error("expected HOST:PORT:FAMILY, missing port")]
    MissingPort,

    /// Only one `:` separator
    #[error("expected HOST:PORT:FAMILY, missing family")]
    MissingFamily,

    /// Host part is empty
    #[error("host is empty")]
    EmptyHost,

    /// Port is not a canonical integer in 0..=65535
    #[error("invalid port '{0}'")]
    InvalidPort(String),

    /// Family is not a supported address family code
    #[error("invalid address family '{0}' (expected 2 or 10)")]
    InvalidFamily(String),
}
