//! Core domain types

use std::fmt;
use std::str::FromStr;

use storadm_protocol::Address;

/// Replication group identifier
pub type GroupId = u32;

/// A backend slot on a specific node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTarget {
    pub address: Address,
    pub backend_id: u32,
}

impl BackendTarget {
    pub fn new(address: Address, backend_id: u32) -> Self {
        Self {
            address,
            backend_id,
        }
    }
}

impl fmt::Display for BackendTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.backend_id)
    }
}

/// Monitor statistics category bitmask
///
/// Opaque to this layer: the value is forwarded to the node unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Categories(pub u64);

impl Categories {
    /// Sentinel requesting every category
    pub const ALL: Categories = Categories(u64::MAX);

    pub fn bits(self) -> u64 {
        self.0
    }
}

impl Default for Categories {
    fn default() -> Self {
        Self::ALL
    }
}

impl fmt::Display for Categories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ALL {
            write!(f, "all")
        } else {
            write!(f, "{:#x}", self.0)
        }
    }
}

impl FromStr for Categories {
    type Err = String;

    /// Accepts `all`, a decimal mask or a `0x`-prefixed hexadecimal mask.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::ALL);
        }
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => s.parse(),
        };
        parsed
            .map(Categories)
            .map_err(|e| format!("invalid category mask '{}': {}", s, e))
    }
}

/// Which nodes a monitor query addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorScope {
    /// Only the given node
    Node(Address),
    /// Every node in the session's routing table
    Cluster,
}

/// Statistics document returned by one node
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorStat {
    pub address: Address,
    pub stat: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_parse() {
        assert_eq!("all".parse::<Categories>(), Ok(Categories::ALL));
        assert_eq!("ALL".parse::<Categories>(), Ok(Categories::ALL));
        assert_eq!("5".parse::<Categories>(), Ok(Categories(5)));
        assert_eq!("0x1f".parse::<Categories>(), Ok(Categories(0x1f)));
        assert!("cache".parse::<Categories>().is_err());
        assert!("-1".parse::<Categories>().is_err());
    }

    #[test]
    fn test_categories_default_is_all() {
        assert_eq!(Categories::default(), Categories::ALL);
        assert_eq!(Categories::ALL.to_string(), "all");
        assert_eq!(Categories(16).to_string(), "0x10");
    }

    #[test]
    fn test_backend_target_display() {
        let target = BackendTarget::new("host1:1025:2".parse().unwrap(), 3);
        assert_eq!(target.to_string(), "host1:1025:2/3");
    }
}
