//! Node identifiers and references accepted by the network API.

use std::{fmt, net::Ipv4Addr};

use serde::{Deserialize, Serialize};

/// Stable, caller-assigned node identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id could be confused with an address.
    pub fn looks_like_address(&self) -> bool {
        self.0.parse::<Ipv4Addr>().is_ok()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId(id)
    }
}

/// Reference to a node either by its id or by its assigned address.
///
/// Parsing a string yields [NodeRef::Address] for anything that is a valid IPv4 address and
/// [NodeRef::Id] otherwise. Node ids shaped like addresses are refused at registration, so
/// the two namespaces never overlap.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Id(NodeId),
    Address(Ipv4Addr),
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Id(id) => write!(f, "{}", id),
            NodeRef::Address(address) => write!(f, "{}", address),
        }
    }
}

impl From<&str> for NodeRef {
    fn from(s: &str) -> Self {
        match s.parse::<Ipv4Addr>() {
            Ok(address) => NodeRef::Address(address),
            Err(_) => NodeRef::Id(NodeId::from(s)),
        }
    }
}

impl From<&String> for NodeRef {
    fn from(s: &String) -> Self {
        NodeRef::from(s.as_str())
    }
}

impl From<NodeId> for NodeRef {
    fn from(id: NodeId) -> Self {
        NodeRef::Id(id)
    }
}

impl From<&NodeId> for NodeRef {
    fn from(id: &NodeId) -> Self {
        NodeRef::Id(id.clone())
    }
}

impl From<Ipv4Addr> for NodeRef {
    fn from(address: Ipv4Addr) -> Self {
        NodeRef::Address(address)
    }
}

impl From<&NodeRef> for NodeRef {
    fn from(node_ref: &NodeRef) -> Self {
        node_ref.clone()
    }
}
