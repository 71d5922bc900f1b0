//! Errors raised while registering nodes.

use std::net::Ipv4Addr;

use thiserror::Error;

use crate::node_ref::NodeId;

/// Errors raised while registering nodes in a [Network](crate::network::Network).
///
/// Capacity and lookup failures of transfers are not errors, they are reported as
/// ordinary return values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("no available addresses in subnet {0}/24")]
    AddressPoolExhausted(Ipv4Addr),
    #[error("node {0} is already registered")]
    DuplicateNode(NodeId),
    #[error("address {address} is already assigned to node {owner}")]
    AddressInUse { address: Ipv4Addr, owner: NodeId },
    #[error("node id {0} is shaped like an address")]
    AmbiguousNodeId(NodeId),
}
