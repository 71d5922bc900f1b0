//! Network coordinator: node registry, addressing, transfer registry and the step protocol.

use std::{collections::BTreeMap, net::Ipv4Addr};

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::Serialize;

use crate::{
    address::AddressSpace,
    chunking_strategies::tiered::TieredChunking,
    chunking_strategy::ChunkingStrategy,
    error::NetworkError,
    node::Node,
    node_ref::{NodeId, NodeRef},
    stats::{percent, NetworkStats},
    transfer::{FileId, FileTransfer},
};

/// Result of one call of [Network::process_file_transfer].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// Number of chunks delivered during the step.
    pub chunks_transferred: usize,
    /// Whether the transfer completed during the step.
    pub completed: bool,
}

impl StepOutcome {
    fn new(chunks_transferred: usize, completed: bool) -> Self {
        Self {
            chunks_transferred,
            completed,
        }
    }
}

/// Network of storage nodes.
///
/// Every node reference accepted by the methods is either a node id or an assigned address,
/// see [NodeRef]. Transfers in flight are registered under their **source** node even though
/// they are admitted and received by the target node.
pub struct Network {
    nodes: BTreeMap<NodeId, Node>,
    addresses: AddressSpace,
    transfer_operations: BTreeMap<NodeId, BTreeMap<FileId, FileTransfer>>,
    chunking_strategy: Box<dyn ChunkingStrategy>,
    rng: Pcg64,
}

impl Network {
    /// Creates new [Network] with addresses in `10.0.0.0/24` and [TieredChunking].
    pub fn new(seed: u64) -> Self {
        Self::with_config(AddressSpace::default(), Box::new(TieredChunking::new()), seed)
    }

    /// Creates new [Network].
    /// * `addresses` --- address space to allocate node addresses from.
    /// * `chunking_strategy` --- strategy choosing chunk sizes of admitted files.
    /// * `seed` --- seed for file id generation.
    pub fn with_config(addresses: AddressSpace, chunking_strategy: Box<dyn ChunkingStrategy>, seed: u64) -> Self {
        Self {
            nodes: BTreeMap::new(),
            addresses,
            transfer_operations: BTreeMap::new(),
            chunking_strategy,
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    /// Registers a node and returns its address.
    ///
    /// Nodes without an address get the lowest free one of the subnet. Running out of
    /// addresses is unrecoverable: no address is ever released.
    pub fn add_node(&mut self, mut node: Node) -> Result<Ipv4Addr, NetworkError> {
        let node_id = node.node_id().clone();
        if node_id.looks_like_address() {
            return Err(NetworkError::AmbiguousNodeId(node_id));
        }
        if self.nodes.contains_key(&node_id) {
            return Err(NetworkError::DuplicateNode(node_id));
        }
        let address = match node.address() {
            Some(address) => {
                self.addresses.reserve(address, &node_id)?;
                address
            }
            None => {
                let address = self.addresses.allocate(&node_id)?;
                node.set_address(address);
                address
            }
        };
        info!("node {} joined the network at {}", node_id, address);
        self.nodes.insert(node_id, node);
        Ok(address)
    }

    /// Returns the id of the referenced node, if it is registered.
    pub fn resolve(&self, node: &NodeRef) -> Option<&NodeId> {
        match node {
            NodeRef::Id(node_id) => self.nodes.get_key_value(node_id).map(|(node_id, _)| node_id),
            NodeRef::Address(address) => self.addresses.resolve(address),
        }
    }

    pub fn node(&self, node: impl Into<NodeRef>) -> Option<&Node> {
        let node_id = self.resolve(&node.into())?;
        self.nodes.get(node_id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn addresses(&self) -> &AddressSpace {
        &self.addresses
    }

    /// Connects two nodes with links of `bandwidth` bits per second in both directions.
    ///
    /// Returns `false` if any of the nodes is unknown or both references point to the same node.
    /// Connecting an already connected pair replaces the capacity of both links.
    pub fn connect_nodes(&mut self, node1: impl Into<NodeRef>, node2: impl Into<NodeRef>, bandwidth: u64) -> bool {
        let (Some(n1), Some(n2)) = (self.resolve_owned(node1), self.resolve_owned(node2)) else {
            return false;
        };
        if n1 == n2 {
            return false;
        }
        if let Some(node) = self.nodes.get_mut(&n1) {
            node.add_connection(n2.clone(), bandwidth);
        }
        if let Some(node) = self.nodes.get_mut(&n2) {
            node.add_connection(n1.clone(), bandwidth);
        }
        info!("connected {} and {} with {} bps", n1, n2, bandwidth);
        true
    }

    /// Asks the target node to admit a file and registers the admitted transfer under the source.
    ///
    /// Returns `None` if any of the nodes is unknown or the target has not enough free storage.
    pub fn initiate_file_transfer(
        &mut self,
        source: impl Into<NodeRef>,
        target: impl Into<NodeRef>,
        file_name: &str,
        file_size: u64,
    ) -> Option<&FileTransfer> {
        let src = self.resolve_owned(source)?;
        let tgt = self.resolve_owned(target)?;
        let file_id = self.generate_file_id(&src);
        let transfer = self.nodes.get(&tgt)?.initiate_file_transfer(
            file_id.clone(),
            file_name,
            file_size,
            &src,
            self.chunking_strategy.as_ref(),
        )?;
        info!(
            "transfer {} of {} ({} bytes) from {} to {} initiated",
            file_id, file_name, file_size, src, tgt
        );
        let transfers = self.transfer_operations.entry(src).or_default();
        Some(transfers.entry(file_id).or_insert(transfer))
    }

    /// Advances a transfer by up to `chunks_per_step` chunks.
    ///
    /// Chunks are delivered strictly in order and the step stops at the first chunk the target
    /// can't receive right now; partial progress is expected and the caller should retry later.
    /// Unknown nodes or transfers are reported as `(0, false)`. Once the transfer completes
    /// it is removed from the registry.
    pub fn process_file_transfer(
        &mut self,
        source: impl Into<NodeRef>,
        target: impl Into<NodeRef>,
        file_id: &FileId,
        chunks_per_step: usize,
    ) -> StepOutcome {
        let (Some(src), Some(tgt)) = (self.resolve_owned(source), self.resolve_owned(target)) else {
            return StepOutcome::default();
        };
        let Some(transfer) = self
            .transfer_operations
            .get_mut(&src)
            .and_then(|transfers| transfers.get_mut(file_id))
        else {
            return StepOutcome::default();
        };
        let Some(target_node) = self.nodes.get_mut(&tgt) else {
            return StepOutcome::default();
        };

        transfer.skip_completed_chunks();

        let mut chunks_transferred = 0;
        while chunks_transferred < chunks_per_step {
            let Some(chunk_id) = transfer.next_chunk().map(|chunk| chunk.chunk_id) else {
                break;
            };
            if !target_node.process_chunk_transfer(transfer, chunk_id, &src) {
                debug!(
                    "transfer {}: chunk {} not accepted by {}, stopping after {} chunks",
                    file_id, chunk_id, tgt, chunks_transferred
                );
                return StepOutcome::new(chunks_transferred, false);
            }
            chunks_transferred += 1;
            transfer.advance_cursor();
        }

        if transfer.status().is_terminal() {
            if let Some(transfers) = self.transfer_operations.get_mut(&src) {
                transfers.remove(file_id);
                if transfers.is_empty() {
                    self.transfer_operations.remove(&src);
                }
            }
            info!("transfer {} from {} to {} completed", file_id, src, tgt);
            return StepOutcome::new(chunks_transferred, true);
        }
        StepOutcome::new(chunks_transferred, false)
    }

    /// Returns a transfer in flight from `source`.
    pub fn transfer(&self, source: impl Into<NodeRef>, file_id: &FileId) -> Option<&FileTransfer> {
        let src = self.resolve(&source.into())?;
        self.transfer_operations.get(src)?.get(file_id)
    }

    /// Returns all transfers in flight registered under `source`.
    pub fn transfers_from(&self, source: impl Into<NodeRef>) -> impl Iterator<Item = &FileTransfer> {
        self.resolve(&source.into())
            .and_then(|src| self.transfer_operations.get(src))
            .into_iter()
            .flat_map(|transfers| transfers.values())
    }

    /// Number of transfers in flight.
    pub fn active_transfers(&self) -> usize {
        self.transfer_operations.values().map(|transfers| transfers.len()).sum()
    }

    /// Aggregates utilization of all nodes.
    pub fn get_network_stats(&self) -> NetworkStats {
        let total_bandwidth = self.saturating_sum(Node::bandwidth);
        let used_bandwidth = self.saturating_sum(Node::network_utilization);
        let total_storage = self.saturating_sum(Node::storage_capacity);
        let used_storage = self.saturating_sum(Node::used_storage);
        NetworkStats {
            total_nodes: self.nodes.len(),
            total_bandwidth_bps: total_bandwidth,
            used_bandwidth_bps: used_bandwidth,
            bandwidth_utilization: percent(used_bandwidth, total_bandwidth),
            total_storage_bytes: total_storage,
            used_storage_bytes: used_storage,
            storage_utilization: percent(used_storage, total_storage),
            active_transfers: self.active_transfers(),
        }
    }

    fn saturating_sum(&self, value: fn(&Node) -> u64) -> u64 {
        self.nodes
            .values()
            .fold(0u64, |sum, node| sum.saturating_add(value(node)))
    }

    fn resolve_owned(&self, node: impl Into<NodeRef>) -> Option<NodeId> {
        self.resolve(&node.into()).cloned()
    }

    fn generate_file_id(&mut self, source: &NodeId) -> FileId {
        loop {
            let file_id = FileId::new(format!("{:032x}", self.rng.gen::<u128>()));
            let taken = self
                .transfer_operations
                .get(source)
                .is_some_and(|transfers| transfers.contains_key(&file_id));
            if !taken {
                return file_id;
            }
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new(123)
    }
}
