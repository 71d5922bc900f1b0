//! Model of a storage node.

use std::{collections::BTreeMap, net::Ipv4Addr};

use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    chunking_strategy::ChunkingStrategy,
    node_ref::NodeId,
    stats::{percent, StorageUtilization},
    transfer::{ChunkId, FileId, FileTransfer},
    units::BITS_PER_BYTE,
};

/// Directed link to a peer as seen by the receiving node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Capacity in bits per second.
    pub capacity: u64,
    /// Bandwidth committed to chunk operations currently in flight on this link.
    pub committed: u64,
}

impl Link {
    fn new(capacity: u64) -> Self {
        Self { capacity, committed: 0 }
    }

    /// Whether `demand` more bits per second fit on the link.
    pub fn has_headroom(&self, demand: u64) -> bool {
        self.committed.saturating_add(demand) <= self.capacity
    }
}

/// Metadata of a file fully received by a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    pub file_id: FileId,
    pub file_name: String,
    pub size: u64,
    pub source: NodeId,
    pub chunks: usize,
}

/// Model of a storage node.
///
/// Storage is measured in bytes and bandwidth in bits per second. CPU and memory
/// capacities are carried as attributes only and affect no decision.
#[derive(Clone, Debug)]
pub struct Node {
    node_id: NodeId,
    address: Option<Ipv4Addr>,
    cpu_capacity: u32,
    memory_capacity: u64,
    storage_capacity: u64,
    bandwidth: u64,
    used_storage: u64,
    network_utilization: u64,
    total_data_transferred: u64,
    completed_transfers: u64,
    busy_time: f64,
    // Unbounded: one entry per received file for the whole lifetime of the node.
    stored_files: BTreeMap<FileId, StoredFile>,
    connections: BTreeMap<NodeId, Link>,
}

impl Node {
    /// Creates new [Node].
    /// * `cpu_capacity` --- number of cores.
    /// * `memory_capacity` --- memory in GiB.
    /// * `storage_capacity` --- storage in bytes.
    /// * `bandwidth` --- bandwidth in bits per second.
    pub fn new(
        node_id: impl Into<NodeId>,
        cpu_capacity: u32,
        memory_capacity: u64,
        storage_capacity: u64,
        bandwidth: u64,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            address: None,
            cpu_capacity,
            memory_capacity,
            storage_capacity,
            bandwidth,
            used_storage: 0,
            network_utilization: 0,
            total_data_transferred: 0,
            completed_transfers: 0,
            busy_time: 0.0,
            stored_files: BTreeMap::new(),
            connections: BTreeMap::new(),
        }
    }

    /// Presets the address instead of letting the network allocate one.
    pub fn with_address(mut self, address: Ipv4Addr) -> Self {
        self.address = Some(address);
        self
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn address(&self) -> Option<Ipv4Addr> {
        self.address
    }

    pub(crate) fn set_address(&mut self, address: Ipv4Addr) {
        self.address = Some(address);
    }

    pub fn cpu_capacity(&self) -> u32 {
        self.cpu_capacity
    }

    pub fn memory_capacity(&self) -> u64 {
        self.memory_capacity
    }

    pub fn storage_capacity(&self) -> u64 {
        self.storage_capacity
    }

    pub fn bandwidth(&self) -> u64 {
        self.bandwidth
    }

    pub fn used_storage(&self) -> u64 {
        self.used_storage
    }

    pub fn free_storage(&self) -> u64 {
        self.storage_capacity.saturating_sub(self.used_storage)
    }

    /// Bandwidth committed to chunk operations in flight. Zero between calls.
    pub fn network_utilization(&self) -> u64 {
        self.network_utilization
    }

    /// Total bytes received over the lifetime of the node.
    pub fn total_data_transferred(&self) -> u64 {
        self.total_data_transferred
    }

    /// Number of files fully received.
    pub fn completed_transfers(&self) -> u64 {
        self.completed_transfers
    }

    /// Simulated seconds spent receiving chunks.
    pub fn busy_time(&self) -> f64 {
        self.busy_time
    }

    pub fn stored_files(&self) -> &BTreeMap<FileId, StoredFile> {
        &self.stored_files
    }

    pub fn connections(&self) -> &BTreeMap<NodeId, Link> {
        &self.connections
    }

    pub fn link(&self, peer: &NodeId) -> Option<&Link> {
        self.connections.get(peer)
    }

    /// Records a link from `peer` with capacity `bandwidth`. Reconnecting replaces the capacity.
    pub fn add_connection(&mut self, peer: NodeId, bandwidth: u64) {
        debug!("node {}: link from {} set to {} bps", self.node_id, peer, bandwidth);
        self.connections
            .entry(peer)
            .and_modify(|link| link.capacity = bandwidth)
            .or_insert_with(|| Link::new(bandwidth));
    }

    pub fn storage_utilization(&self) -> StorageUtilization {
        StorageUtilization {
            used_bytes: self.used_storage,
            total_bytes: self.storage_capacity,
            utilization_percent: percent(self.used_storage, self.storage_capacity),
        }
    }

    /// Admits a file coming from `source` if there is enough free storage for it.
    ///
    /// Storage is not reserved, it is credited chunk by chunk by [Node::process_chunk_transfer].
    pub fn initiate_file_transfer(
        &self,
        file_id: FileId,
        file_name: &str,
        file_size: u64,
        source: &NodeId,
        chunking_strategy: &dyn ChunkingStrategy,
    ) -> Option<FileTransfer> {
        if self.free_storage() < file_size {
            warn!(
                "node {}: not enough space for {} ({} bytes), {} bytes free",
                self.node_id,
                file_name,
                file_size,
                self.free_storage()
            );
            return None;
        }
        let transfer = FileTransfer::new(
            file_id,
            file_name,
            file_size,
            source.clone(),
            self.node_id.clone(),
            chunking_strategy.chunk_size(file_size),
        );
        debug!(
            "node {}: admitted {} ({}) of size {} from {} as {} chunks",
            self.node_id,
            transfer.file_name(),
            transfer.file_id(),
            file_size,
            source,
            transfer.chunks().len()
        );
        Some(transfer)
    }

    /// Receives one chunk of `transfer` from `source`.
    ///
    /// Returns `false` without changing any state if the chunk can't be received right now:
    /// the link from `source` (or the node itself) has no bandwidth headroom for the chunk,
    /// or crediting it would overflow the storage. Also returns `false` for chunks which are
    /// unknown, already completed, or belong to a transfer admitted elsewhere.
    pub fn process_chunk_transfer(&mut self, transfer: &mut FileTransfer, chunk_id: ChunkId, source: &NodeId) -> bool {
        if transfer.target() != &self.node_id || transfer.source() != source {
            return false;
        }
        let Some(chunk_index) = transfer.chunk_index(chunk_id) else {
            return false;
        };
        let chunk = &transfer.chunks()[chunk_index];
        if chunk.is_completed() {
            return false;
        }
        let size = chunk.size;
        let Some(link) = self.connections.get_mut(source) else {
            debug!("node {}: no link from {}", self.node_id, source);
            return false;
        };
        let demand = size.saturating_mul(BITS_PER_BYTE);
        if !link.has_headroom(demand) || self.network_utilization.saturating_add(demand) > self.bandwidth {
            debug!(
                "node {}: no bandwidth for chunk {} of {} ({} bits, link {}/{} bps, node {}/{} bps)",
                self.node_id,
                chunk_id,
                transfer.file_id(),
                demand,
                link.committed,
                link.capacity,
                self.network_utilization,
                self.bandwidth
            );
            return false;
        }
        if self
            .used_storage
            .checked_add(size)
            .map_or(true, |used| used > self.storage_capacity)
        {
            debug!(
                "node {}: no space for chunk {} of {}",
                self.node_id,
                chunk_id,
                transfer.file_id()
            );
            return false;
        }

        link.committed += demand;
        self.network_utilization += demand;
        if link.capacity > 0 {
            self.busy_time += demand as f64 / link.capacity as f64;
        }

        transfer.complete_chunk(chunk_index);
        self.used_storage += size;
        self.total_data_transferred = self.total_data_transferred.saturating_add(size);

        // The chunk has arrived by the time the call returns.
        link.committed -= demand;
        self.network_utilization -= demand;

        debug!(
            "node {}: received chunk {} of {} ({} bytes) from {}",
            self.node_id,
            chunk_id,
            transfer.file_id(),
            size,
            source
        );

        if transfer.status().is_terminal() {
            self.stored_files.insert(
                transfer.file_id().clone(),
                StoredFile {
                    file_id: transfer.file_id().clone(),
                    file_name: transfer.file_name().to_string(),
                    size: transfer.file_size(),
                    source: source.clone(),
                    chunks: transfer.chunks().len(),
                },
            );
            self.completed_transfers += 1;
            info!(
                "node {}: stored {} ({} bytes) from {}",
                self.node_id,
                transfer.file_name(),
                transfer.file_size(),
                source
            );
        }
        true
    }
}
