//! Description of a storage network: nodes, links and chunking.

use std::{net::Ipv4Addr, path::Path};

use log::warn;
use serde::{Deserialize, Serialize};

use storage_vnet::{
    address::AddressSpace,
    chunking_strategies::{fixed::FixedChunking, tiered::TieredChunking},
    chunking_strategy::ChunkingStrategy,
    error::NetworkError,
    network::Network,
    node::Node,
    units::{GIB, MBPS},
};

use crate::config_error::{read_yaml, ConfigError};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChunkingConfig {
    /// [TieredChunking] with default tiers.
    #[default]
    Tiered,
    /// [FixedChunking] with `chunk_size` bytes.
    Fixed { chunk_size: u64 },
}

impl ChunkingConfig {
    pub fn build(&self) -> Box<dyn ChunkingStrategy> {
        match self {
            ChunkingConfig::Tiered => Box::new(TieredChunking::new()),
            ChunkingConfig::Fixed { chunk_size } => Box::new(FixedChunking::new(*chunk_size)),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    pub name: String,
    #[serde(default)]
    pub cpu_capacity: u32,
    /// Memory in GiB.
    #[serde(default)]
    pub memory_gb: u64,
    /// Storage in GiB.
    pub storage_gb: u64,
    /// Node bandwidth in Mbps.
    pub bandwidth_mbps: u64,
    /// Preset address, allocated from the subnet if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Ipv4Addr>,
}

impl NodeConfig {
    pub fn build(&self) -> Node {
        let node = Node::new(
            self.name.as_str(),
            self.cpu_capacity,
            self.memory_gb,
            self.storage_gb * GIB,
            self.bandwidth_mbps * MBPS,
        );
        match self.address {
            Some(address) => node.with_address(address),
            None => node,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Node name or address.
    pub from: String,
    /// Node name or address.
    pub to: String,
    /// Link bandwidth in Mbps, the same in both directions.
    pub bandwidth_mbps: u64,
}

fn default_subnet() -> Ipv4Addr {
    Ipv4Addr::new(10, 0, 0, 0)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_subnet")]
    pub subnet: Ipv4Addr,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    pub nodes: Vec<NodeConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkConfig>,
}

impl SystemConfig {
    /// Read [SystemConfig] from YAML file.
    pub fn from_yaml<P: AsRef<Path>>(file: P) -> Result<Self, ConfigError> {
        read_yaml(file.as_ref())
    }

    /// Builds a network with the configured chunking strategy.
    pub fn build_network(&self, seed: u64) -> Result<Network, NetworkError> {
        self.build_network_with(self.chunking.build(), seed)
    }

    /// Builds a network, overriding the configured chunking strategy.
    ///
    /// Links between unknown nodes are skipped with a warning.
    pub fn build_network_with(
        &self,
        chunking_strategy: Box<dyn ChunkingStrategy>,
        seed: u64,
    ) -> Result<Network, NetworkError> {
        let mut network = Network::with_config(AddressSpace::new(self.subnet), chunking_strategy, seed);
        for node in self.nodes.iter() {
            network.add_node(node.build())?;
        }
        for link in self.links.iter() {
            if !network.connect_nodes(&link.from, &link.to, link.bandwidth_mbps * MBPS) {
                warn!("can't connect {} and {}, skipping link", link.from, link.to);
            }
        }
        Ok(network)
    }
}
