//! Plans of transfers to drive through a network.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config_error::{read_yaml, ConfigError};

fn default_chunks_per_step() -> usize {
    1
}

fn default_max_steps() -> usize {
    10_000
}

/// One file to move between two nodes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferPlan {
    /// Source node name or address.
    pub source: String,
    /// Target node name or address.
    pub target: String,
    pub file_name: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Maximum number of chunks delivered per step.
    #[serde(default = "default_chunks_per_step")]
    pub chunks_per_step: usize,
    /// First step at which the transfer is initiated.
    #[serde(default)]
    pub start_step: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationPlan {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transfers: Vec<TransferPlan>,
    /// The simulation stops after this many steps even if some transfers are not complete.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl SimulationPlan {
    /// Read [SimulationPlan] from YAML file.
    pub fn from_yaml<P: AsRef<Path>>(file: P) -> Result<Self, ConfigError> {
        read_yaml(file.as_ref())
    }
}
