//! Utilization reports.

use serde::{Deserialize, Serialize};

/// Storage utilization of a single node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageUtilization {
    pub used_bytes: u64,
    pub total_bytes: u64,
    pub utilization_percent: f64,
}

/// Aggregated utilization of the whole network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub total_nodes: usize,
    pub total_bandwidth_bps: u64,
    pub used_bandwidth_bps: u64,
    /// Percent of total bandwidth in use, zero for a network without bandwidth.
    pub bandwidth_utilization: f64,
    pub total_storage_bytes: u64,
    pub used_storage_bytes: u64,
    /// Percent of total storage in use, zero for a network without storage.
    pub storage_utilization: f64,
    /// Number of transfers which are admitted but not completed.
    pub active_transfers: usize,
}

/// `used / total` in percent, zero when `total` is zero.
pub fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    used as f64 / total as f64 * 100.
}
