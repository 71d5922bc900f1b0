//! Some stats from a completed simulation.

use serde::{Deserialize, Serialize};

/// Some stats from a completed simulation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunStats {
    /// Number of steps until every transfer completed or the step limit was reached.
    pub total_steps: usize,
    /// Total number of planned transfers.
    pub total_transfer_count: usize,
    /// Number of transfers admitted by their targets.
    pub admitted_transfer_count: usize,
    /// Number of completed transfers.
    pub completed_transfer_count: usize,
    /// Number of admission attempts rejected for lack of storage. Rejected transfers are retried.
    pub rejected_admissions: usize,
    /// Number of steps which stopped on a chunk the target couldn't receive.
    pub stalled_steps: usize,
    /// Total number of delivered chunks.
    pub chunks_transferred: usize,
    /// Total size of completed files. Chunks of unfinished transfers are not counted.
    pub bytes_transferred: u64,
    /// Average number of steps between admission and completion among completed transfers.
    pub average_transfer_steps: f64,
    /// Minimum number of steps of a completed transfer.
    pub min_transfer_steps: usize,
    /// Maximum number of steps of a completed transfer.
    pub max_transfer_steps: usize,
    /// Storage utilization of the whole network in the end of the simulation, in percent.
    pub storage_utilization: f64,
    /// Total simulated time nodes spent receiving chunks, in seconds.
    pub total_busy_time: f64,
}

impl RunStats {
    /// Initialize new stats for a plan with given number of transfers.
    pub fn new(total_transfer_count: usize) -> Self {
        RunStats {
            total_steps: 0,
            total_transfer_count,
            admitted_transfer_count: 0,
            completed_transfer_count: 0,
            rejected_admissions: 0,
            stalled_steps: 0,
            chunks_transferred: 0,
            bytes_transferred: 0,
            average_transfer_steps: 0.0,
            min_transfer_steps: usize::MAX,
            max_transfer_steps: 0,
            storage_utilization: 0.0,
            total_busy_time: 0.0,
        }
    }

    pub fn register_admission(&mut self) {
        self.admitted_transfer_count += 1;
    }

    pub fn register_rejection(&mut self) {
        self.rejected_admissions += 1;
    }

    /// Register one step of a transfer which delivered `chunks` chunks.
    pub fn register_step(&mut self, chunks: usize, stalled: bool) {
        self.chunks_transferred += chunks;
        if stalled {
            self.stalled_steps += 1;
        }
    }

    /// Register completed transfer of `size` bytes which took `steps` steps.
    pub fn register_completion(&mut self, size: u64, steps: usize) {
        self.average_transfer_steps = (self.average_transfer_steps * self.completed_transfer_count as f64
            + steps as f64)
            / (self.completed_transfer_count + 1) as f64;
        self.completed_transfer_count += 1;
        self.bytes_transferred += size;
        self.min_transfer_steps = self.min_transfer_steps.min(steps);
        self.max_transfer_steps = self.max_transfer_steps.max(steps);
    }

    /// Finalize result given total number of steps and final state of the network.
    pub fn finalize(&mut self, total_steps: usize, storage_utilization: f64, total_busy_time: f64) {
        self.total_steps = total_steps;
        self.storage_utilization = storage_utilization;
        self.total_busy_time = total_busy_time;
        if self.completed_transfer_count == 0 {
            self.min_transfer_steps = 0;
        }
    }

    /// Whether every planned transfer completed.
    pub fn all_completed(&self) -> bool {
        self.completed_transfer_count == self.total_transfer_count
    }
}
