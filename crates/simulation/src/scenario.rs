use std::{fs::File, io::Write, path::PathBuf};

use log::{debug, info, warn};

use storage_vnet::{chunking_strategy::ChunkingStrategy, error::NetworkError, network::Network, transfer::FileId};

use crate::{
    plan::SimulationPlan,
    run_stats::RunStats,
    system::SystemConfig,
    trace::{Trace, TraceEvent},
};

#[derive(Clone)]
enum TransferState {
    Waiting,
    Active { file_id: FileId, admitted_at: usize },
    Done,
}

/// Drives a [SimulationPlan] through a network step by step.
///
/// On every step transfers whose start step has come are initiated (rejected ones are retried on
/// the next step), then every admitted transfer is advanced once.
pub struct ScenarioSimulation {
    plan: SimulationPlan,
    network: Network,
    states: Vec<TransferState>,
    step: usize,
    trace: Option<Trace>,
    trace_path: Option<PathBuf>,
}

impl ScenarioSimulation {
    /// Creates new simulation.
    /// * `chunking_strategy` --- overrides the chunking strategy of `system` if present.
    /// * `trace_path` --- where to write a JSON trace of the run.
    pub fn new(
        seed: u64,
        plan: SimulationPlan,
        system: SystemConfig,
        chunking_strategy: Option<Box<dyn ChunkingStrategy>>,
        trace_path: Option<PathBuf>,
    ) -> Result<Self, NetworkError> {
        let network = match chunking_strategy {
            Some(chunking_strategy) => system.build_network_with(chunking_strategy, seed)?,
            None => system.build_network(seed)?,
        };
        let states = vec![TransferState::Waiting; plan.transfers.len()];
        let trace = trace_path.as_ref().map(|_| Trace::new(system.nodes.clone()));
        Ok(Self {
            plan,
            network,
            states,
            step: 0,
            trace,
            trace_path,
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Runs until every transfer completes or the step limit is reached.
    pub fn run(&mut self) -> RunStats {
        let mut stats = RunStats::new(self.plan.transfers.len());
        while self.step < self.plan.max_steps && !self.is_finished() {
            self.initiate_transfers(&mut stats);
            self.advance_transfers(&mut stats);
            self.step += 1;
        }
        if self.is_finished() {
            info!("all transfers completed in {} steps", self.step);
        } else {
            warn!("step limit {} reached with unfinished transfers", self.plan.max_steps);
        }

        let network_stats = self.network.get_network_stats();
        let busy_time = self.network.nodes().map(|node| node.busy_time()).sum();
        stats.finalize(self.step, network_stats.storage_utilization, busy_time);
        self.write_trace();
        stats
    }

    fn is_finished(&self) -> bool {
        self.states.iter().all(|state| matches!(state, TransferState::Done))
    }

    fn initiate_transfers(&mut self, stats: &mut RunStats) {
        for (id, transfer) in self.plan.transfers.iter().enumerate() {
            if transfer.start_step > self.step || !matches!(self.states[id], TransferState::Waiting) {
                continue;
            }
            let admitted = self
                .network
                .initiate_file_transfer(
                    &transfer.source,
                    &transfer.target,
                    &transfer.file_name,
                    transfer.file_size,
                )
                .map(|admitted| (admitted.file_id().clone(), admitted.chunks().len()));
            match admitted {
                Some((file_id, chunks)) => {
                    debug!("step {}: transfer {} admitted as {}", self.step, id, file_id);
                    stats.register_admission();
                    if let Some(trace) = self.trace.as_mut() {
                        trace.log(TraceEvent::TransferInitiated {
                            step: self.step,
                            transfer: id,
                            file_id: file_id.to_string(),
                            source: transfer.source.clone(),
                            target: transfer.target.clone(),
                            chunks,
                        });
                    }
                    self.states[id] = TransferState::Active {
                        file_id,
                        admitted_at: self.step,
                    };
                }
                None => {
                    debug!("step {}: transfer {} rejected", self.step, id);
                    stats.register_rejection();
                    if let Some(trace) = self.trace.as_mut() {
                        trace.log(TraceEvent::AdmissionRejected {
                            step: self.step,
                            transfer: id,
                        });
                    }
                }
            }
        }
    }

    fn advance_transfers(&mut self, stats: &mut RunStats) {
        for (id, transfer) in self.plan.transfers.iter().enumerate() {
            let TransferState::Active { file_id, admitted_at } = &self.states[id] else {
                continue;
            };
            let admitted_at = *admitted_at;
            let outcome = self.network.process_file_transfer(
                &transfer.source,
                &transfer.target,
                file_id,
                transfer.chunks_per_step,
            );
            let next_chunk = self
                .network
                .transfer(&transfer.source, file_id)
                .map(|in_flight| in_flight.next_chunk_index())
                .unwrap_or_default();
            let stalled = !outcome.completed && outcome.chunks_transferred < transfer.chunks_per_step;
            stats.register_step(outcome.chunks_transferred, stalled);

            if let Some(trace) = self.trace.as_mut() {
                if outcome.chunks_transferred > 0 {
                    trace.log(TraceEvent::ChunksTransferred {
                        step: self.step,
                        transfer: id,
                        chunks: outcome.chunks_transferred,
                    });
                }
                if stalled {
                    trace.log(TraceEvent::Stalled {
                        step: self.step,
                        transfer: id,
                        next_chunk,
                    });
                }
                if outcome.completed {
                    trace.log(TraceEvent::TransferCompleted {
                        step: self.step,
                        transfer: id,
                    });
                }
            }

            if outcome.completed {
                stats.register_completion(transfer.file_size, self.step - admitted_at + 1);
                self.states[id] = TransferState::Done;
            }
        }
    }

    fn write_trace(&self) {
        let (Some(trace), Some(path)) = (&self.trace, &self.trace_path) else {
            return;
        };
        let result = serde_json::to_string_pretty(trace)
            .map_err(std::io::Error::from)
            .and_then(|json| File::create(path)?.write_all(json.as_bytes()));
        if let Err(e) = result {
            warn!("can't write trace to {}: {}", path.display(), e);
        }
    }
}
