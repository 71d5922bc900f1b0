use std::{
    io::Write,
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::{Duration, Instant},
};

use itertools::Itertools;
use log::error;
use serde::{Deserialize, Serialize};
use threadpool::ThreadPool;

use storage_vnet::chunking_strategy::ChunkingStrategy;

use crate::{plan::SimulationPlan, run_stats::RunStats, scenario::ScenarioSimulation, system::SystemConfig};

struct Run {
    plan: (String, SimulationPlan),
    system: (String, SystemConfig),
    chunking_strategy: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunResult {
    pub plan: String,
    pub system: String,
    pub chunking_strategy: String,
    pub run_stats: RunStats,
}

/// Runs every combination of plans, systems and chunking strategies.
pub struct Experiment {
    seed: u64,
    plans: Vec<(String, SimulationPlan)>,
    systems: Vec<(String, SystemConfig)>,
    chunking_strategies: Vec<String>,
    chunking_strategy_resolver: fn(&str) -> Option<Box<dyn ChunkingStrategy>>,
    traces_folder: Option<PathBuf>,
}

impl Experiment {
    /// Creates new [Experiment].
    /// * `chunking_strategy_resolver` --- builds a strategy by its name, `None` keeps the one of the system.
    pub fn new(
        seed: u64,
        plans: Vec<(String, SimulationPlan)>,
        systems: Vec<(String, SystemConfig)>,
        chunking_strategies: Vec<String>,
        chunking_strategy_resolver: fn(&str) -> Option<Box<dyn ChunkingStrategy>>,
        traces_folder: Option<PathBuf>,
    ) -> Self {
        Self {
            seed,
            plans,
            systems,
            chunking_strategies,
            chunking_strategy_resolver,
            traces_folder,
        }
    }

    /// Runs all simulations on `threads` threads. Results are sorted by plan, system and strategy.
    ///
    /// Runs whose system can't be built are reported and left out of the results.
    pub fn run(self, threads: usize) -> std::io::Result<Vec<RunResult>> {
        if let Some(dir) = &self.traces_folder {
            std::fs::create_dir_all(dir)?;
        }

        let runs = self
            .plans
            .into_iter()
            .cartesian_product(self.systems)
            .cartesian_product(self.chunking_strategies)
            .map(|((plan, system), chunking_strategy)| Run {
                plan,
                system,
                chunking_strategy,
            })
            .collect::<Vec<_>>();

        let total_runs = runs.len();

        let finished_run_atomic = Arc::new(AtomicUsize::new(0));
        let results = Arc::new(Mutex::new(Vec::new()));

        let pool = ThreadPool::new(threads.max(1));
        let start_time = Instant::now();
        for run in runs.into_iter() {
            let finished_run_atomic = finished_run_atomic.clone();
            let results = results.clone();
            let traces_folder = self.traces_folder.clone();
            let seed = self.seed;
            let resolver = self.chunking_strategy_resolver;
            pool.execute(move || {
                let chunking_strategy = resolver(&run.chunking_strategy);
                let trace_path = traces_folder.map(|folder| {
                    folder.join(format!("{}_{}_{}.json", run.plan.0, run.system.0, run.chunking_strategy))
                });

                match ScenarioSimulation::new(seed, run.plan.1, run.system.1, chunking_strategy, trace_path) {
                    Ok(mut sim) => {
                        let run_stats = sim.run();
                        if let Ok(mut results) = results.lock() {
                            results.push(RunResult {
                                plan: run.plan.0,
                                system: run.system.0,
                                chunking_strategy: run.chunking_strategy,
                                run_stats,
                            });
                        }
                    }
                    Err(e) => error!("can't build system {}: {}", run.system.0, e),
                }

                let finished_runs = finished_run_atomic.fetch_add(1, Ordering::SeqCst) + 1;

                let elapsed = start_time.elapsed();
                let remaining = Duration::from_secs_f64(
                    elapsed.as_secs_f64() / finished_runs as f64 * (total_runs - finished_runs) as f64,
                );
                print!("\r{}", " ".repeat(70));
                print!(
                    "\rFinished {}/{} [{}%] runs in {:.2?}, remaining time: {:.2?}",
                    finished_runs,
                    total_runs,
                    (finished_runs as f64 * 100. / total_runs as f64).round() as i32,
                    elapsed,
                    remaining
                );
                let _ = std::io::stdout().flush();
            });
        }

        pool.join();

        print!("\r{}", " ".repeat(70));
        println!("\rFinished {} runs in {:.2?}", total_runs, start_time.elapsed());

        let mut results = std::mem::take(&mut *results.lock().unwrap_or_else(|e| e.into_inner()));
        results.sort_by_cached_key(|run| (run.plan.clone(), run.system.clone(), run.chunking_strategy.clone()));
        Ok(results)
    }
}
