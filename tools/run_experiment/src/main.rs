use std::{
    collections::HashMap,
    error::Error,
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use clap::Parser;
use env_logger::Builder;
use serde::Deserialize;

use storage_vnet::{
    chunking_strategies::{fixed::FixedChunking, tiered::TieredChunking},
    chunking_strategy::ChunkingStrategy,
};
use storage_vnet_sim::{
    experiment::{Experiment, RunResult},
    plan::SimulationPlan,
    system::SystemConfig,
};

#[derive(Deserialize)]
struct Config {
    plans: Vec<PathBuf>,
    systems: Vec<PathBuf>,
    #[serde(default = "default_chunking_strategies")]
    chunking_strategies: Vec<String>,
}

fn default_chunking_strategies() -> Vec<String> {
    vec!["System".to_string()]
}

/// Runs batch experiment.
#[derive(Parser, Debug)]
struct Args {
    /// Path to config.
    #[arg(short, long)]
    config: PathBuf,

    /// Path to folder with traces.
    #[arg(short, long, default_value = None)]
    traces: Option<PathBuf>,

    /// Path to file with results.
    #[arg(short, long)]
    output: PathBuf,

    /// Do not run experiments, just read results from --output.
    #[arg(long)]
    precalculated: bool,

    /// Number of threads.
    #[arg(long, default_value_t = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))]
    threads: usize,

    /// Seed for file id generation.
    #[arg(long, default_value_t = 123)]
    seed: u64,
}

fn filename(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("unnamed")
        .to_string()
}

fn read_name(name: &str) -> Result<(&str, HashMap<&str, &str>), String> {
    let Some(open) = name.find('[') else {
        return Ok((name, HashMap::new()));
    };
    let Some(args) = name[open + 1..].strip_suffix(']') else {
        return Err(format!("Unclosed arguments in {}", name));
    };
    let args = args
        .split(',')
        .map(|arg| arg.split_once('=').ok_or_else(|| format!("Bad argument {} in {}", arg, name)))
        .collect::<Result<_, _>>()?;
    Ok((&name[..open], args))
}

/// `System` keeps the strategy of the system config, `Tiered` and `Fixed[chunk_size=N]` override it.
fn parse_chunking_strategy(name: &str) -> Result<Option<Box<dyn ChunkingStrategy>>, String> {
    let (name, args) = read_name(name)?;
    match name {
        "System" => Ok(None),
        "Tiered" => Ok(Some(Box::new(TieredChunking::new()))),
        "Fixed" => {
            let chunk_size = args
                .get("chunk_size")
                .ok_or("Fixed chunking needs chunk_size")?
                .parse()
                .map_err(|e| format!("Bad chunk_size: {}", e))?;
            Ok(Some(Box::new(FixedChunking::new(chunk_size))))
        }
        x => Err(format!("Unknown chunking strategy {}", x)),
    }
}

fn chunking_strategy_resolver(name: &str) -> Option<Box<dyn ChunkingStrategy>> {
    parse_chunking_strategy(name).ok().flatten()
}

fn main() -> Result<(), Box<dyn Error>> {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    let args = Args::parse();
    let config: Config = serde_yaml::from_str(&std::fs::read_to_string(&args.config)?)?;

    let result: Vec<RunResult> = if args.precalculated {
        serde_json::from_str(&std::fs::read_to_string(&args.output)?)?
    } else {
        for name in config.chunking_strategies.iter() {
            parse_chunking_strategy(name)?;
        }
        let plans = config
            .plans
            .iter()
            .enumerate()
            .map(|(i, path)| -> Result<_, Box<dyn Error>> {
                Ok((format!("{}_{}", i, filename(path)), SimulationPlan::from_yaml(path)?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let systems = config
            .systems
            .iter()
            .enumerate()
            .map(|(i, path)| -> Result<_, Box<dyn Error>> {
                Ok((format!("{}_{}", i, filename(path)), SystemConfig::from_yaml(path)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let experiment = Experiment::new(
            args.seed,
            plans,
            systems,
            config.chunking_strategies,
            chunking_strategy_resolver,
            args.traces,
        );

        let result = experiment.run(args.threads)?;
        File::create(&args.output)?.write_all(serde_json::to_string_pretty(&result)?.as_bytes())?;
        result
    };

    let names = result
        .iter()
        .map(|run| format!("{} / {} / {}", run.plan, run.system, run.chunking_strategy))
        .collect::<Vec<_>>();
    let width = names.iter().map(|name| name.len()).max().unwrap_or(0).max("run".len());
    println!(
        "| {: <width$} | steps | completed | chunks | stalled steps | rejected | storage |",
        "run",
        width = width
    );
    println!(
        "|-{:-<width$}-|-------|-----------|--------|---------------|----------|---------|",
        "",
        width = width
    );
    for (name, run) in names.into_iter().zip(result.iter()) {
        let stats = &run.run_stats;
        println!(
            "| {: <width$} | {: >5} | {: >4}/{: <4} | {: >6} | {: >13} | {: >8} | {: >6.2}% |",
            name,
            stats.total_steps,
            stats.completed_transfer_count,
            stats.total_transfer_count,
            stats.chunks_transferred,
            stats.stalled_steps,
            stats.rejected_admissions,
            stats.storage_utilization,
            width = width
        );
    }
    Ok(())
}
