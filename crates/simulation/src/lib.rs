//! Scenario-driven simulations of a storage network.

pub mod config_error;
pub mod experiment;
pub mod plan;
pub mod run_stats;
pub mod scenario;
pub mod system;
pub mod trace;
