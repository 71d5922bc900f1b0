//! Simulation of a small storage-area network.
//!
//! Nodes with finite storage and bandwidth exchange files as ordered sequences of chunks.
//! No payload is moved, only sizes and capacities are accounted for.

pub mod address;
pub mod chunking_strategies;
pub mod chunking_strategy;
pub mod error;
pub mod network;
pub mod node;
pub mod node_ref;
pub mod stats;
pub mod transfer;
pub mod units;
