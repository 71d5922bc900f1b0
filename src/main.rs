use std::{error::Error, io::Write};

use env_logger::Builder;
use log::warn;

use storage_vnet::{
    network::Network,
    node::Node,
    units::{GIB, MBPS, MIB},
};

const CHUNKS_PER_STEP: usize = 3;

fn main() -> Result<(), Box<dyn Error>> {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    let mut network = Network::new(123);
    let node1_address = network.add_node(Node::new("node1", 4, 16, 500 * GIB, 1000 * MBPS))?;
    let node2_address = network.add_node(Node::new("node2", 8, 32, 1000 * GIB, 2000 * MBPS))?;
    println!("node1 is at {}, node2 is at {}", node1_address, node2_address);

    if !network.connect_nodes("node1", "node2", 1000 * MBPS) {
        return Err("can't connect node1 and node2".into());
    }

    let Some(transfer) = network.initiate_file_transfer("node1", "node2", "large_dataset.zip", 10 * MIB) else {
        return Err("transfer of large_dataset.zip was rejected".into());
    };
    let file_id = transfer.file_id().clone();
    println!(
        "initiated transfer {} of {} in {} chunks",
        file_id,
        transfer.file_name(),
        transfer.chunks().len()
    );

    let mut step = 0;
    loop {
        step += 1;
        let outcome = network.process_file_transfer("node1", "node2", &file_id, CHUNKS_PER_STEP);
        let stats = network.get_network_stats();
        let node2 = network.node("node2").ok_or("node2 is gone")?.storage_utilization();
        println!(
            "step {}: {} chunks transferred, bandwidth utilization {:.2}%, node2 storage {:.4}% ({} of {} bytes)",
            step,
            outcome.chunks_transferred,
            stats.bandwidth_utilization,
            node2.utilization_percent,
            node2.used_bytes,
            node2.total_bytes
        );
        if outcome.completed {
            println!("transfer {} completed in {} steps", file_id, step);
            break;
        }
        if outcome.chunks_transferred == 0 {
            warn!("transfer {} stalled on step {}", file_id, step);
            break;
        }
    }

    let stats = network.get_network_stats();
    println!("network stats:");
    println!("  nodes: {}", stats.total_nodes);
    println!(
        "  bandwidth: {} of {} bps in use ({:.2}%)",
        stats.used_bandwidth_bps, stats.total_bandwidth_bps, stats.bandwidth_utilization
    );
    println!(
        "  storage: {} of {} bytes in use ({:.4}%)",
        stats.used_storage_bytes, stats.total_storage_bytes, stats.storage_utilization
    );
    println!("  active transfers: {}", stats.active_transfers);
    Ok(())
}
