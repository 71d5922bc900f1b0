use std::net::Ipv4Addr;

use storage_vnet::{
    address::{AddressSpace, POOL_SIZE},
    chunking_strategies::{fixed::FixedChunking, tiered::TieredChunking},
    chunking_strategy::ChunkingStrategy,
    error::NetworkError,
    network::{Network, StepOutcome},
    node::Node,
    node_ref::{NodeId, NodeRef},
    transfer::{split_into_chunks, ChunkStatus, FileId, FileTransfer, TransferStatus},
    units::{GIB, KIB, MBPS, MIB},
};

fn two_nodes(chunk_size: u64, storage: u64, link_bandwidth: u64) -> Network {
    let mut network = Network::with_config(AddressSpace::default(), Box::new(FixedChunking::new(chunk_size)), 123);
    network.add_node(Node::new("node1", 4, 16, storage, 1000 * MBPS)).unwrap();
    network.add_node(Node::new("node2", 8, 32, storage, 2000 * MBPS)).unwrap();
    assert!(network.connect_nodes("node1", "node2", link_bandwidth));
    network
}

fn start(network: &mut Network, file_size: u64) -> FileId {
    network
        .initiate_file_transfer("node1", "node2", "file.bin", file_size)
        .unwrap()
        .file_id()
        .clone()
}

#[test]
fn demo_scenario() {
    let mut network = Network::new(123);
    let address1 = network.add_node(Node::new("node1", 4, 16, 500 * GIB, 1000 * MBPS)).unwrap();
    let address2 = network.add_node(Node::new("node2", 8, 32, 1000 * GIB, 2000 * MBPS)).unwrap();
    assert_eq!(address1, Ipv4Addr::new(10, 0, 0, 2));
    assert_eq!(address2, Ipv4Addr::new(10, 0, 0, 3));
    assert!(network.connect_nodes("node1", "node2", 1000 * MBPS));

    let file_size = 10 * MIB;
    let transfer = network
        .initiate_file_transfer("node1", "node2", "large_dataset.zip", file_size)
        .unwrap();
    let file_id = transfer.file_id().clone();
    let chunks = transfer.chunks().len();
    assert_eq!(chunks, 5);

    let mut steps = 0;
    let mut total_chunks = 0;
    loop {
        let outcome = network.process_file_transfer("node1", "node2", &file_id, 3);
        steps += 1;
        total_chunks += outcome.chunks_transferred;
        if outcome.completed {
            break;
        }
        assert!(steps < 100);
    }
    assert_eq!(steps, chunks.div_ceil(3));
    assert_eq!(total_chunks, chunks);

    let node2 = network.node("node2").unwrap();
    assert_eq!(node2.used_storage(), file_size);
    assert_eq!(node2.total_data_transferred(), file_size);
    assert_eq!(node2.network_utilization(), 0);
    assert_eq!(node2.stored_files().len(), 1);
    assert_eq!(node2.completed_transfers(), 1);
    assert_eq!(network.node("node1").unwrap().used_storage(), 0);

    let stats = network.get_network_stats();
    assert_eq!(stats.total_nodes, 2);
    assert_eq!(stats.active_transfers, 0);
    assert_eq!(stats.bandwidth_utilization, 0.0);
    assert_eq!(stats.used_bandwidth_bps, 0);
    assert_eq!(stats.total_bandwidth_bps, 3000 * MBPS);
    assert_eq!(stats.used_storage_bytes, file_size);
    assert_eq!(stats.total_storage_bytes, 1500 * GIB);
}

#[test]
fn chunk_sizes_sum_to_file_size() {
    for file_size in [1, 7, 100, 1023, 1024, 1025, 10 * MIB + 3] {
        for chunk_size in [1, 3, 512, 1024, 4 * MIB] {
            let chunks = split_into_chunks(file_size, chunk_size);
            assert_eq!(chunks.iter().map(|chunk| chunk.size).sum::<u64>(), file_size);
            assert_eq!(chunks.len() as u64, file_size.div_ceil(chunk_size));
            assert!(chunks[..chunks.len() - 1].iter().all(|chunk| chunk.size == chunk_size));
            assert!(chunks.last().unwrap().size <= chunk_size);
            assert!(chunks.iter().enumerate().all(|(i, chunk)| chunk.chunk_id == i as u64));
            assert!(chunks.iter().all(|chunk| chunk.status == ChunkStatus::Pending));
        }
    }
}

#[test]
fn empty_file_completes_in_one_step() {
    let mut network = two_nodes(KIB, GIB, 1000 * MBPS);
    let file_id = start(&mut network, 0);
    assert_eq!(network.transfer("node1", &file_id).unwrap().chunks().len(), 1);
    assert_eq!(
        network.process_file_transfer("node1", "node2", &file_id, 1),
        StepOutcome {
            chunks_transferred: 1,
            completed: true
        }
    );
    assert_eq!(network.node("node2").unwrap().used_storage(), 0);
}

#[test]
fn tiered_chunk_sizes() {
    let chunking = TieredChunking::new();
    assert_eq!(chunking.chunk_size(0), 512 * KIB);
    assert_eq!(chunking.chunk_size(10 * MIB - 1), 512 * KIB);
    assert_eq!(chunking.chunk_size(10 * MIB), 2 * MIB);
    assert_eq!(chunking.chunk_size(100 * MIB - 1), 2 * MIB);
    assert_eq!(chunking.chunk_size(100 * MIB), 10 * MIB);
    assert_eq!(chunking.chunk_size(10 * GIB), 10 * MIB);
    assert_eq!(FixedChunking::new(0).chunk_size(100), 1);
}

#[test]
fn admission_fails_without_free_storage() {
    let mut network = two_nodes(KIB, 10 * KIB, 1000 * MBPS);
    assert!(network
        .initiate_file_transfer("node1", "node2", "big.bin", 10 * KIB + 1)
        .is_none());
    assert_eq!(network.node("node2").unwrap().used_storage(), 0);
    assert_eq!(network.active_transfers(), 0);

    let file_id = start(&mut network, 6 * KIB);
    // Admission doesn't reserve storage.
    assert_eq!(network.node("node2").unwrap().used_storage(), 0);
    assert!(network.process_file_transfer("node1", "node2", &file_id, 10).completed);
    assert_eq!(network.node("node2").unwrap().used_storage(), 6 * KIB);
    assert!(network
        .initiate_file_transfer("node1", "node2", "second.bin", 4 * KIB + 1)
        .is_none());
    assert_eq!(network.node("node2").unwrap().used_storage(), 6 * KIB);
    assert!(network
        .initiate_file_transfer("node1", "node2", "second.bin", 4 * KIB)
        .is_some());
}

#[test]
fn storage_is_never_overcommitted() {
    let mut network = two_nodes(KIB, 4 * KIB, 1000 * MBPS);
    let first = start(&mut network, 3 * KIB);
    let second = start(&mut network, 3 * KIB);
    assert!(network.process_file_transfer("node1", "node2", &first, 3).completed);
    let outcome = network.process_file_transfer("node1", "node2", &second, 3);
    assert_eq!(
        outcome,
        StepOutcome {
            chunks_transferred: 1,
            completed: false
        }
    );
    let node2 = network.node("node2").unwrap();
    assert_eq!(node2.used_storage(), node2.storage_capacity());
    assert_eq!(network.active_transfers(), 1);
}

#[test]
fn unknown_nodes_and_transfers_are_no_ops() {
    let mut network = two_nodes(KIB, GIB, 1000 * MBPS);
    assert!(network.initiate_file_transfer("node1", "node3", "a", 1).is_none());
    assert!(network.initiate_file_transfer("10.0.0.99", "node2", "a", 1).is_none());
    assert!(!network.connect_nodes("node1", "node3", 10));
    assert!(!network.connect_nodes("node1", "10.0.0.2", 10));

    let file_id = start(&mut network, 2 * KIB);
    assert_eq!(
        network.process_file_transfer("node3", "node2", &file_id, 1),
        StepOutcome::default()
    );
    assert_eq!(
        network.process_file_transfer("node1", "node2", &FileId::from("missing"), 1),
        StepOutcome::default()
    );
    assert_eq!(network.transfer("node1", &file_id).unwrap().next_chunk_index(), 0);
}

#[test]
fn completed_transfer_is_forgotten() {
    let mut network = two_nodes(KIB, GIB, 1000 * MBPS);
    let file_id = start(&mut network, 5 * KIB);
    assert_eq!(network.active_transfers(), 1);
    let outcome = network.process_file_transfer("node1", "node2", &file_id, 5);
    assert_eq!(
        outcome,
        StepOutcome {
            chunks_transferred: 5,
            completed: true
        }
    );
    assert_eq!(network.active_transfers(), 0);
    assert!(network.transfer("node1", &file_id).is_none());
    assert_eq!(
        network.process_file_transfer("node1", "node2", &file_id, 5),
        StepOutcome::default()
    );
    assert_eq!(network.node("node2").unwrap().used_storage(), 5 * KIB);
    assert!(network.nodes().all(|node| node.network_utilization() == 0));
}

#[test]
fn step_advances_at_most_k_chunks() {
    let mut network = two_nodes(KIB, GIB, 1000 * MBPS);
    let file_id = start(&mut network, 10 * KIB);
    for (step, expected) in [2, 2, 2, 2, 2].into_iter().enumerate() {
        let outcome = network.process_file_transfer("node1", "node2", &file_id, 2);
        assert_eq!(outcome.chunks_transferred, expected);
        assert_eq!(outcome.completed, step == 4);
        if let Some(transfer) = network.transfer("node1", &file_id) {
            assert_eq!(transfer.next_chunk_index(), 2 * (step + 1));
            assert_eq!(transfer.status(), TransferStatus::InProgress);
        }
    }
}

#[test]
fn zero_chunks_per_step_does_nothing() {
    let mut network = two_nodes(KIB, GIB, 1000 * MBPS);
    let file_id = start(&mut network, 3 * KIB);
    assert_eq!(
        network.process_file_transfer("node1", "node2", &file_id, 0),
        StepOutcome::default()
    );
    assert_eq!(
        network.transfer("node1", &file_id).unwrap().status(),
        TransferStatus::Pending
    );
}

#[test]
fn backpressure_stops_the_step() {
    // 1 KiB chunks need 8192 bits of link bandwidth.
    let mut network = two_nodes(KIB, GIB, 8 * KIB - 1);
    let file_id = start(&mut network, 3 * KIB);
    for _ in 0..3 {
        assert_eq!(
            network.process_file_transfer("node1", "node2", &file_id, 3),
            StepOutcome::default()
        );
    }
    let transfer = network.transfer("node1", &file_id).unwrap();
    assert_eq!(transfer.status(), TransferStatus::Pending);
    assert_eq!(transfer.next_chunk_index(), 0);
    let node2 = network.node("node2").unwrap();
    assert_eq!(node2.used_storage(), 0);
    assert_eq!(node2.total_data_transferred(), 0);
    assert_eq!(node2.network_utilization(), 0);
    assert_eq!(node2.link(&NodeId::from("node1")).unwrap().committed, 0);

    // Widening the link lets the transfer go through.
    assert!(network.connect_nodes("node2", "node1", 8 * KIB));
    assert!(network.process_file_transfer("node1", "node2", &file_id, 3).completed);
}

#[test]
fn last_chunk_may_fit_when_others_do_not() {
    let mut network = two_nodes(KIB, GIB, 4 * KIB);
    let file_id = start(&mut network, KIB + 100);
    let outcome = network.process_file_transfer("node1", "node2", &file_id, 2);
    assert_eq!(outcome, StepOutcome::default());
    let transfer = network.transfer("node1", &file_id).unwrap();
    assert_eq!(transfer.chunks()[1].size, 100);
    assert_eq!(transfer.completed_chunks(), 0);
}

#[test]
fn node_bandwidth_caps_chunks() {
    let mut network = Network::with_config(AddressSpace::default(), Box::new(FixedChunking::new(KIB)), 1);
    network.add_node(Node::new("a", 1, 1, GIB, 1000 * MBPS)).unwrap();
    network.add_node(Node::new("b", 1, 1, GIB, 1000)).unwrap();
    assert!(network.connect_nodes("a", "b", 1000 * MBPS));
    let file_id = network
        .initiate_file_transfer("a", "b", "f", KIB)
        .unwrap()
        .file_id()
        .clone();
    assert_eq!(network.process_file_transfer("a", "b", &file_id, 1), StepOutcome::default());
}

#[test]
fn transfer_without_link_never_progresses() {
    let mut network = Network::new(7);
    network.add_node(Node::new("a", 1, 1, GIB, MBPS)).unwrap();
    network.add_node(Node::new("b", 1, 1, GIB, MBPS)).unwrap();
    let file_id = network
        .initiate_file_transfer("a", "b", "f", KIB)
        .unwrap()
        .file_id()
        .clone();
    assert_eq!(network.process_file_transfer("a", "b", &file_id, 1), StepOutcome::default());
    assert_eq!(network.active_transfers(), 1);
}

#[test]
fn registry_is_keyed_by_source() {
    let mut network = two_nodes(KIB, GIB, 1000 * MBPS);
    let file_id = start(&mut network, 2 * KIB);
    assert!(network.transfer("node1", &file_id).is_some());
    assert!(network.transfer("node2", &file_id).is_none());
    assert_eq!(network.transfers_from("node1").count(), 1);
    assert_eq!(network.transfers_from("node2").count(), 0);

    let transfer = network.transfer("node1", &file_id).unwrap();
    assert_eq!(transfer.source(), &NodeId::from("node1"));
    assert_eq!(transfer.target(), &NodeId::from("node2"));

    // Looking the transfer up under the target finds nothing.
    assert_eq!(
        network.process_file_transfer("node2", "node1", &file_id, 2),
        StepOutcome::default()
    );
    // The right source with a node which didn't admit the transfer executes nothing.
    assert_eq!(
        network.process_file_transfer("node1", "node1", &file_id, 2),
        StepOutcome::default()
    );
    assert!(network.process_file_transfer("node1", "node2", &file_id, 2).completed);
}

#[test]
fn addresses_and_ids_are_interchangeable() {
    let mut network = two_nodes(KIB, GIB, 1000 * MBPS);
    let transfer = network
        .initiate_file_transfer("10.0.0.2", "node2", "f", 2 * KIB)
        .unwrap();
    let file_id = transfer.file_id().clone();
    assert_eq!(transfer.source(), &NodeId::from("node1"));
    assert_eq!(
        network.process_file_transfer("node1", "10.0.0.3", &file_id, 1).chunks_transferred,
        1
    );
    assert!(network.process_file_transfer("10.0.0.2", "10.0.0.3", &file_id, 1).completed);

    assert_eq!(network.node(Ipv4Addr::new(10, 0, 0, 3)).unwrap().node_id(), &NodeId::from("node2"));
    assert_eq!(
        network.resolve(&NodeRef::from("10.0.0.2")),
        Some(&NodeId::from("node1"))
    );
    assert_eq!(network.resolve(&NodeRef::from("node1")), Some(&NodeId::from("node1")));
    assert_eq!(network.resolve(&NodeRef::from("10.0.0.4")), None);
}

#[test]
fn address_pool_exhausts_deterministically() {
    let mut network = Network::new(1);
    let mut addresses = Vec::new();
    for i in 0..POOL_SIZE {
        addresses.push(network.add_node(Node::new(format!("node{i}"), 1, 1, GIB, MBPS)).unwrap());
    }
    assert_eq!(addresses.len(), 253);
    assert_eq!(addresses[0], Ipv4Addr::new(10, 0, 0, 2));
    assert_eq!(addresses[252], Ipv4Addr::new(10, 0, 0, 254));
    let mut sorted = addresses.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), addresses.len());
    assert!(addresses.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(network.addresses().subnet(), Ipv4Addr::new(10, 0, 0, 0));
    assert_eq!(network.addresses().available(), 0);

    assert_eq!(
        network.add_node(Node::new("one_too_many", 1, 1, GIB, MBPS)),
        Err(NetworkError::AddressPoolExhausted(Ipv4Addr::new(10, 0, 0, 0)))
    );
    assert!(network.node("one_too_many").is_none());
}

#[test]
fn preset_addresses_are_reserved() {
    let mut network = Network::new(1);
    let preset = Ipv4Addr::new(10, 0, 0, 2);
    assert_eq!(
        network.add_node(Node::new("a", 1, 1, GIB, MBPS).with_address(preset)),
        Ok(preset)
    );
    assert_eq!(
        network.add_node(Node::new("b", 1, 1, GIB, MBPS)),
        Ok(Ipv4Addr::new(10, 0, 0, 3))
    );
    assert_eq!(
        network.add_node(Node::new("c", 1, 1, GIB, MBPS).with_address(preset)),
        Err(NetworkError::AddressInUse {
            address: preset,
            owner: NodeId::from("a"),
        })
    );
    let outside = Ipv4Addr::new(192, 168, 1, 1);
    assert_eq!(
        network.add_node(Node::new("d", 1, 1, GIB, MBPS).with_address(outside)),
        Ok(outside)
    );
    assert_eq!(network.node(outside).unwrap().node_id(), &NodeId::from("d"));
    assert!(network.addresses().contains(&outside));
    assert!(!network.addresses().in_pool(&outside));
    assert!(!network.addresses().contains(&Ipv4Addr::new(10, 0, 0, 4)));
    assert_eq!(network.addresses().available(), POOL_SIZE - 2);
}

#[test]
fn registration_conflicts() {
    let mut network = Network::new(1);
    network.add_node(Node::new("a", 1, 1, GIB, MBPS)).unwrap();
    assert_eq!(
        network.add_node(Node::new("a", 1, 1, GIB, MBPS)),
        Err(NetworkError::DuplicateNode(NodeId::from("a")))
    );
    assert_eq!(
        network.add_node(Node::new("10.0.0.7", 1, 1, GIB, MBPS)),
        Err(NetworkError::AmbiguousNodeId(NodeId::from("10.0.0.7")))
    );
    assert_eq!(network.nodes().count(), 1);
    assert_eq!(network.addresses().len(), 1);
}

#[test]
fn reconnect_is_last_write_wins() {
    let mut network = two_nodes(KIB, GIB, 100);
    assert!(network.connect_nodes("node1", "node2", 300));
    let node1 = network.node("node1").unwrap();
    let node2 = network.node("node2").unwrap();
    assert_eq!(node1.link(&NodeId::from("node2")).unwrap().capacity, 300);
    assert_eq!(node2.link(&NodeId::from("node1")).unwrap().capacity, 300);
    assert_eq!(node1.connections().len(), 1);
    assert!(!network.connect_nodes("node1", "10.0.0.2", 300));
}

#[test]
fn chunks_received_directly_by_node() {
    let mut network = two_nodes(KIB, GIB, 1000 * MBPS);
    let file_id = start(&mut network, 3 * KIB);
    let mut transfer = network.transfer("node1", &file_id).unwrap().clone();

    // Receiving a chunk directly on the node doesn't move the registry cursor.
    let mut node2 = network.node("node2").unwrap().clone();
    assert!(node2.process_chunk_transfer(&mut transfer, 0, &NodeId::from("node1")));
    assert!(!node2.process_chunk_transfer(&mut transfer, 0, &NodeId::from("node1")));
    assert!(!node2.process_chunk_transfer(&mut transfer, 7, &NodeId::from("node1")));
    assert!(!node2.process_chunk_transfer(&mut transfer, 1, &NodeId::from("node3")));
    assert_eq!(transfer.status(), TransferStatus::InProgress);
    assert_eq!(transfer.next_chunk_index(), 0);
    assert_eq!(node2.used_storage(), KIB);
}

#[test]
fn node_accounting() {
    let chunking = FixedChunking::new(KIB);
    let mut node = Node::new("t", 2, 4, 10 * KIB, 1000 * MBPS);
    let source = NodeId::from("s");
    node.add_connection(source.clone(), 1000 * MBPS);
    let mut transfer = node
        .initiate_file_transfer(FileId::from("f"), "f.bin", 3 * KIB, &source, &chunking)
        .unwrap();
    assert_eq!(transfer.status(), TransferStatus::Pending);
    assert_eq!(node.used_storage(), 0);

    for chunk_id in 0..3 {
        assert!(node.process_chunk_transfer(&mut transfer, chunk_id, &source));
        assert_eq!(node.network_utilization(), 0);
        assert_eq!(node.used_storage(), (chunk_id + 1) * KIB);
    }
    assert_eq!(transfer.status(), TransferStatus::Completed);
    assert_eq!(transfer.transferred_bytes(), 3 * KIB);
    assert_eq!(node.completed_transfers(), 1);
    assert!(node.busy_time() > 0.0);
    let stored = &node.stored_files()[&FileId::from("f")];
    assert_eq!(stored.size, 3 * KIB);
    assert_eq!(stored.chunks, 3);
    assert_eq!(stored.source, source);

    let utilization = node.storage_utilization();
    assert_eq!(utilization.used_bytes, 3 * KIB);
    assert_eq!(utilization.total_bytes, 10 * KIB);
    assert!((utilization.utilization_percent - 30.0).abs() < 1e-9);
    assert_eq!(node.cpu_capacity(), 2);
    assert_eq!(node.memory_capacity(), 4);
}

#[test]
fn stats_of_empty_network() {
    let network = Network::new(1);
    let stats = network.get_network_stats();
    assert_eq!(stats.total_nodes, 0);
    assert_eq!(stats.bandwidth_utilization, 0.0);
    assert_eq!(stats.storage_utilization, 0.0);

    let node = Node::new("empty", 0, 0, 0, 0);
    assert_eq!(node.storage_utilization().utilization_percent, 0.0);
}

#[test]
fn active_transfers_drop_by_one_per_completion() {
    let mut network = two_nodes(KIB, GIB, 1000 * MBPS);
    let first = start(&mut network, 2 * KIB);
    let second = start(&mut network, 2 * KIB);
    assert_ne!(first, second);
    let reverse = network
        .initiate_file_transfer("node2", "node1", "back.bin", KIB)
        .unwrap()
        .file_id()
        .clone();
    assert_eq!(network.get_network_stats().active_transfers, 3);
    assert!(network.process_file_transfer("node1", "node2", &second, 2).completed);
    assert_eq!(network.get_network_stats().active_transfers, 2);
    assert!(network.process_file_transfer("node2", "node1", &reverse, 2).completed);
    assert_eq!(network.get_network_stats().active_transfers, 1);
    assert_eq!(network.node("node1").unwrap().used_storage(), KIB);
    assert!(network.transfer("node1", &first).is_some());
}

#[test]
fn file_ids_are_deterministic_per_seed() {
    let ids = |seed| {
        let mut network = Network::new(seed);
        network.add_node(Node::new("a", 1, 1, GIB, MBPS)).unwrap();
        network.add_node(Node::new("b", 1, 1, GIB, MBPS)).unwrap();
        (0..3)
            .map(|_| {
                network
                    .initiate_file_transfer("a", "b", "f", 1)
                    .unwrap()
                    .file_id()
                    .clone()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(5), ids(5));
    assert_ne!(ids(5), ids(6));
    assert!(ids(5).iter().all(|id| id.as_str().len() == 32));
}

#[test]
fn transfer_state_machine() {
    let mut transfer = FileTransfer::new(
        FileId::from("f"),
        "f",
        3,
        NodeId::from("s"),
        NodeId::from("t"),
        1,
    );
    assert_eq!(transfer.chunks().len(), 3);
    assert_eq!(transfer.status(), TransferStatus::Pending);
    assert!(!transfer.status().is_terminal());
    assert!(transfer.chunk(2).is_some());
    assert!(transfer.chunk(3).is_none());
    assert_eq!(transfer.next_chunk().unwrap().chunk_id, 0);
}

#[test]
fn subnet_keeps_first_three_octets() {
    let addresses = AddressSpace::new(Ipv4Addr::new(192, 168, 1, 77));
    assert_eq!(addresses.subnet(), Ipv4Addr::new(192, 168, 1, 0));
    assert_eq!(addresses.next_free(), Some(Ipv4Addr::new(192, 168, 1, 2)));
}

#[test]
fn huge_capacities_do_not_overflow() {
    let half = 1u64 << 63;
    let mut network = Network::with_config(AddressSpace::default(), Box::new(FixedChunking::new(half)), 1);
    network.add_node(Node::new("node1", 1, 1, u64::MAX, u64::MAX)).unwrap();
    network.add_node(Node::new("node2", 1, 1, u64::MAX, u64::MAX)).unwrap();
    assert!(network.connect_nodes("node1", "node2", u64::MAX));

    let first = start(&mut network, half);
    let second = start(&mut network, half);
    assert_eq!(
        network.process_file_transfer("node1", "node2", &first, 1),
        StepOutcome {
            chunks_transferred: 1,
            completed: true,
        }
    );
    // Storing the second file would need 2^64 bytes.
    assert_eq!(
        network.process_file_transfer("node1", "node2", &second, 1),
        StepOutcome::default()
    );
    assert_eq!(network.node("node2").unwrap().used_storage(), half);

    let stats = network.get_network_stats();
    assert_eq!(stats.total_storage_bytes, u64::MAX);
    assert_eq!(stats.total_bandwidth_bps, u64::MAX);
    assert_eq!(stats.used_storage_bytes, half);
    assert_eq!(stats.active_transfers, 1);
}
