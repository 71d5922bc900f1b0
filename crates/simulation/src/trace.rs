use serde::{Deserialize, Serialize};

use crate::system::NodeConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TraceEvent {
    TransferInitiated {
        step: usize,
        transfer: usize,
        file_id: String,
        source: String,
        target: String,
        chunks: usize,
    },
    AdmissionRejected {
        step: usize,
        transfer: usize,
    },
    ChunksTransferred {
        step: usize,
        transfer: usize,
        chunks: usize,
    },
    Stalled {
        step: usize,
        transfer: usize,
        next_chunk: usize,
    },
    TransferCompleted {
        step: usize,
        transfer: usize,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trace {
    pub nodes: Vec<NodeConfig>,
    pub events: Vec<TraceEvent>,
}

impl Trace {
    pub fn new(nodes: Vec<NodeConfig>) -> Self {
        Self {
            nodes,
            events: Vec::new(),
        }
    }

    pub fn log(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}
