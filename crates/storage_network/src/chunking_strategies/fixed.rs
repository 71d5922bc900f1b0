use crate::chunking_strategy::ChunkingStrategy;

/// Splits every file into chunks of the same configured size.
pub struct FixedChunking {
    chunk_size: u64,
}

impl FixedChunking {
    /// Zero is clamped to one byte.
    pub fn new(chunk_size: u64) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }
}

impl ChunkingStrategy for FixedChunking {
    fn chunk_size(&self, _file_size: u64) -> u64 {
        self.chunk_size
    }
}
