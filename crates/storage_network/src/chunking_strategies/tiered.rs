use crate::{
    chunking_strategy::ChunkingStrategy,
    units::{KIB, MIB},
};

/// Picks larger chunks for larger files.
///
/// | file size         | chunk size |
/// |-------------------|------------|
/// | < 10 MiB          | 512 KiB    |
/// | 10 MiB .. 100 MiB | 2 MiB      |
/// | >= 100 MiB        | 10 MiB     |
pub struct TieredChunking {
    tiers: Vec<(u64, u64)>,
    largest: u64,
}

impl TieredChunking {
    pub fn new() -> Self {
        Self::with_tiers(vec![(10 * MIB, 512 * KIB), (100 * MIB, 2 * MIB)], 10 * MIB)
    }

    /// `tiers` are `(exclusive upper bound on file size, chunk size)` pairs,
    /// `largest` is used for files above every bound.
    pub fn with_tiers(mut tiers: Vec<(u64, u64)>, largest: u64) -> Self {
        tiers.sort_by_key(|&(bound, _)| bound);
        Self {
            tiers: tiers.into_iter().map(|(bound, size)| (bound, size.max(1))).collect(),
            largest: largest.max(1),
        }
    }
}

impl Default for TieredChunking {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkingStrategy for TieredChunking {
    fn chunk_size(&self, file_size: u64) -> u64 {
        self.tiers
            .iter()
            .find(|&&(bound, _)| file_size < bound)
            .map(|&(_, size)| size)
            .unwrap_or(self.largest)
    }
}
