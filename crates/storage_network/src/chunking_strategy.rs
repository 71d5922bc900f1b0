//! Trait for a chunking strategy.

/// Trait for a chunking strategy.
pub trait ChunkingStrategy {
    /// Function which is called once per every admitted transfer.
    /// * `file_size` --- size of the file in bytes.
    ///
    /// Returns the size of every chunk but the last one, which carries the remainder.
    fn chunk_size(&self, file_size: u64) -> u64;
}
