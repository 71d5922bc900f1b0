//! File transfers and their chunks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::node_ref::NodeId;

pub type ChunkId = u64;

/// Identifier of a file in flight, unique per admission.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        FileId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(id: &str) -> Self {
        FileId(id.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChunkStatus {
    Pending,
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStatus {
    /// Admitted, no chunk has arrived yet.
    Pending,
    /// At least one chunk has arrived.
    InProgress,
    /// Every chunk has arrived.
    Completed,
}

impl TransferStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Completed)
    }
}

/// Slice of a file, the unit of transfer progress.
#[derive(Clone, Debug, Serialize)]
pub struct Chunk {
    pub chunk_id: ChunkId,
    /// Size in bytes.
    pub size: u64,
    pub status: ChunkStatus,
}

impl Chunk {
    pub fn is_completed(&self) -> bool {
        self.status == ChunkStatus::Completed
    }
}

/// Splits `file_size` into chunks of `chunk_size` bytes, the last one carrying the remainder.
///
/// An empty file still gets one empty chunk so that its transfer can complete.
pub fn split_into_chunks(file_size: u64, chunk_size: u64) -> Vec<Chunk> {
    let chunk_size = chunk_size.max(1);
    let chunks_count = file_size.div_ceil(chunk_size).max(1);
    (0..chunks_count)
        .map(|chunk_id| Chunk {
            chunk_id,
            size: chunk_size.min(file_size - chunk_id * chunk_size),
            status: ChunkStatus::Pending,
        })
        .collect()
}

/// A file in flight between two nodes.
#[derive(Clone, Debug, Serialize)]
pub struct FileTransfer {
    file_id: FileId,
    file_name: String,
    file_size: u64,
    source: NodeId,
    target: NodeId,
    chunks: Vec<Chunk>,
    next_chunk_index: usize,
    status: TransferStatus,
}

impl FileTransfer {
    /// Creates a pending transfer with `file_size` split into chunks of `chunk_size` bytes.
    pub fn new(
        file_id: FileId,
        file_name: impl Into<String>,
        file_size: u64,
        source: NodeId,
        target: NodeId,
        chunk_size: u64,
    ) -> Self {
        FileTransfer {
            file_id,
            file_name: file_name.into(),
            file_size,
            source,
            target,
            chunks: split_into_chunks(file_size, chunk_size),
            next_chunk_index: 0,
            status: TransferStatus::Pending,
        }
    }

    pub fn file_id(&self) -> &FileId {
        &self.file_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn source(&self) -> &NodeId {
        &self.source
    }

    pub fn target(&self) -> &NodeId {
        &self.target
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk(&self, chunk_id: ChunkId) -> Option<&Chunk> {
        self.chunks.iter().find(|chunk| chunk.chunk_id == chunk_id)
    }

    /// Position of the first chunk which was not yet delivered by the step protocol.
    pub fn next_chunk_index(&self) -> usize {
        self.next_chunk_index
    }

    /// Chunk under the cursor, `None` once the cursor has passed the last chunk.
    pub fn next_chunk(&self) -> Option<&Chunk> {
        self.chunks.get(self.next_chunk_index)
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    pub fn completed_chunks(&self) -> usize {
        self.chunks.iter().filter(|chunk| chunk.is_completed()).count()
    }

    /// Bytes of completed chunks.
    pub fn transferred_bytes(&self) -> u64 {
        self.chunks
            .iter()
            .filter(|chunk| chunk.is_completed())
            .map(|chunk| chunk.size)
            .sum()
    }

    /// Moves the cursor past chunks which are already completed. Idempotent.
    pub(crate) fn skip_completed_chunks(&mut self) {
        while self.next_chunk().is_some_and(Chunk::is_completed) {
            self.next_chunk_index += 1;
        }
    }

    pub(crate) fn advance_cursor(&mut self) {
        if self.next_chunk_index < self.chunks.len() {
            self.next_chunk_index += 1;
        }
    }

    /// Marks a chunk as completed and updates transfer status. Returns chunk size.
    pub(crate) fn complete_chunk(&mut self, chunk_index: usize) -> u64 {
        let chunk = &mut self.chunks[chunk_index];
        chunk.status = ChunkStatus::Completed;
        let size = chunk.size;
        self.status = if self.chunks.iter().all(Chunk::is_completed) {
            TransferStatus::Completed
        } else {
            TransferStatus::InProgress
        };
        size
    }

    pub(crate) fn chunk_index(&self, chunk_id: ChunkId) -> Option<usize> {
        self.chunks.iter().position(|chunk| chunk.chunk_id == chunk_id)
    }
}
