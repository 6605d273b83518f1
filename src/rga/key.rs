use core::cmp::Reverse;
use core::fmt;

use crate::ReplicaId;

/// Identity shared by a chunk and every piece it is later split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId {
    /// Replica that inserted the chunk.
    pub replica_id: ReplicaId,
    /// Session of that replica.
    pub session: u32,
    /// State-vector sum when the chunk was inserted.
    pub ssv: u64,
}

/// Identifier of a run of characters: the chunk it was inserted as plus
/// the slice `offset..offset + length` of that chunk's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Key {
    replica_id: ReplicaId,
    session: u32,
    ssv: u64,
    offset: usize,
    length: usize,
}

impl Key {
    /// Key of the slice `offset..offset + length` of a chunk.
    pub fn new(replica_id: ReplicaId, session: u32, ssv: u64, offset: usize, length: usize) -> Self {
        Self {
            replica_id,
            session,
            ssv,
            offset,
            length,
        }
    }

    /// Replica that inserted the chunk.
    #[must_use]
    pub fn replica_id(&self) -> ReplicaId {
        self.replica_id
    }

    /// Session the chunk was inserted in.
    #[must_use]
    pub fn session(&self) -> u32 {
        self.session
    }

    /// Sum of the issuing replica's state vector when the key was minted.
    #[must_use]
    pub fn ssv(&self) -> u64 {
        self.ssv
    }

    /// First character covered, relative to the chunk.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of characters covered.
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Offset one past the last character covered.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Identity of the chunk the slice belongs to.
    #[must_use]
    pub fn chunk_id(&self) -> ChunkId {
        ChunkId {
            replica_id: self.replica_id,
            session: self.session,
            ssv: self.ssv,
        }
    }

    /// Check if the absolute `offset` falls inside this slice.
    #[must_use]
    pub fn contains(&self, offset: usize) -> bool {
        self.offset <= offset && offset < self.end()
    }

    /// The sub-slice starting `start` characters into this one.
    #[must_use]
    pub fn slice(&self, start: usize, length: usize) -> Self {
        Self {
            offset: self.offset + start,
            length,
            ..*self
        }
    }

    /// Predecessor order: session, then ssv, then replica, then descending
    /// offset.
    ///
    /// Among chunks anchored at the same character, a chunk whose key
    /// precedes the other's is placed closer to the anchor.
    #[must_use]
    pub fn precedes(&self, other: &Key) -> bool {
        self.rank() > other.rank()
    }

    fn rank(&self) -> (u32, u64, ReplicaId, Reverse<usize>) {
        (self.session, self.ssv, self.replica_id, Reverse(self.offset))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{}",
            self.replica_id, self.session, self.ssv, self.offset, self.length
        )
    }
}
