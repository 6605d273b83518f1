use std::collections::{HashMap, HashSet};

use tracing::{debug, trace, warn};

use super::chunk::{char_slice, CharRef, Chunk, ChunkIndex};
use super::{ChunkId, Key, Operation, Payload, VectorClock};
use crate::ReplicaId;

/// Chunk list and split tree of one RGA replica.
///
/// Every inserted run is a chunk, found by its [`ChunkId`] through the
/// index. Inserting inside a run or deleting part of it splits the chunk;
/// the pieces take its place in the list while the chunk stays in the
/// arena as the root of their split tree.
#[derive(Debug, Clone)]
pub struct Tree {
    replica_id: ReplicaId,
    chunks: Vec<Chunk>,
    index: HashMap<ChunkId, ChunkIndex>,
    head: Option<ChunkIndex>,
    clock: VectorClock,
    /// Highest `ssv` of any key integrated so far.
    max_ssv: u64,
    pending: Vec<Operation>,
}

impl Tree {
    /// An empty tree owned by `replica_id`.
    pub fn new(replica_id: ReplicaId) -> Self {
        Self {
            replica_id,
            chunks: Vec::new(),
            index: HashMap::new(),
            head: None,
            clock: VectorClock::new(),
            max_ssv: 0,
            pending: Vec::new(),
        }
    }

    /// Tick the clock of `replica_id`, or of this replica, and return the
    /// new sum.
    pub fn increment_vector_clock(&mut self, replica_id: Option<ReplicaId>) -> u64 {
        self.clock.increment(replica_id.unwrap_or(self.replica_id));
        self.clock.sum()
    }

    /// Tick this replica's clock for a new local key and return its `ssv`.
    ///
    /// The sum alone can lag behind keys already integrated here. When it
    /// does, the local counter jumps so that the new key outranks every
    /// key this replica has seen, which keeps a local insert right after
    /// its anchor.
    pub(crate) fn next_ssv(&mut self) -> u64 {
        let ssv = self.increment_vector_clock(None);
        if ssv > self.max_ssv {
            return ssv;
        }
        self.clock.advance(self.replica_id, self.max_ssv + 1 - ssv);
        self.clock.sum()
    }

    /// Operations seen so far, per replica.
    #[must_use]
    pub fn vector_clock(&self) -> &VectorClock {
        &self.clock
    }

    /// Number of received operations waiting for the chunks they name.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of visible characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.leaves()
            .filter(|chunk| chunk.visible)
            .map(|chunk| chunk.key.length())
            .sum()
    }

    /// Check if no character is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visible text in document order.
    #[must_use]
    pub fn value(&self) -> String {
        self.leaves()
            .filter(|chunk| chunk.visible)
            .map(|chunk| chunk.value.as_str())
            .collect()
    }

    /// Chunks of the document list, tombstones included.
    pub(crate) fn leaves(&self) -> impl Iterator<Item = &Chunk> + '_ {
        let mut cursor = self.head;
        core::iter::from_fn(move || {
            let chunk = &self.chunks[cursor?];
            cursor = chunk.next;
            Some(chunk)
        })
    }

    /// Integrate a remote operation, or keep it until the chunks it names
    /// are known.
    pub fn receive(&mut self, operation: Operation) {
        if self.is_ready(&operation) {
            self.integrate(&operation);
        } else if self.pending.contains(&operation) {
            trace!(replica = self.replica_id, key = %operation.key(), "operation already pending");
        } else {
            debug!(replica = self.replica_id, key = %operation.key(), "deferring operation");
            self.pending.push(operation);
        }
    }

    /// Apply an operation whose chunks are known, then retry pending ones.
    pub fn integrate(&mut self, operation: &Operation) {
        self.apply(operation);
        while let Some(ready) = self.pending.iter().position(|op| self.is_ready(op)) {
            let operation = self.pending.swap_remove(ready);
            trace!(replica = self.replica_id, key = %operation.key(), "integrating deferred operation");
            self.apply(&operation);
        }
    }

    fn is_ready(&self, operation: &Operation) -> bool {
        match operation.payload() {
            Payload::Insert { .. } => operation
                .target_key()
                .map_or(true, |target| self.index.contains_key(&target.chunk_id())),
            Payload::Delete { key_list, .. } => key_list
                .iter()
                .all(|key| self.index.contains_key(&key.chunk_id())),
        }
    }

    fn apply(&mut self, operation: &Operation) {
        let key = operation.key();
        match operation.payload() {
            Payload::Insert { value } => {
                if self.index.contains_key(&key.chunk_id()) {
                    trace!(replica = self.replica_id, %key, "duplicate insert");
                    return;
                }
                self.integrate_insert(operation.target_key(), operation.position(), value, key);
            }
            Payload::Delete {
                del_length,
                key_list,
            } => self.integrate_delete(operation.position(), *del_length, key_list),
        }
        self.max_ssv = self.max_ssv.max(key.ssv());
        if key.replica_id() != self.replica_id {
            self.clock.increment(key.replica_id());
        }
    }

    fn integrate_insert(&mut self, target: Option<&Key>, position: usize, value: &str, key: &Key) {
        let (anchor, origin) = match target {
            None => (None, None),
            Some(target) => {
                let id = target.chunk_id();
                let root = self.index[&id];
                let Some((offset, mut leaf)) = (target.offset() + position)
                    .checked_sub(1)
                    .and_then(|offset| Some((offset, self.find_leaf(root, offset)?)))
                else {
                    warn!(
                        replica = self.replica_id,
                        %key,
                        %target,
                        position,
                        "dropping insert after a missing character"
                    );
                    return;
                };
                let leaf_key = self.chunks[leaf].key;
                if offset + 1 < leaf_key.end() {
                    leaf = self.split(leaf, &[offset + 1 - leaf_key.offset()])[0];
                }
                (Some(leaf), Some(CharRef { chunk: id, offset }))
            }
        };

        // Skip concurrent runs anchored at the same character that order
        // first, along with everything inserted inside them.
        let mut cursor = anchor.map_or(self.head, |anchor| self.chunks[anchor].next);
        let mut previous = anchor;
        let mut skipped = HashSet::new();
        while let Some(current) = cursor {
            let chunk = &self.chunks[current];
            let skip = if chunk.origin == origin {
                let continuation = matches!(origin, Some(o) if o.chunk == chunk.key.chunk_id());
                !continuation && chunk.key.precedes(key)
            } else {
                chunk
                    .origin
                    .and_then(|o| self.leaf_of(o))
                    .map_or(false, |leaf| skipped.contains(&leaf))
            };
            if !skip {
                break;
            }
            skipped.insert(current);
            previous = Some(current);
            cursor = chunk.next;
        }

        trace!(replica = self.replica_id, %key, after = ?previous, "linking chunk");
        let chunk = Chunk::new(
            Key::new(key.replica_id(), key.session(), key.ssv(), 0, value.chars().count()),
            value.to_owned(),
            true,
            origin,
        );
        let index = self.alloc(chunk);
        self.index.insert(key.chunk_id(), index);
        self.link_after(index, previous);
    }

    fn integrate_delete(&mut self, position: usize, del_length: usize, key_list: &[Key]) {
        let mut remaining = del_length;
        for (i, key) in key_list.iter().enumerate() {
            if remaining == 0 {
                break;
            }
            let Some(&root) = self.index.get(&key.chunk_id()) else {
                warn!(replica = self.replica_id, %key, "delete of unknown chunk");
                continue;
            };
            let start = key.offset() + if i == 0 { position } else { 0 };
            let length = key.end().saturating_sub(start).min(remaining);
            self.recursive_delete(root, start, start + length);
            remaining -= length;
        }
    }

    /// Hide the absolute offsets `start..end` below `index`.
    fn recursive_delete(&mut self, index: ChunkIndex, start: usize, end: usize) {
        let key = self.chunks[index].key;
        let from = start.max(key.offset());
        let to = end.min(key.end());
        if from >= to {
            return;
        }
        if self.chunks[index].is_split() {
            for child in self.chunks[index].children.clone() {
                self.recursive_delete(child, start, end);
            }
            return;
        }
        let (low, high) = (from - key.offset(), to - key.offset());
        let hidden = match (low == 0, high == key.length()) {
            (true, true) => index,
            (true, false) => self.split(index, &[high])[0],
            (false, true) => self.split(index, &[low])[1],
            (false, false) => self.split(index, &[low, high])[1],
        };
        self.chunks[hidden].visible = false;
    }

    fn alloc(&mut self, chunk: Chunk) -> ChunkIndex {
        self.chunks.push(chunk);
        self.chunks.len() - 1
    }

    /// Leaf holding the absolute `offset` below `index`.
    fn find_leaf(&self, mut index: ChunkIndex, offset: usize) -> Option<ChunkIndex> {
        loop {
            let chunk = &self.chunks[index];
            if !chunk.key.contains(offset) {
                return None;
            }
            if !chunk.is_split() {
                return Some(index);
            }
            index = chunk
                .children
                .iter()
                .copied()
                .find(|&child| self.chunks[child].key.contains(offset))?;
        }
    }

    fn leaf_of(&self, char: CharRef) -> Option<ChunkIndex> {
        self.find_leaf(*self.index.get(&char.chunk)?, char.offset)
    }

    /// Cut the leaf at `index` at the given relative offsets and put the
    /// pieces in its place in the list.
    fn split(&mut self, index: ChunkIndex, cuts: &[usize]) -> Vec<ChunkIndex> {
        let chunk = &self.chunks[index];
        assert!(!chunk.is_split(), "chunk {} is already split", chunk.key);
        let key = chunk.key;
        let bounds: Vec<usize> = core::iter::once(0)
            .chain(cuts.iter().copied())
            .chain(core::iter::once(key.length()))
            .collect();

        let mut pieces = Vec::with_capacity(bounds.len() - 1);
        for bound in bounds.windows(2) {
            let (start, end) = (bound[0], bound[1]);
            assert!(start < end, "invalid cut {start}..{end} of chunk {key}");
            let chunk = &self.chunks[index];
            let origin = if start == 0 {
                chunk.origin
            } else {
                Some(CharRef {
                    chunk: key.chunk_id(),
                    offset: key.offset() + start - 1,
                })
            };
            let piece = Chunk::new(
                key.slice(start, end - start),
                char_slice(&chunk.value, start, end).to_owned(),
                chunk.visible,
                origin,
            );
            pieces.push(self.alloc(piece));
        }

        let previous = self.unlink(index);
        let mut after = previous;
        for &piece in &pieces {
            self.link_after(piece, after);
            after = Some(piece);
        }
        let chunk = &mut self.chunks[index];
        chunk.value.clear();
        chunk.children = pieces.clone();
        pieces
    }

    fn link_after(&mut self, index: ChunkIndex, after: Option<ChunkIndex>) {
        let next = match after {
            Some(after) => self.chunks[after].next.replace(index),
            None => self.head.replace(index),
        };
        if let Some(next) = next {
            self.chunks[next].previous = Some(index);
        }
        let chunk = &mut self.chunks[index];
        chunk.previous = after;
        chunk.next = next;
    }

    /// Take `index` out of the list, returning its predecessor.
    fn unlink(&mut self, index: ChunkIndex) -> Option<ChunkIndex> {
        let chunk = &mut self.chunks[index];
        let (previous, next) = (chunk.previous.take(), chunk.next.take());
        match previous {
            Some(previous) => self.chunks[previous].next = next,
            None => self.head = next,
        }
        if let Some(next) = next {
            self.chunks[next].previous = previous;
        }
        previous
    }
}
