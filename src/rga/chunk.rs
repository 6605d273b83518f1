use super::{ChunkId, Key};

pub(crate) type ChunkIndex = usize;

/// A character addressed by its chunk and absolute offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CharRef {
    pub chunk: ChunkId,
    pub offset: usize,
}

/// A run of characters in the split tree.
///
/// Leaves are linked into the document list. A split chunk leaves the list
/// and keeps its two or three children so that keys naming the whole run
/// still resolve.
#[derive(Debug, Clone)]
pub(crate) struct Chunk {
    pub key: Key,
    pub value: String,
    pub visible: bool,
    /// Character this run was inserted after.
    pub origin: Option<CharRef>,
    pub children: Vec<ChunkIndex>,
    pub previous: Option<ChunkIndex>,
    pub next: Option<ChunkIndex>,
}

impl Chunk {
    pub fn new(key: Key, value: String, visible: bool, origin: Option<CharRef>) -> Self {
        Self {
            key,
            value,
            visible,
            origin,
            children: Vec::new(),
            previous: None,
            next: None,
        }
    }

    pub fn is_split(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Characters `start..end` of `value`.
pub(crate) fn char_slice(value: &str, start: usize, end: usize) -> &str {
    let byte = |n: usize| {
        value
            .char_indices()
            .nth(n)
            .map_or(value.len(), |(index, _)| index)
    };
    &value[byte(start)..byte(end)]
}
