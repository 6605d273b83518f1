use core::fmt;

use super::{Key, Tree};

/// Snapshot of the visible chunks of a [`Tree`].
///
/// Local edits translate visible indices into keys through the view. It is
/// rebuilt with [`View::synchronize`] after every change to the tree.
#[derive(Debug, Clone, Default)]
pub struct View {
    chunks: Vec<(Key, String)>,
    len: usize,
}

impl View {
    /// An empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the visible chunks of `tree`.
    pub fn synchronize(&mut self, tree: &Tree) {
        self.chunks.clear();
        self.chunks.extend(
            tree.leaves()
                .filter(|chunk| chunk.visible)
                .map(|chunk| (chunk.key, chunk.value.clone())),
        );
        self.len = self.chunks.iter().map(|(key, _)| key.length()).sum();
    }

    /// Number of visible characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if no character is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The chunk holding the character before `position`, with the number
    /// of its characters up to and including that one.
    ///
    /// `None` at the start of the document and past its end.
    #[must_use]
    pub fn node_at_position(&self, position: usize) -> Option<(Key, usize)> {
        if position == 0 {
            return None;
        }
        let mut before = 0;
        for (key, _) in &self.chunks {
            if before + key.length() >= position {
                return Some((*key, position - before));
            }
            before += key.length();
        }
        None
    }

    /// Keys of the slices covering the `length` characters from `start`.
    #[must_use]
    pub fn slices(&self, start: usize, length: usize) -> Vec<Key> {
        let end = start + length;
        let mut slices = Vec::new();
        let mut before = 0;
        for (key, _) in &self.chunks {
            if before >= end {
                break;
            }
            let from = start.max(before);
            let to = end.min(before + key.length());
            if from < to {
                slices.push(key.slice(from - before, to - from));
            }
            before += key.length();
        }
        slices
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chunks
            .iter()
            .try_for_each(|(_, value)| f.write_str(value))
    }
}
