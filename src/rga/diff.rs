//! Single-edit diff between two versions of a text.
//!
//! All indices count characters, not bytes.

/// The edit turning an old text into a new one: the old range
/// `start..end` is replaced by `inserted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    /// First replaced character of the old text.
    pub start: usize,
    /// One past the last replaced character of the old text.
    pub end: usize,
    /// Text put in place of the range.
    pub inserted: String,
}

impl Diff {
    /// Number of characters removed from the old text.
    #[must_use]
    pub fn deleted(&self) -> usize {
        self.end - self.start
    }

    /// Check if the texts were equal.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.start == self.end && self.inserted.is_empty()
    }
}

/// Compute the edit from `old` to `new` given the caret position in `new`
/// right after the edit.
///
/// The common suffix is trimmed first, never past the caret, then the
/// common prefix. The caret resolves the ambiguity of repeated characters:
/// typing `a` at index 1 of `aaa` yields an insertion at index 1.
#[must_use]
pub fn diff(old: &str, new: &str, cursor: usize) -> Diff {
    let old: Vec<char> = old.chars().collect();
    let new: Vec<char> = new.chars().collect();
    let cursor = cursor.min(new.len());
    let delta = new.len() as isize - old.len() as isize;

    let limit = (cursor as isize - delta).max(0) as usize;
    let mut end = old.len();
    while end > limit && old[end - 1] == new[(end as isize + delta - 1) as usize] {
        end -= 1;
    }

    let start_limit = (cursor as isize - delta.max(0)).max(0) as usize;
    let mut start = 0;
    while start < start_limit && start < end && old[start] == new[start] {
        start += 1;
    }

    let inserted_end = (end as isize + delta) as usize;
    Diff {
        start,
        end,
        inserted: new[start..inserted_end].iter().collect(),
    }
}

/// Caret position that makes [`diff`] report the minimal edit between
/// `old` and `new` when no caret is known.
#[must_use]
pub fn implied_cursor(old: &str, new: &str) -> usize {
    let prefix = old
        .chars()
        .zip(new.chars())
        .take_while(|(a, b)| a == b)
        .count();
    let shortest = old.chars().count().min(new.chars().count());
    let suffix = old
        .chars()
        .rev()
        .zip(new.chars().rev())
        .take(shortest - prefix)
        .take_while(|(a, b)| a == b)
        .count();
    new.chars().count() - suffix
}
