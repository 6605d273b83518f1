use core::cmp::Ordering;
use core::fmt;

use crate::ReplicaId;

/// Identifier of a WOOT character.
///
/// Real characters are identified by the replica that created them and
/// that replica's clock at the time. Every sequence is bounded by the two
/// boundary identifiers, which are never deleted and never compared as
/// content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "camelCase")
)]
pub enum Id {
    /// Left boundary of every sequence.
    Begin,
    /// Right boundary of every sequence.
    End,
    /// A character created by `replica_id` at `clock`.
    Char {
        /// Replica that created the character.
        #[cfg_attr(feature = "serde", serde(rename = "replicaId"))]
        replica_id: ReplicaId,
        /// Per-replica counter, starting at 1.
        clock: u64,
    },
}

impl Id {
    /// Identifier of a character created by `replica_id` at `clock`.
    pub fn new(replica_id: ReplicaId, clock: u64) -> Self {
        Self::Char { replica_id, clock }
    }

    /// Check if this is one of the two boundary identifiers.
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::Begin | Self::End)
    }

    /// Replica that created the character, `None` for boundaries.
    #[must_use]
    pub fn replica_id(&self) -> Option<ReplicaId> {
        match self {
            Self::Char { replica_id, .. } => Some(*replica_id),
            Self::Begin | Self::End => None,
        }
    }
}

impl Ord for Id {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Begin, Self::Begin) | (Self::End, Self::End) => Ordering::Equal,
            (Self::Begin, _) | (_, Self::End) => Ordering::Less,
            (Self::End, _) | (_, Self::Begin) => Ordering::Greater,
            (
                Self::Char {
                    replica_id: a,
                    clock: ca,
                },
                Self::Char {
                    replica_id: b,
                    clock: cb,
                },
            ) => a.cmp(b).then(ca.cmp(cb)),
        }
    }
}

impl PartialOrd for Id {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Begin => f.write_str("begin"),
            Self::End => f.write_str("end"),
            Self::Char { replica_id, clock } => write!(f, "{replica_id}/{clock}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replica_dominates_clock() {
        assert!(Id::new(0, 9) < Id::new(1, 1));
        assert!(Id::new(1, 1) < Id::new(1, 2));
    }

    #[test]
    fn boundaries_enclose_content() {
        let id = Id::new(u32::MAX, u64::MAX);
        assert!(Id::Begin < id);
        assert!(id < Id::End);
        assert!(Id::Begin < Id::End);
    }

    #[test]
    fn display() {
        assert_eq!(Id::new(3, 7).to_string(), "3/7");
        assert_eq!(Id::Begin.to_string(), "begin");
    }
}
