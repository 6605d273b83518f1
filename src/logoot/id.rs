use core::fmt;

use crate::ReplicaId;

/// Smallest digit of a position segment.
pub const MIN: u64 = 0;
/// Digit range of the first level of the tree; deeper levels double it.
pub const BASE: u64 = 1 << 8;
/// Upper bound of any digit, the largest integer an `f64` holds exactly.
pub const MAX: u64 = (1 << 53) - 1;

/// One segment of a Logoot position.
///
/// Segments order by digit, then replica, then clock. Boundary segments
/// and prefixes borrowed from a shorter neighbour carry no replica and no
/// clock, and sort before any tagged segment with the same digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Id {
    num: u64,
    replica_id: Option<ReplicaId>,
    clock: Option<u64>,
}

impl Id {
    /// A segment allocated by `replica_id` at `clock`.
    pub fn new(num: u64, replica_id: ReplicaId, clock: u64) -> Self {
        Self {
            num,
            replica_id: Some(replica_id),
            clock: Some(clock),
        }
    }

    /// A segment that belongs to no replica.
    pub fn anonymous(num: u64) -> Self {
        Self {
            num,
            replica_id: None,
            clock: None,
        }
    }

    /// The digit.
    #[must_use]
    pub fn num(&self) -> u64 {
        self.num
    }

    /// Replica that owns the segment, if any.
    #[must_use]
    pub fn replica_id(&self) -> Option<ReplicaId> {
        self.replica_id
    }

    /// Clock of the owning replica when the segment was allocated.
    #[must_use]
    pub fn clock(&self) -> Option<u64> {
        self.clock
    }

    /// Check if no replica owns this segment.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.replica_id.is_none()
    }

    /// The same segment claimed by `replica_id`.
    #[must_use]
    pub fn claimed_by(self, replica_id: ReplicaId) -> Self {
        Self {
            replica_id: Some(replica_id),
            ..self
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.num)?;
        match self.replica_id {
            Some(replica_id) => write!(f, "/{replica_id}")?,
            None => f.write_str("/-")?,
        }
        match self.clock {
            Some(clock) => write!(f, "/{clock}"),
            None => f.write_str("/-"),
        }
    }
}
