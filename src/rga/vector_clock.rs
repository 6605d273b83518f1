use std::collections::BTreeMap;

use crate::ReplicaId;

/// Per-replica operation counters.
///
/// Only the sum is used: it stamps the `ssv` of freshly minted keys. The
/// sum grows with every local operation, which keeps a replica's keys
/// unique, but it is not a causal timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VectorClock {
    clocks: BTreeMap<ReplicaId, u64>,
}

impl VectorClock {
    /// An empty clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick the counter of `replica_id`.
    pub fn increment(&mut self, replica_id: ReplicaId) {
        self.advance(replica_id, 1);
    }

    /// Add `by` to the counter of `replica_id`.
    pub fn advance(&mut self, replica_id: ReplicaId, by: u64) {
        *self.clocks.entry(replica_id).or_insert(0) += by;
    }

    /// Counter of `replica_id`, if it ever ticked.
    #[must_use]
    pub fn get(&self, replica_id: ReplicaId) -> Option<u64> {
        self.clocks.get(&replica_id).copied()
    }

    /// Sum of all counters.
    #[must_use]
    pub fn sum(&self) -> u64 {
        self.clocks.values().sum()
    }
}
