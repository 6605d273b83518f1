use core::fmt;

use tracing::debug;

use super::{Operation, PositionGenerator, Tree};
use crate::{Crdt, Dispatch, ReplicaId};

/// A Logoot replica of a plain-text document.
pub struct Document {
    replica_id: ReplicaId,
    tree: Tree,
    dispatch: Dispatch<Operation>,
}

impl Document {
    /// Create an empty document for `replica_id`.
    ///
    /// Positions are drawn from an entropy-seeded generator; use
    /// [`Document::with_seed`] for reproducible runs.
    pub fn new(replica_id: ReplicaId, dispatch: impl FnMut(Vec<Operation>) + 'static) -> Self {
        Self::with_generator(replica_id, PositionGenerator::new(replica_id), dispatch)
    }

    /// Create an empty document whose position allocation is driven by `seed`.
    pub fn with_seed(
        replica_id: ReplicaId,
        seed: u64,
        dispatch: impl FnMut(Vec<Operation>) + 'static,
    ) -> Self {
        Self::with_generator(
            replica_id,
            PositionGenerator::with_seed(replica_id, seed),
            dispatch,
        )
    }

    fn with_generator(
        replica_id: ReplicaId,
        generator: PositionGenerator,
        dispatch: impl FnMut(Vec<Operation>) + 'static,
    ) -> Self {
        Self {
            replica_id,
            tree: Tree::new(replica_id, generator),
            dispatch: Box::new(dispatch),
        }
    }

    /// The underlying position tree.
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Number of deletes waiting for the insert they target.
    #[must_use]
    pub fn delete_queue_len(&self) -> usize {
        self.tree.delete_queue_len()
    }

    fn dispatch(&mut self, operations: Vec<Operation>) {
        if operations.is_empty() {
            return;
        }
        debug!(replica = self.replica_id, count = operations.len(), "dispatching operations");
        (self.dispatch)(operations);
    }
}

impl Crdt for Document {
    type Operation = Operation;

    fn replica_id(&self) -> ReplicaId {
        self.replica_id
    }

    fn len(&self) -> usize {
        self.tree.len()
    }

    fn insert(&mut self, text: &str, position: usize) {
        let position = position.min(self.tree.len());
        let operations = text
            .chars()
            .enumerate()
            .filter_map(|(offset, value)| self.tree.local_insert(value, position + offset))
            .collect();
        self.dispatch(operations);
    }

    fn delete(&mut self, position: usize, length: usize) {
        let operations = (0..length)
            .map_while(|_| self.tree.local_delete(position))
            .collect();
        self.dispatch(operations);
    }

    fn apply_operations(&mut self, operations: &[Operation]) {
        let replica_id = self.replica_id;
        operations
            .iter()
            .filter(|operation| operation.replica_id() != replica_id)
            .for_each(|operation| self.tree.receive(operation.clone()));
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tree.value())
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("replica_id", &self.replica_id)
            .field("tree", &self.tree)
            .finish_non_exhaustive()
    }
}
