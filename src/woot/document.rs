use core::fmt;

use tracing::debug;

use super::{Operation, Sequence};
use crate::{Crdt, Dispatch, ReplicaId};

/// A WOOT replica of a plain-text document.
///
/// Text edits are split into one operation per character. Each local edit
/// hands its operations to the dispatch callback as a single batch.
pub struct Document {
    replica_id: ReplicaId,
    sequence: Sequence,
    dispatch: Dispatch<Operation>,
}

impl Document {
    /// Create an empty document for `replica_id`.
    ///
    /// `dispatch` receives the operations produced by every local edit.
    pub fn new(replica_id: ReplicaId, dispatch: impl FnMut(Vec<Operation>) + 'static) -> Self {
        Self {
            replica_id,
            sequence: Sequence::new(replica_id),
            dispatch: Box::new(dispatch),
        }
    }

    /// The underlying sequence.
    #[must_use]
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Number of received operations still waiting for their neighbours.
    #[must_use]
    pub fn pool_len(&self) -> usize {
        self.sequence.pool_len()
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
        self.sequence.len()
    }

    fn insert(&mut self, text: &str, position: usize) {
        let position = position.min(self.sequence.len());
        let operations = text
            .chars()
            .enumerate()
            .filter_map(|(offset, value)| self.sequence.local_insert(value, position + offset))
            .collect();
        self.dispatch(operations);
    }

    fn delete(&mut self, position: usize, length: usize) {
        let operations = (0..length)
            .map_while(|_| self.sequence.local_delete(position))
            .collect();
        self.dispatch(operations);
    }

    fn apply_operations(&mut self, operations: &[Operation]) {
        for operation in operations {
            if operation.replica_id() != self.replica_id {
                self.sequence.receive(operation.clone());
            }
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sequence.value())
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("replica_id", &self.replica_id)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}
