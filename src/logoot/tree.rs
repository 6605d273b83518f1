use std::collections::HashSet;

use tracing::{debug, trace};

use super::node::{NodeIndex, Nodes, ROOT};
use super::{Id, Operation, OperationKind, PositionGenerator, BASE, MIN};
use crate::ReplicaId;

/// The Logoot trie of one replica.
///
/// The root carries two permanent sentinels at `MIN` and `BASE`; visible
/// characters live strictly between them in preorder. Positions that were
/// deleted are remembered so that a redelivered insert stays deleted.
#[derive(Debug, Clone)]
pub struct Tree {
    replica_id: ReplicaId,
    nodes: Nodes,
    generator: PositionGenerator,
    delete_queue: Vec<Vec<Id>>,
    deleted: HashSet<Vec<Id>>,
}

impl Tree {
    /// Create an empty tree whose local positions come from `generator`.
    pub fn new(replica_id: ReplicaId, generator: PositionGenerator) -> Self {
        let mut nodes = Nodes::new();
        nodes.add_child(ROOT, Id::anonymous(MIN));
        nodes.add_child(ROOT, Id::anonymous(BASE));
        Self {
            replica_id,
            nodes,
            generator,
            delete_queue: Vec::new(),
            deleted: HashSet::new(),
        }
    }

    /// Number of visible characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.size(ROOT) - 2
    }

    /// Check if no character is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visible text in document order.
    #[must_use]
    pub fn value(&self) -> String {
        self.nodes.values().collect()
    }

    /// Number of deletes that arrived before their insert.
    #[must_use]
    pub fn delete_queue_len(&self) -> usize {
        self.delete_queue.len()
    }

    /// Position of the visible character at `index`.
    #[must_use]
    pub fn position_of(&self, index: usize) -> Option<Vec<Id>> {
        if index >= self.len() {
            return None;
        }
        self.nodes
            .by_order(ROOT, index + 1)
            .map(|node| self.nodes.position_of(node))
    }

    /// Visible index of the character at `position`, if it is visible.
    #[must_use]
    pub fn order_of(&self, position: &[Id]) -> Option<usize> {
        let node = self.nodes.find(position)?;
        if self.nodes.is_empty(node) || self.is_sentinel(node) {
            return None;
        }
        Some(self.nodes.order_of(node) - 1)
    }

    fn is_sentinel(&self, node: NodeIndex) -> bool {
        self.nodes.parent(node) == Some(ROOT) && self.nodes.id(node).is_anonymous()
    }

    /// Insert `value` so that it becomes visible at `index`, clamped to the
    /// end of the text.
    pub fn local_insert(&mut self, value: char, index: usize) -> Option<Operation> {
        let index = index.min(self.len());
        let previous = self.nodes.by_order(ROOT, index)?;
        let next = self.nodes.by_order(ROOT, index + 1)?;
        let position = self.generator.generate(
            &self.nodes.position_of(previous),
            &self.nodes.position_of(next),
        );
        trace!(replica = self.replica_id, ?position, %value, "local insert");
        self.materialize(&position, value);
        Some(Operation::insert(self.replica_id, position, value))
    }

    /// Delete the visible character at `index`.
    pub fn local_delete(&mut self, index: usize) -> Option<Operation> {
        let node = self.nodes.by_order(ROOT, index + 1)?;
        if self.is_sentinel(node) {
            return None;
        }
        let position = self.nodes.position_of(node);
        trace!(replica = self.replica_id, ?position, "local delete");
        self.erase(node);
        self.deleted.insert(position.clone());
        Some(Operation::delete(self.replica_id, position))
    }

    /// Integrate a remote operation.
    pub fn receive(&mut self, operation: Operation) {
        // Every character position ends with a tagged segment.
        if operation.position().last().map_or(true, Id::is_anonymous) {
            debug!(
                replica = self.replica_id,
                position = ?operation.position(),
                "ignoring untagged position"
            );
            return;
        }
        match operation.kind() {
            OperationKind::Insert => {
                if let Some(value) = operation.value() {
                    self.integrate_insert(operation.position(), value);
                }
            }
            OperationKind::Delete => self.integrate_delete(operation.position()),
        }
    }

    fn integrate_insert(&mut self, position: &[Id], value: char) {
        if self.deleted.contains(position) {
            trace!(replica = self.replica_id, ?position, "insert of deleted position");
            return;
        }
        if let Some(queued) = self.delete_queue.iter().position(|p| p == position) {
            debug!(replica = self.replica_id, ?position, "insert cancelled by earlier delete");
            let position = self.delete_queue.swap_remove(queued);
            self.deleted.insert(position);
            return;
        }
        if let Some(node) = self.nodes.find(position) {
            if self.nodes.value(node).is_some() {
                trace!(replica = self.replica_id, ?position, "duplicate insert");
                return;
            }
        }
        self.materialize(position, value);
    }

    fn integrate_delete(&mut self, position: &[Id]) {
        if self.deleted.contains(position) {
            trace!(replica = self.replica_id, ?position, "duplicate delete");
            return;
        }
        match self.nodes.find(position) {
            Some(node) if !self.nodes.is_empty(node) => {
                self.erase(node);
                self.deleted.insert(position.to_vec());
            }
            _ => {
                if !self.delete_queue.iter().any(|p| p == position) {
                    debug!(replica = self.replica_id, ?position, "delete queued ahead of its insert");
                    self.delete_queue.push(position.to_vec());
                }
            }
        }
    }

    fn materialize(&mut self, position: &[Id], value: char) {
        let node = self.nodes.build(position);
        self.nodes.set_value(node, value);
        self.nodes.set_empty(node, false);
    }

    fn erase(&mut self, node: NodeIndex) {
        self.nodes.set_empty(node, true);
        self.nodes.trim_empty(node);
    }
}
