use core::fmt;

use tracing::debug;

use super::diff::{diff, implied_cursor, Diff};
use super::{Key, Operation, Tree, View};
use crate::{Crdt, Dispatch, ReplicaId};

/// Session stamped on keys unless the document is created with
/// [`Document::with_session`].
pub const DEFAULT_SESSION: u32 = 1;

/// An RGA replica of a plain-text document.
///
/// Every edit is reduced to a single-range diff of the text and sent as at
/// most one delete followed by at most one insert.
pub struct Document {
    replica_id: ReplicaId,
    session: u32,
    tree: Tree,
    view: View,
    dispatch: Dispatch<Operation>,
}

impl Document {
    /// Create an empty document in the default session.
    pub fn new(replica_id: ReplicaId, dispatch: impl FnMut(Vec<Operation>) + 'static) -> Self {
        Self::with_session(replica_id, DEFAULT_SESSION, dispatch)
    }

    /// Create a document whose keys carry `session`.
    ///
    /// A replica that restarts without its state must use a session greater
    /// than any it used before so that its keys stay unique.
    pub fn with_session(
        replica_id: ReplicaId,
        session: u32,
        dispatch: impl FnMut(Vec<Operation>) + 'static,
    ) -> Self {
        Self {
            replica_id,
            session,
            tree: Tree::new(replica_id),
            view: View::new(),
            dispatch: Box::new(dispatch),
        }
    }

    /// The underlying split tree.
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Snapshot of the visible chunks.
    #[must_use]
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Number of received operations waiting for the chunks they name.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.tree.pending_len()
    }

    /// Tick the vector clock of `replica_id`, or of this replica, and
    /// return the new sum.
    pub fn increment_vector_clock(&mut self, replica_id: Option<ReplicaId>) -> u64 {
        self.tree.increment_vector_clock(replica_id)
    }

    /// Replace the whole text with `new_text`, sending only what changed.
    pub fn replace(&mut self, new_text: &str) {
        let old_text = self.view.to_string();
        let cursor = implied_cursor(&old_text, new_text);
        self.edit(diff(&old_text, new_text, cursor));
    }

    fn edit(&mut self, diff: Diff) {
        let mut operations = Vec::with_capacity(2);
        if diff.deleted() > 0 {
            let key_list = self.view.slices(diff.start, diff.deleted());
            let key = self.next_key(diff.deleted());
            operations.push(Operation::delete(self.replica_id, key_list, key));
        }
        if !diff.inserted.is_empty() {
            let (target, position) = self
                .view
                .node_at_position(diff.start)
                .map_or((None, 0), |(key, position)| (Some(key), position));
            let key = self.next_key(diff.inserted.chars().count());
            operations.push(Operation::insert(
                self.replica_id,
                target,
                position,
                diff.inserted,
                key,
            ));
        }
        for operation in &operations {
            self.tree.integrate(operation);
        }
        self.view.synchronize(&self.tree);
        self.dispatch(operations);
    }

    fn next_key(&mut self, length: usize) -> Key {
        let ssv = self.tree.next_ssv();
        Key::new(self.replica_id, self.session, ssv, 0, length)
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
        self.view.len()
    }

    fn insert(&mut self, text: &str, position: usize) {
        if text.is_empty() {
            return;
        }
        let old_text = self.view.to_string();
        let position = position.min(self.view.len());
        let split = old_text
            .char_indices()
            .nth(position)
            .map_or(old_text.len(), |(index, _)| index);
        let new_text = [&old_text[..split], text, &old_text[split..]].concat();
        let cursor = position + text.chars().count();
        self.edit(diff(&old_text, &new_text, cursor));
    }

    fn delete(&mut self, position: usize, length: usize) {
        let length = length.min(self.view.len().saturating_sub(position));
        if length == 0 {
            return;
        }
        self.edit(Diff {
            start: position,
            end: position + length,
            inserted: String::new(),
        });
    }

    fn apply_operations(&mut self, operations: &[Operation]) {
        let replica_id = self.replica_id;
        let mut received = operations
            .iter()
            .filter(|operation| operation.replica_id() != replica_id)
            .peekable();
        if received.peek().is_none() {
            return;
        }
        received.for_each(|operation| self.tree.receive(operation.clone()));
        self.view.synchronize(&self.tree);
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.view, f)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("replica_id", &self.replica_id)
            .field("session", &self.session)
            .field("tree", &self.tree)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::rga::{OperationKind, Payload};

    type Outbox = Rc<RefCell<Vec<Vec<Operation>>>>;

    fn document(replica_id: ReplicaId) -> (Document, Outbox) {
        let outbox: Outbox = Rc::default();
        let sink = Rc::clone(&outbox);
        let doc = Document::new(replica_id, move |ops| sink.borrow_mut().push(ops));
        (doc, outbox)
    }

    fn kinds(batch: &[Operation]) -> Vec<OperationKind> {
        batch.iter().map(Operation::kind).collect()
    }

    #[test]
    fn insert_is_one_operation() {
        let (mut doc, outbox) = document(0);
        doc.insert("hello", 0);
        doc.insert("!", 5);
        doc.insert(", world", 5);
        assert_eq!(doc.to_string(), "hello, world!");
        assert!(outbox.borrow().iter().all(|batch| batch.len() == 1));
    }

    #[test]
    fn insert_clamps_position() {
        let (mut doc, _) = document(0);
        doc.insert("ab", 0);
        doc.insert("c", 99);
        assert_eq!(doc.to_string(), "abc");
    }

    #[test]
    fn delete_is_consolidated() {
        let (mut doc, outbox) = document(0);
        doc.insert("abc", 0);
        doc.insert("XYZ", 3);
        doc.delete(2, 3);
        assert_eq!(doc.to_string(), "abZ");
        let outbox = outbox.borrow();
        let batch = &outbox[2];
        assert_eq!(kinds(batch), vec![OperationKind::Delete]);
        match batch[0].payload() {
            Payload::Delete { del_length, key_list } => {
                assert_eq!(*del_length, 3);
                assert_eq!(key_list.len(), 2);
            }
            Payload::Insert { .. } => unreachable!(),
        }
    }

    #[test]
    fn delete_out_of_range_dispatches_nothing() {
        let (mut doc, outbox) = document(0);
        doc.insert("ab", 0);
        doc.delete(2, 1);
        doc.delete(0, 0);
        assert_eq!(outbox.borrow().len(), 1);
        doc.delete(1, 10);
        assert_eq!(doc.to_string(), "a");
    }

    #[test]
    fn replace_sends_delete_then_insert() {
        let (mut doc, outbox) = document(0);
        doc.insert("the cat sat", 0);
        doc.replace("the dog sat");
        assert_eq!(doc.to_string(), "the dog sat");
        assert_eq!(
            kinds(&outbox.borrow()[1]),
            vec![OperationKind::Delete, OperationKind::Insert]
        );
    }

    #[test]
    fn replace_with_same_text_dispatches_nothing() {
        let (mut doc, outbox) = document(0);
        doc.insert("same", 0);
        doc.replace("same");
        assert_eq!(outbox.borrow().len(), 1);
    }

    #[test]
    fn replayed_on_another_replica() {
        let (mut a, outbox) = document(0);
        let (mut b, _) = document(1);
        a.insert("the cat sat", 0);
        a.replace("the dog sat down");
        a.delete(0, 4);
        a.insert("A ", 0);
        for batch in outbox.borrow().iter() {
            b.apply_operations(batch);
        }
        assert_eq!(b.to_string(), a.to_string());
        assert_eq!(b.to_string(), "A dog sat down");
    }

    #[test]
    fn own_operations_are_ignored() {
        let (mut doc, outbox) = document(3);
        doc.insert("abc", 0);
        doc.delete(0, 1);
        let echo: Vec<Operation> = outbox.borrow().iter().flatten().cloned().collect();
        doc.apply_operations(&echo);
        assert_eq!(doc.to_string(), "bc");
    }

    #[test]
    fn keys_carry_session_and_clock_sum() {
        let (mut doc, outbox) = {
            let outbox: Outbox = Rc::default();
            let sink = Rc::clone(&outbox);
            let doc = Document::with_session(2, 7, move |ops| sink.borrow_mut().push(ops));
            (doc, outbox)
        };
        doc.insert("a", 0);
        doc.insert("b", 1);
        let outbox = outbox.borrow();
        let first = outbox[0][0].key();
        let second = outbox[1][0].key();
        assert_eq!((first.session(), first.ssv()), (7, 1));
        assert_eq!((second.session(), second.ssv()), (7, 2));
        assert_eq!(doc.increment_vector_clock(None), 3);
    }

    #[test]
    fn prepend_puts_latest_first() {
        let (mut doc, _) = document(0);
        for digit in "0123456789".chars() {
            doc.insert(&digit.to_string(), 0);
        }
        assert_eq!(doc.to_string(), "9876543210");
    }
}
