use core::fmt;

/// Identifier of a replica taking part in a collaborative session.
pub type ReplicaId = u32;

/// Callback that carries locally produced operations to the transport.
///
/// Every document is constructed with one. It is called at most once per
/// local edit, with every operation that edit produced, after the
/// operations have been integrated into the issuing replica.
pub type Dispatch<O> = Box<dyn FnMut(Vec<O>)>;

/// Core trait that all sequence CRDTs implement.
///
/// A sequence CRDT is a replicated string. Each replica edits its own copy
/// and ships the resulting operations to the other replicas, which replay
/// them with [`Crdt::apply_operations`].
///
/// # Properties
///
/// All implementations must satisfy:
/// - **Convergence:** replicas that received the same set of operations
///   render the same text, whatever the delivery order.
/// - **Idempotency:** applying an operation twice is the same as applying
///   it once.
/// - **Local echo:** operations a replica authored are ignored when they
///   are delivered back to it.
pub trait Crdt: fmt::Display {
    /// Operation type exchanged between replicas of this CRDT.
    type Operation;

    /// Identifier of this replica.
    fn replica_id(&self) -> ReplicaId;

    /// Number of visible characters.
    fn len(&self) -> usize;

    /// Check if the visible text is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert `text` so that it starts at visible index `position`.
    ///
    /// A position past the end of the text is clamped to the end.
    fn insert(&mut self, text: &str, position: usize);

    /// Remove `length` visible characters starting at `position`.
    ///
    /// Characters beyond the end of the text are ignored.
    fn delete(&mut self, position: usize, length: usize);

    /// Replay operations produced by other replicas.
    fn apply_operations(&mut self, operations: &[Self::Operation]);
}
