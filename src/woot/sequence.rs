use std::collections::HashMap;

use tracing::{debug, trace, warn};

use super::{Char, Id, Operation, OperationKind};
use crate::ReplicaId;

/// The replicated character sequence of one WOOT replica.
///
/// Characters live in document order in a vector bounded by the two
/// genesis characters, with a side index from identifier to position.
/// Deleted characters stay in place, hidden, so that later operations can
/// still use them as anchors.
#[derive(Debug, Clone)]
pub struct Sequence {
    replica_id: ReplicaId,
    clock: u64,
    chars: Vec<Char>,
    /// Position of every integrated character in `chars`.
    positions: HashMap<Id, usize>,
    /// Received operations whose dependencies are not integrated yet.
    pool: Vec<Operation>,
    visible_len: usize,
}

impl Sequence {
    /// Create an empty sequence for the given replica.
    pub fn new(replica_id: ReplicaId) -> Self {
        let chars = Char::genesis().to_vec();
        let positions = chars
            .iter()
            .enumerate()
            .map(|(position, char)| (char.id(), position))
            .collect();
        Self {
            replica_id,
            clock: 0,
            chars,
            positions,
            pool: Vec::new(),
            visible_len: 0,
        }
    }

    /// Insert `value` before the visible character at `position`.
    ///
    /// Returns the operation to broadcast, or `None` if `position` is past
    /// the end of the visible text.
    pub fn local_insert(&mut self, value: char, position: usize) -> Option<Operation> {
        let (previous, next) = {
            let mut neighbours = self.visible().skip(position);
            (neighbours.next()?.id(), neighbours.next()?.id())
        };

        self.clock += 1;
        let char = Char::new(Id::new(self.replica_id, self.clock), value, previous, next);
        let operation = Operation::insert(self.replica_id, char);
        self.execute(operation.clone());
        Some(operation)
    }

    /// Hide the visible character at `position`.
    ///
    /// Returns the operation to broadcast, or `None` if there is no visible
    /// character at `position`.
    pub fn local_delete(&mut self, position: usize) -> Option<Operation> {
        let mut char = self
            .visible()
            .nth(position + 1)
            .filter(|char| !char.id().is_boundary())?
            .clone();

        self.execute(Operation::delete(self.replica_id, char.clone()));
        char.set_visible(false);
        Some(Operation::delete(self.replica_id, char))
    }

    /// Integrate a remote operation, or park it until it becomes executable.
    pub fn receive(&mut self, operation: Operation) {
        if self.is_executable(&operation) {
            self.execute(operation);
        } else if self.pool.contains(&operation) {
            trace!(replica = self.replica_id, id = %operation.char().id(), "operation already pooled");
        } else {
            debug!(
                replica = self.replica_id,
                id = %operation.char().id(),
                pool = self.pool.len() + 1,
                "deferring operation with missing dependencies"
            );
            self.pool.push(operation);
        }
    }

    /// The visible text.
    #[must_use]
    pub fn value(&self) -> String {
        self.chars
            .iter()
            .filter(|char| char.is_visible() && !char.id().is_boundary())
            .map(Char::value)
            .collect()
    }

    /// Number of visible characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.visible_len
    }

    /// Check if no character is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visible_len == 0
    }

    /// Check if a character with this identifier has been integrated.
    #[must_use]
    pub fn contains(&self, id: Id) -> bool {
        self.positions.contains_key(&id)
    }

    /// Number of operations waiting for their dependencies.
    #[must_use]
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    /// Visible characters in document order, boundaries included.
    fn visible(&self) -> impl Iterator<Item = &Char> {
        self.chars.iter().filter(|char| char.is_visible())
    }

    fn is_executable(&self, operation: &Operation) -> bool {
        let char = operation.char();
        match operation.kind() {
            OperationKind::Delete => self.contains(char.id()),
            OperationKind::Insert => self.contains(char.previous()) && self.contains(char.next()),
        }
    }

    /// Integrate an executable operation, then everything in the pool it
    /// unblocks, until no pooled operation is executable.
    fn execute(&mut self, operation: Operation) {
        let mut ready = vec![operation];
        while let Some(operation) = ready.pop() {
            self.integrate(operation);

            let mut i = 0;
            while i < self.pool.len() {
                if self.is_executable(&self.pool[i]) {
                    ready.push(self.pool.swap_remove(i));
                } else {
                    i += 1;
                }
            }
        }
    }

    fn integrate(&mut self, operation: Operation) {
        let (kind, char) = operation.into_parts();
        match kind {
            OperationKind::Insert => self.integrate_insert(char),
            OperationKind::Delete => self.integrate_delete(char.id()),
        }
    }

    fn integrate_delete(&mut self, id: Id) {
        if id.is_boundary() {
            return;
        }
        let Some(&position) = self.positions.get(&id) else {
            warn!(replica = self.replica_id, %id, "dropping delete of unknown character");
            return;
        };

        let char = &mut self.chars[position];
        if char.is_visible() {
            char.set_visible(false);
            self.visible_len -= 1;
        }
    }

    fn integrate_insert(&mut self, mut char: Char) {
        if self.contains(char.id()) {
            trace!(replica = self.replica_id, id = %char.id(), "character already integrated");
            return;
        }
        char.set_visible(true);

        let mut previous = char.previous();
        let mut next = char.next();
        loop {
            let lower = self.positions[&previous];
            let upper = self.positions[&next];
            if lower >= upper {
                warn!(
                    replica = self.replica_id,
                    id = %char.id(),
                    %previous,
                    %next,
                    "dropping insert with neighbours out of order"
                );
                return;
            }

            if upper - lower == 1 {
                self.insert_at(upper, char);
                return;
            }

            // Only characters whose own neighbours enclose the current
            // bounds compete for this slot; the rest hang off them.
            let mut bounds = vec![previous];
            bounds.extend(
                self.chars[lower + 1..upper]
                    .iter()
                    .filter(|c| {
                        self.positions[&c.previous()] <= lower && self.positions[&c.next()] >= upper
                    })
                    .map(Char::id),
            );
            bounds.push(next);

            let mut i = 1;
            while i < bounds.len() - 1 && bounds[i] < char.id() {
                i += 1;
            }
            previous = bounds[i - 1];
            next = bounds[i];
        }
    }

    fn insert_at(&mut self, position: usize, char: Char) {
        trace!(replica = self.replica_id, id = %char.id(), position, "integrated character");
        self.chars.insert(position, char);
        for (offset, char) in self.chars[position..].iter().enumerate() {
            self.positions.insert(char.id(), position + offset);
        }
        self.visible_len += 1;
    }
}
