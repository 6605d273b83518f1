use super::Char;
use crate::ReplicaId;

/// What an [`Operation`] does to its character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum OperationKind {
    /// Integrate the character between its recorded neighbours.
    Insert,
    /// Hide the character.
    Delete,
}

/// A WOOT edit as exchanged between replicas.
///
/// The operation carries the full [`Char`] so that a receiver can place it
/// without any other context. `replica_id` is the replica that issued the
/// operation, which for a delete is not necessarily the replica that
/// created the character.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Operation {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    kind: OperationKind,
    replica_id: ReplicaId,
    char: Char,
}

impl Operation {
    /// An insertion of `char` issued by `replica_id`.
    pub fn insert(replica_id: ReplicaId, char: Char) -> Self {
        Self {
            kind: OperationKind::Insert,
            replica_id,
            char,
        }
    }

    /// A deletion of `char` issued by `replica_id`.
    pub fn delete(replica_id: ReplicaId, char: Char) -> Self {
        Self {
            kind: OperationKind::Delete,
            replica_id,
            char,
        }
    }

    /// Insert or delete.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Replica that issued the operation.
    #[must_use]
    pub fn replica_id(&self) -> ReplicaId {
        self.replica_id
    }

    /// The character being inserted or deleted.
    #[must_use]
    pub fn char(&self) -> &Char {
        &self.char
    }

    pub(crate) fn into_parts(self) -> (OperationKind, Char) {
        (self.kind, self.char)
    }

    /// Encode the operation in its JSON wire format.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode an operation from its JSON wire format.
    ///
    /// Fails on malformed JSON, on operations that target a boundary and
    /// on insertions whose neighbours cannot enclose the character.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let operation: Self = serde_json::from_str(json)?;
        let char = &operation.char;
        let id = char.id();
        if id.is_boundary() {
            return Err(crate::Error::InvalidOperation(format!(
                "{:?} of boundary character {id}",
                operation.kind
            )));
        }
        let (previous, next) = (char.previous(), char.next());
        if operation.kind == OperationKind::Insert
            && (previous == next
                || previous == super::Id::End
                || next == super::Id::Begin
                || id == previous
                || id == next)
        {
            return Err(crate::Error::InvalidOperation(format!(
                "insert of {id} between {previous} and {next}"
            )));
        }
        Ok(operation)
    }
}
