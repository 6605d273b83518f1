use super::Id;
use crate::ReplicaId;

/// What an [`Operation`] does at its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum OperationKind {
    /// Write a character at the position.
    Insert,
    /// Remove the character at the position.
    Delete,
}

/// A Logoot edit as exchanged between replicas.
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
    position: Vec<Id>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    value: Option<char>,
}

impl Operation {
    /// Insertion of `value` at `position`, issued by `replica_id`.
    pub fn insert(replica_id: ReplicaId, position: Vec<Id>, value: char) -> Self {
        Self {
            kind: OperationKind::Insert,
            replica_id,
            position,
            value: Some(value),
        }
    }

    /// Deletion of whatever sits at `position`, issued by `replica_id`.
    pub fn delete(replica_id: ReplicaId, position: Vec<Id>) -> Self {
        Self {
            kind: OperationKind::Delete,
            replica_id,
            position,
            value: None,
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

    /// Position the operation targets.
    #[must_use]
    pub fn position(&self) -> &[Id] {
        &self.position
    }

    /// The inserted character. `None` for deletions.
    #[must_use]
    pub fn value(&self) -> Option<char> {
        self.value
    }

    /// Encode the operation in its JSON wire format.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode an operation from its JSON wire format.
    ///
    /// Fails on malformed JSON, on an empty position and on an insertion
    /// without a value.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let operation: Self = serde_json::from_str(json)?;
        if operation.position.is_empty() {
            return Err(crate::Error::InvalidOperation(format!(
                "{:?} with an empty position",
                operation.kind
            )));
        }
        if operation.kind == OperationKind::Insert && operation.value.is_none() {
            return Err(crate::Error::InvalidOperation(
                "insert without a value".to_owned(),
            ));
        }
        Ok(operation)
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn json_shape() {
        let op = Operation::insert(3, vec![Id::new(17, 3, 0)], 'q');
        let value: serde_json::Value = serde_json::from_str(&op.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "insert");
        assert_eq!(value["replicaId"], 3);
        assert_eq!(value["position"][0]["num"], 17);
        assert_eq!(value["position"][0]["clock"], 0);
        assert_eq!(value["value"], "q");
    }

    #[test]
    fn delete_omits_value() {
        let op = Operation::delete(0, vec![Id::new(17, 3, 0)]);
        let json = op.to_json().unwrap();
        assert!(!json.contains("value"));
        assert_eq!(Operation::from_json(&json).unwrap(), op);
    }

    #[test]
    fn rejects_empty_position() {
        let json = r#"{"type":"delete","replicaId":0,"position":[]}"#;
        assert!(matches!(
            Operation::from_json(json),
            Err(crate::Error::InvalidOperation(_))
        ));
    }

    #[test]
    fn rejects_insert_without_value() {
        let json = r#"{"type":"insert","replicaId":0,"position":[{"num":4,"replicaId":0,"clock":1}]}"#;
        assert!(matches!(
            Operation::from_json(json),
            Err(crate::Error::InvalidOperation(_))
        ));
    }
}
