use super::Key;
use crate::ReplicaId;

/// Whether an [`Operation`] inserts or deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum OperationKind {
    /// Splice a new chunk into the document.
    Insert,
    /// Hide existing characters.
    Delete,
}

/// Type-specific part of an [`Operation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Text of the new chunk.
    Insert {
        /// The text.
        value: String,
    },
    /// Hide `del_length` characters spread over the slices of `key_list`,
    /// starting `position` characters into the first slice.
    Delete {
        /// Total number of characters to hide.
        del_length: usize,
        /// Slices holding those characters.
        key_list: Vec<Key>,
    },
}

/// An RGA edit as exchanged between replicas.
///
/// An insertion lands right after the `position`-th character of the
/// slice named by `target_key`, or at the start of the document when
/// there is no target. `key` identifies the operation; for insertions it
/// is also the key of the new chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "wire::Operation", into = "wire::Operation")
)]
pub struct Operation {
    replica_id: ReplicaId,
    target_key: Option<Key>,
    position: usize,
    payload: Payload,
    key: Key,
}

impl Operation {
    /// An insertion of `value` after the `position`-th character of
    /// `target_key`, or at the start when there is no target.
    pub fn insert(
        replica_id: ReplicaId,
        target_key: Option<Key>,
        position: usize,
        value: String,
        key: Key,
    ) -> Self {
        Self {
            replica_id,
            target_key,
            position,
            payload: Payload::Insert { value },
            key,
        }
    }

    /// A deletion of the characters covered by `key_list`, in document order.
    ///
    /// # Panics
    ///
    /// Panics if `key_list` is empty.
    pub fn delete(replica_id: ReplicaId, key_list: Vec<Key>, key: Key) -> Self {
        let del_length = key_list.iter().map(Key::length).sum();
        Self {
            replica_id,
            target_key: Some(key_list[0]),
            position: 0,
            payload: Payload::Delete {
                del_length,
                key_list,
            },
            key,
        }
    }

    /// Insert or delete, following the payload.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self.payload {
            Payload::Insert { .. } => OperationKind::Insert,
            Payload::Delete { .. } => OperationKind::Delete,
        }
    }

    /// Replica that issued the operation.
    #[must_use]
    pub fn replica_id(&self) -> ReplicaId {
        self.replica_id
    }

    /// Slice the operation is anchored to.
    #[must_use]
    pub fn target_key(&self) -> Option<&Key> {
        self.target_key.as_ref()
    }

    /// Offset into the target slice.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Inserted text or deleted keys.
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Key identifying the operation.
    #[must_use]
    pub fn key(&self) -> &Key {
        &self.key
    }

    #[cfg(feature = "serde")]
    fn validate(self) -> crate::Result<Self> {
        let invalid = |reason: &str| {
            Err(crate::Error::InvalidOperation(format!(
                "{:?} {}: {reason}",
                self.kind(),
                self.key
            )))
        };
        match &self.payload {
            Payload::Insert { value } => {
                if value.is_empty() {
                    return invalid("empty value");
                }
                if self.key.offset() != 0 || self.key.length() != value.chars().count() {
                    return invalid("key does not cover the value");
                }
                match &self.target_key {
                    Some(target) if self.position == 0 || self.position > target.length() => {
                        return invalid("position outside of the target slice");
                    }
                    None if self.position != 0 => return invalid("position without a target"),
                    _ => {}
                }
            }
            Payload::Delete {
                del_length,
                key_list,
            } => {
                let Some(first) = key_list.first() else {
                    return invalid("empty key list");
                };
                if self.target_key.as_ref() != Some(first) {
                    return invalid("target is not the first listed key");
                }
                let covered: usize = key_list.iter().map(Key::length).sum();
                if *del_length == 0 || self.position + del_length > covered {
                    return invalid("length does not fit the listed keys");
                }
            }
        }
        Ok(self)
    }

    /// Encode the operation in its JSON wire format.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode an operation from its JSON wire format.
    ///
    /// Fails on malformed JSON and on operations whose fields contradict
    /// each other.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let wire: wire::Operation = serde_json::from_str(json)?;
        Self::try_from(wire)
    }
}

#[cfg(feature = "serde")]
mod wire {
    use serde::{Deserialize, Serialize};

    use super::{OperationKind, Payload};
    use crate::rga::Key;
    use crate::ReplicaId;

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub(super) struct Operation {
        #[serde(rename = "type")]
        kind: OperationKind,
        replica_id: ReplicaId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_key: Option<Key>,
        position: usize,
        data: Data,
        key: Key,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Data {
        Insert {
            value: String,
        },
        #[serde(rename_all = "camelCase")]
        Delete {
            del_length: usize,
            key_list: Vec<Key>,
        },
    }

    impl From<super::Operation> for Operation {
        fn from(operation: super::Operation) -> Self {
            let kind = operation.kind();
            let data = match operation.payload {
                Payload::Insert { value } => Data::Insert { value },
                Payload::Delete {
                    del_length,
                    key_list,
                } => Data::Delete {
                    del_length,
                    key_list,
                },
            };
            Self {
                kind,
                replica_id: operation.replica_id,
                target_key: operation.target_key,
                position: operation.position,
                data,
                key: operation.key,
            }
        }
    }

    impl TryFrom<Operation> for super::Operation {
        type Error = crate::Error;

        fn try_from(wire: Operation) -> crate::Result<Self> {
            let payload = match (wire.kind, wire.data) {
                (OperationKind::Insert, Data::Insert { value }) => Payload::Insert { value },
                (
                    OperationKind::Delete,
                    Data::Delete {
                        del_length,
                        key_list,
                    },
                ) => Payload::Delete {
                    del_length,
                    key_list,
                },
                (kind, _) => {
                    return Err(crate::Error::InvalidOperation(format!(
                        "{kind:?} {} carries the wrong payload",
                        wire.key
                    )))
                }
            };
            Self {
                replica_id: wire.replica_id,
                target_key: wire.target_key,
                position: wire.position,
                payload,
                key: wire.key,
            }
            .validate()
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    fn insert() -> Operation {
        Operation::insert(
            1,
            Some(Key::new(0, 1, 1, 0, 3)),
            2,
            "xy".to_owned(),
            Key::new(1, 1, 2, 0, 2),
        )
    }

    #[test]
    fn insert_json_shape() {
        let value: serde_json::Value = serde_json::from_str(&insert().to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "insert");
        assert_eq!(value["replicaId"], 1);
        assert_eq!(value["targetKey"]["ssv"], 1);
        assert_eq!(value["position"], 2);
        assert_eq!(value["data"]["value"], "xy");
        assert_eq!(value["key"]["length"], 2);
    }

    #[test]
    fn delete_json_shape() {
        let op = Operation::delete(
            0,
            vec![Key::new(0, 1, 1, 2, 1), Key::new(1, 1, 2, 0, 2)],
            Key::new(0, 1, 3, 0, 3),
        );
        let value: serde_json::Value = serde_json::from_str(&op.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "delete");
        assert_eq!(value["data"]["delLength"], 3);
        assert_eq!(value["data"]["keyList"][1]["replicaId"], 1);
        assert_eq!(value["targetKey"], value["data"]["keyList"][0]);
        assert_eq!(Operation::from_json(&op.to_json().unwrap()).unwrap(), op);
    }

    #[test]
    fn head_insert_omits_target() {
        let op = Operation::insert(0, None, 0, "a".to_owned(), Key::new(0, 1, 1, 0, 1));
        let json = op.to_json().unwrap();
        assert!(!json.contains("targetKey"));
        assert_eq!(Operation::from_json(&json).unwrap(), op);
    }

    #[test]
    fn round_trip() {
        let op = insert();
        assert_eq!(Operation::from_json(&op.to_json().unwrap()).unwrap(), op);
    }

    #[test]
    fn rejects_mismatched_payload() {
        let json = insert().to_json().unwrap().replace("\"insert\"", "\"delete\"");
        assert!(matches!(
            Operation::from_json(&json),
            Err(crate::Error::InvalidOperation(_))
        ));
    }

    #[test]
    fn rejects_key_that_does_not_cover_value() {
        let json = insert().to_json().unwrap().replace("\"xy\"", "\"xyz\"");
        assert!(matches!(
            Operation::from_json(&json),
            Err(crate::Error::InvalidOperation(_))
        ));
    }

    #[test]
    fn rejects_position_past_target() {
        let json = insert()
            .to_json()
            .unwrap()
            .replace("\"position\":2", "\"position\":4");
        assert!(matches!(
            Operation::from_json(&json),
            Err(crate::Error::InvalidOperation(_))
        ));
    }
}
