//! The in-memory store: named collections of documents.
//!
//! On disk the whole mapping is one canonical CBOR map from collection name
//! to an array of single-field document maps:
//!
//! ```text
//! {
//!   "default": [ {"name": "alice"}, {"name": "bob"} ],
//!   "users":   [ {"age": 30} ],
//! }
//! ```

use crate::document::Document;
use saracendb_codec::{from_cbor, to_canonical_cbor, CodecError, CodecResult, Decode, Encode, Value};
use std::collections::BTreeMap;

/// Mapping from collection name to its ordered documents.
///
/// Iteration is by name, the same order on every run and after every
/// reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    inner: BTreeMap<String, Vec<Document>>,
}

impl Collections {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the documents of `name`, if the collection exists.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[Document]> {
        self.inner.get(name).map(Vec::as_slice)
    }

    /// Returns the documents of `name` for in-place edits, if it exists.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Vec<Document>> {
        self.inner.get_mut(name)
    }

    /// Returns the documents of `name`, creating an empty collection first
    /// if needed.
    pub fn materialize(&mut self, name: &str) -> &mut Vec<Document> {
        self.inner.entry(name.to_string()).or_default()
    }

    /// Removes a collection and returns its documents.
    pub fn remove(&mut self, name: &str) -> Option<Vec<Document>> {
        self.inner.remove(name)
    }

    /// Returns true if a collection called `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Iterates over collection names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    /// Number of collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if there are no collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Total number of documents across all collections.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.inner.values().map(Vec::len).sum()
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.inner
                .iter()
                .map(|(name, docs)| {
                    (
                        Value::Text(name.clone()),
                        Value::Array(docs.iter().map(Document::to_value).collect()),
                    )
                })
                .collect(),
        )
    }

    fn from_value(value: Value) -> CodecResult<Self> {
        let Value::Map(pairs) = value else {
            return Err(CodecError::invalid_structure("store root is not a map"));
        };

        let mut inner = BTreeMap::new();
        for (name, docs) in pairs {
            let Value::Text(name) = name else {
                return Err(CodecError::invalid_structure("collection name is not text"));
            };
            let Value::Array(docs) = docs else {
                return Err(CodecError::invalid_structure(format!(
                    "collection {name} is not an array"
                )));
            };
            let docs = docs
                .into_iter()
                .map(Document::from_value)
                .collect::<CodecResult<Vec<_>>>()?;
            inner.insert(name, docs);
        }

        Ok(Self { inner })
    }
}

impl Encode for Collections {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        to_canonical_cbor(&self.to_value())
    }
}

impl Decode for Collections {
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        Self::from_value(from_cbor(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Collections {
        let mut collections = Collections::new();
        collections
            .materialize("default")
            .extend([Document::new("name", "alice"), Document::new("name", "bob")]);
        collections
            .materialize("users")
            .push(Document::new("age", 30i64));
        collections
    }

    #[test]
    fn materialize_creates_once() {
        let mut collections = Collections::new();
        collections.materialize("a").push(Document::new("k", 1i64));
        collections.materialize("a");

        assert_eq!(collections.len(), 1);
        assert_eq!(collections.get("a").map(<[_]>::len), Some(1));
        assert!(collections.get("b").is_none());
    }

    #[test]
    fn remove_and_counts() {
        let mut collections = sample();
        assert_eq!(collections.document_count(), 3);

        let removed = collections.remove("default").unwrap();
        assert_eq!(removed.len(), 2);
        assert!(!collections.contains("default"));
        assert!(collections.remove("default").is_none());
        assert_eq!(collections.names().collect::<Vec<_>>(), vec!["users"]);
    }

    #[test]
    fn encodes_expected_layout() {
        let mut collections = Collections::new();
        collections.materialize("c").push(Document::new("k", 1i64));

        // {"c": [{"k": 1}]}
        assert_eq!(
            collections.encode().unwrap(),
            vec![0xa1, 0x61, b'c', 0x81, 0xa1, 0x61, b'k', 0x01]
        );
    }

    #[test]
    fn decode_restores_state() {
        let collections = sample();
        let bytes = collections.encode().unwrap();
        assert_eq!(Collections::decode(&bytes).unwrap(), collections);
    }

    #[test]
    fn empty_collections_survive() {
        let mut collections = Collections::new();
        collections.materialize("empty");
        let bytes = collections.encode().unwrap();

        let decoded = Collections::decode(&bytes).unwrap();
        assert_eq!(decoded.get("empty"), Some(&[][..]));
    }

    #[test]
    fn decode_rejects_wrong_shapes() {
        let not_a_map = to_canonical_cbor(&Value::Array(vec![])).unwrap();
        assert!(Collections::decode(&not_a_map).is_err());

        let int_name = to_canonical_cbor(&Value::Map(vec![(
            Value::Integer(1),
            Value::Array(vec![]),
        )]))
        .unwrap();
        assert!(Collections::decode(&int_name).is_err());

        let not_an_array = to_canonical_cbor(&Value::map(vec![(
            Value::from("default"),
            Value::from("oops"),
        )]))
        .unwrap();
        assert!(Collections::decode(&not_an_array).is_err());

        let two_fields = to_canonical_cbor(&Value::map(vec![(
            Value::from("default"),
            Value::Array(vec![Value::map(vec![
                (Value::from("a"), Value::Null),
                (Value::from("b"), Value::Null),
            ])]),
        )]))
        .unwrap();
        assert!(Collections::decode(&two_fields).is_err());
    }
}
