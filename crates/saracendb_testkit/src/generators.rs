//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random values, documents and
//! operation sequences, plus [`Model`], a plain reference implementation
//! that sequences are checked against.

use proptest::prelude::*;
use saracendb_core::{CoreResult, Database, Document, Value, DEFAULT_COLLECTION};
use std::collections::BTreeMap;

/// Strategy for generating valid collection names.
pub fn collection_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_]{0,31}").expect("Invalid regex")
}

/// Strategy for collection names drawn from a small pool, so that
/// sequences revisit the same collections.
pub fn pooled_collection_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(DEFAULT_COLLECTION.to_string()),
        Just("users".to_string()),
        Just("posts".to_string()),
    ]
}

/// Strategy for field names drawn from a small pool.
pub fn field_key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-c]").expect("Invalid regex")
}

/// Strategy for floats with a canonical encoding (anything but NaN).
pub fn float_strategy() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("NaN has no canonical encoding", |f| !f.is_nan())
}

/// Strategy for scalar values.
pub fn leaf_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        float_strategy().prop_map(Value::Float),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(Value::Bytes),
        ".{0,16}".prop_map(Value::Text),
    ]
}

/// Strategy for arbitrary storable values, nested arrays and maps included.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    leaf_value_strategy().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,4}".prop_map(Value::Text), inner), 0..4)
                .prop_map(Value::map),
        ]
    })
}

/// Strategy for values drawn from a small pool, so that queries hit.
pub fn small_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        (0i64..3).prop_map(Value::Integer),
        prop::string::string_regex("[xy]")
            .expect("Invalid regex")
            .prop_map(Value::Text),
        Just(Value::Bool(true)),
    ]
}

/// Strategy for generating documents.
pub fn document_strategy() -> impl Strategy<Value = Document> {
    (field_key_strategy(), value_strategy()).prop_map(|(key, value)| Document::new(key, value))
}

/// One call on a [`Database`].
#[derive(Debug, Clone)]
pub enum Operation {
    /// Select a collection.
    Select(String),
    /// Append a document.
    Put(String, Value),
    /// Replace the document at an index.
    PutAt(usize, String, Value),
    /// Remove the document at an index.
    Remove(usize),
    /// Remove the active collection.
    RemoveCollection,
    /// Flush to storage.
    Flush,
}

impl Operation {
    /// Runs this operation against `db`.
    ///
    /// # Errors
    ///
    /// Returns whatever the database call returned.
    pub fn apply(&self, db: &mut Database) -> CoreResult<()> {
        match self {
            Self::Select(name) => {
                db.select_collection(name.as_str());
                Ok(())
            }
            Self::Put(key, value) => db.put(key.as_str(), value.clone()),
            Self::PutAt(index, key, value) => db.put_at(*index, key.as_str(), value.clone()),
            Self::Remove(index) => db.remove(*index).map(drop),
            Self::RemoveCollection => db.remove_collection(),
            Self::Flush => db.flush(),
        }
    }
}

/// Strategy for generating single operations.
///
/// Indices stay small so that both valid and out-of-range positions occur.
pub fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        2 => pooled_collection_strategy().prop_map(Operation::Select),
        6 => (field_key_strategy(), small_value_strategy())
            .prop_map(|(key, value)| Operation::Put(key, value)),
        2 => (0usize..6, field_key_strategy(), small_value_strategy())
            .prop_map(|(index, key, value)| Operation::PutAt(index, key, value)),
        3 => (0usize..6).prop_map(Operation::Remove),
        1 => Just(Operation::RemoveCollection),
        1 => Just(Operation::Flush),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(operation_strategy(), min_ops..max_ops)
}

/// Reference model of a database: a map of plain vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// The active collection.
    pub active: String,
    /// Collection name to `(key, value)` pairs.
    pub collections: BTreeMap<String, Vec<(String, Value)>>,
    /// Set by removals, cleared by flush.
    pub dirty: bool,
}

impl Default for Model {
    fn default() -> Self {
        let mut collections = BTreeMap::new();
        collections.insert(DEFAULT_COLLECTION.to_string(), Vec::new());
        Self {
            active: DEFAULT_COLLECTION.to_string(),
            collections,
            dirty: false,
        }
    }
}

impl Model {
    /// Applies `op` and returns false if the database would reject it.
    pub fn apply(&mut self, op: &Operation) -> bool {
        let len = self.collections.get(&self.active).map_or(0, Vec::len);
        match op {
            Operation::Select(name) => {
                self.active.clone_from(name);
                true
            }
            Operation::Put(key, value) => {
                self.collections
                    .entry(self.active.clone())
                    .or_default()
                    .push((key.clone(), value.clone().into_canonical()));
                true
            }
            Operation::PutAt(index, key, value) => match self.collections.get_mut(&self.active) {
                Some(docs) if *index < len => {
                    docs[*index] = (key.clone(), value.clone().into_canonical());
                    true
                }
                _ => false,
            },
            Operation::Remove(index) => match self.collections.get_mut(&self.active) {
                Some(docs) if *index < len => {
                    docs.remove(*index);
                    self.dirty = true;
                    true
                }
                _ => false,
            },
            Operation::RemoveCollection => {
                let removed = self.collections.remove(&self.active).is_some();
                self.dirty |= removed;
                removed
            }
            Operation::Flush => {
                self.dirty = false;
                true
            }
        }
    }

    /// Returns true if `db` holds exactly the state of this model.
    #[must_use]
    pub fn matches(&self, db: &Database) -> bool {
        let collections = db.collections();
        db.active_collection() == self.active
            && db.is_dirty() == self.dirty
            && collections.len() == self.collections.len()
            && self.collections.iter().all(|(name, expected)| {
                collections.get(name).is_some_and(|docs| {
                    docs.len() == expected.len()
                        && docs
                            .iter()
                            .zip(expected)
                            .all(|(doc, (key, value))| doc.matches(key, value))
                })
            })
    }
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn collection_name_is_valid(name in collection_name_strategy()) {
            let first = name.chars().next();
            prop_assert!(first.is_some_and(|c| c.is_ascii_alphabetic()));
        }

        #[test]
        fn generated_values_are_storable(value in value_strategy()) {
            prop_assert!(value.validate().is_ok());
        }

        #[test]
        fn documents_are_canonical(doc in document_strategy()) {
            prop_assert_eq!(doc.value().clone().into_canonical(), doc.value().clone());
        }
    }

    #[test]
    fn model_rejects_out_of_range() {
        let mut model = Model::default();
        assert!(!model.apply(&Operation::Remove(0)));
        assert!(model.apply(&Operation::Put("k".into(), Value::Integer(1))));
        assert!(model.apply(&Operation::Remove(0)));
        assert!(model.dirty);
        assert!(model.apply(&Operation::Flush));
        assert!(!model.dirty);
    }

    #[test]
    fn fresh_model_matches_fresh_database() {
        let db = Database::open_in_memory().unwrap();
        assert!(Model::default().matches(&db));
    }
}
