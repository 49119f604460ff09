//! Single-field documents.

use saracendb_codec::{CodecError, CodecResult, Value, MAX_BYTES_LENGTH};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Containers around a document value on disk: the root map, the
/// collection array and the document map.
pub(crate) const VALUE_DEPTH: usize = 3;

/// A single key-value record stored in a collection.
///
/// Documents have no identity beyond their position in the collection.
/// The value is kept in canonical form so a document compares equal to
/// itself after a flush and reopen.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    key: String,
    value: Value,
}

impl Document {
    /// Creates the document `{key: value}`.
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into().into_canonical(),
        }
    }

    /// Returns the field name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the field value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the value stored under `key`, if this document has that field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        (self.key == key).then_some(&self.value)
    }

    /// Returns true if this document's field is exactly `(key, value)`.
    ///
    /// `value` must already be canonical for nested maps to compare equal.
    #[must_use]
    pub fn matches(&self, key: &str, value: &Value) -> bool {
        self.key == key && &self.value == value
    }

    /// Splits the document into its key and value.
    #[must_use]
    pub fn into_parts(self) -> (String, Value) {
        (self.key, self.value)
    }

    /// Checks that this document can be written and read back.
    pub(crate) fn validate(&self) -> CodecResult<()> {
        let key_len = self.key.len() as u64;
        if key_len > MAX_BYTES_LENGTH {
            return Err(CodecError::SizeLimitExceeded {
                claimed: key_len,
                max_allowed: MAX_BYTES_LENGTH,
            });
        }
        self.value.validate_at_depth(VALUE_DEPTH)
    }

    pub(crate) fn to_value(&self) -> Value {
        Value::Map(vec![(Value::Text(self.key.clone()), self.value.clone())])
    }

    pub(crate) fn from_value(value: Value) -> CodecResult<Self> {
        let Value::Map(mut pairs) = value else {
            return Err(CodecError::invalid_structure("document is not a map"));
        };
        if pairs.len() != 1 {
            return Err(CodecError::invalid_structure(format!(
                "document has {} fields, expected 1",
                pairs.len()
            )));
        }
        match pairs.pop() {
            Some((Value::Text(key), value)) => Ok(Self { key, value }),
            _ => Err(CodecError::invalid_structure("document key is not text")),
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.value)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let doc = Document::new("name", "alice");
        assert_eq!(doc.key(), "name");
        assert_eq!(doc.value(), &Value::from("alice"));
        assert_eq!(doc.get("name"), Some(&Value::from("alice")));
        assert_eq!(doc.get("age"), None);
    }

    #[test]
    fn matches_is_exact() {
        let doc = Document::new("age", 30i64);
        assert!(doc.matches("age", &Value::Integer(30)));
        assert!(!doc.matches("age", &Value::Integer(31)));
        assert!(!doc.matches("age", &Value::from("30")));
        assert!(!doc.matches("years", &Value::Integer(30)));
    }

    #[test]
    fn nested_value_is_canonicalized() {
        let doc = Document::new(
            "profile",
            Value::Map(vec![
                (Value::from("zip"), Value::Integer(1)),
                (Value::from("city"), Value::from("Oslo")),
            ]),
        );
        let pairs = doc.value().as_map().unwrap();
        assert_eq!(pairs[0].0, Value::from("zip"));
        assert_eq!(pairs[1].0, Value::from("city"));
    }

    #[test]
    fn value_shape_roundtrip() {
        let doc = Document::new("tags", vec![Value::from("a"), Value::from("b")]);
        assert_eq!(Document::from_value(doc.to_value()).unwrap(), doc);
    }

    #[test]
    fn from_value_rejects_bad_shapes() {
        assert!(Document::from_value(Value::Integer(1)).is_err());
        assert!(Document::from_value(Value::Map(vec![])).is_err());
        assert!(Document::from_value(Value::Map(vec![
            (Value::from("a"), Value::Null),
            (Value::from("b"), Value::Null),
        ]))
        .is_err());
        assert!(Document::from_value(Value::Map(vec![(Value::Integer(1), Value::Null)])).is_err());
    }

    #[test]
    fn validate_counts_store_wrapper_levels() {
        let nested = |levels: usize| {
            (0..levels).fold(Value::Null, |inner, _| Value::Array(vec![inner]))
        };
        let deepest = saracendb_codec::MAX_DEPTH - VALUE_DEPTH - 1;

        assert!(Document::new("deep", nested(deepest)).validate().is_ok());
        assert!(matches!(
            Document::new("deep", nested(deepest + 1)).validate(),
            Err(CodecError::InvalidStructure { .. })
        ));
        assert_eq!(
            Document::new("n", f64::NAN).validate(),
            Err(CodecError::NaNForbidden)
        );
    }

    #[test]
    fn serializes_as_single_field_object() {
        let doc = Document::new("name", "bob");
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            serde_json::json!({"name": "bob"})
        );
    }
}
