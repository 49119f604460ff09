//! Dynamic document value type.

use crate::encoder::to_canonical_cbor;
use crate::error::{CodecError, CodecResult};
use crate::limits::{check_depth, check_len, MAX_BYTES_LENGTH, MAX_CONTAINER_ELEMENTS};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::cmp::Ordering;

/// A dynamic value stored in a document field.
///
/// Covers every shape the store persists: scalars, byte and text strings,
/// arrays and nested maps. Floats are always encoded as 64-bit; NaN has no
/// canonical encoding and is rejected by the encoder.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer (supports full i64 range).
    Integer(i64),
    /// Double-precision float.
    Float(f64),
    /// Byte string.
    Bytes(Vec<u8>),
    /// Text string (UTF-8).
    Text(String),
    /// Array of values.
    Array(Vec<Value>),
    /// Map of key-value pairs (keys are sorted for canonical encoding).
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Create a map value with sorted keys.
    ///
    /// Keys are sorted by their canonical CBOR ordering. When a key appears
    /// more than once the last pair wins.
    pub fn map(pairs: Vec<(Value, Value)>) -> Self {
        Value::Map(Self::canonical_pairs(pairs))
    }

    /// Rewrite this value so every nested map is in canonical form.
    ///
    /// A canonical value compares equal to itself after an encode/decode
    /// round trip.
    #[must_use]
    pub fn into_canonical(self) -> Self {
        match self {
            Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::into_canonical).collect())
            }
            Value::Map(pairs) => Value::map(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into_canonical(), v.into_canonical()))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Checks that this value has a canonical encoding that decodes again.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::NaNForbidden`] if any nested float is NaN, or a
    /// structure or size error if the value exceeds the codec limits.
    pub fn validate(&self) -> CodecResult<()> {
        self.validate_at_depth(0)
    }

    /// Like [`validate`](Self::validate), for a value that will be written
    /// inside `depth` enclosing containers.
    ///
    /// # Errors
    ///
    /// Same as [`validate`](Self::validate), with the nesting limit reduced
    /// by `depth`.
    pub fn validate_at_depth(&self, depth: usize) -> CodecResult<()> {
        check_depth(depth)?;
        match self {
            Value::Float(f) if f.is_nan() => Err(CodecError::NaNForbidden),
            Value::Bytes(b) => check_len(b.len() as u64, MAX_BYTES_LENGTH),
            Value::Text(t) => check_len(t.len() as u64, MAX_BYTES_LENGTH),
            Value::Array(items) => {
                check_len(items.len() as u64, MAX_CONTAINER_ELEMENTS)?;
                items.iter().try_for_each(|item| item.validate_at_depth(depth + 1))
            }
            Value::Map(pairs) => {
                check_len(pairs.len() as u64, MAX_CONTAINER_ELEMENTS)?;
                pairs.iter().try_for_each(|(k, v)| {
                    k.validate_at_depth(depth + 1)?;
                    v.validate_at_depth(depth + 1)
                })
            }
            _ => Ok(()),
        }
    }

    fn canonical_pairs(pairs: Vec<(Value, Value)>) -> Vec<(Value, Value)> {
        let mut keyed: Vec<_> = pairs
            .into_iter()
            .map(|pair| (to_canonical_cbor(&pair.0).ok(), pair))
            .collect();
        // Stable, so among equal keys the last one written stays last.
        keyed.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(a), Some(b)) => canonical_order(a, b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        let mut out: Vec<(Option<Vec<u8>>, (Value, Value))> = Vec::with_capacity(keyed.len());
        for (encoded, pair) in keyed {
            match out.last_mut() {
                Some((Some(prev), last)) if encoded.as_deref() == Some(prev.as_slice()) => *last = pair,
                _ => out.push((encoded, pair)),
            }
        }
        out.into_iter().map(|(_, pair)| pair).collect()
    }

    /// Compare two values by their canonical CBOR encodings: shorter
    /// encodings first, then bytewise.
    ///
    /// This is the order map keys are written in. A value without an
    /// encoding (one holding NaN) sorts after every value that has one.
    pub fn cmp_canonical(&self, other: &Self) -> Ordering {
        match (to_canonical_cbor(self), to_canonical_cbor(other)) {
            (Ok(a), Ok(b)) => canonical_order(&a, &b),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => Ordering::Equal,
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get this value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a float, if it is one.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get this value as bytes, if it is a byte string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Get this value as a string, if it is a text string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as an array, if it is one.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get this value as a map, if it is one.
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a text key in this map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(pairs) => pairs
                .iter()
                .find(|(k, _)| k.as_text() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

fn canonical_order(a: &[u8], b: &[u8]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Bytes(b) => serializer.serialize_bytes(b),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (k, v) in pairs {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
