//! # SaracenDB Codec
//!
//! The value model and on-disk encoding of SaracenDB.
//!
//! Store files are a single canonical CBOR item (RFC 8949 §4.2.1), so:
//! - Identical values produce identical bytes
//! - Decoding is self-describing, no schema is needed
//! - Map key order is a pure function of the keys
//!
//! ## Canonical CBOR Rules
//!
//! - Maps are sorted by key (length of encoded key, then bytewise)
//! - Integers and lengths use the shortest encoding
//! - Floats are always 64-bit, NaN is forbidden
//! - Strings must be UTF-8
//! - No indefinite-length items
//!
//! ## Usage
//!
//! ```
//! use saracendb_codec::{to_canonical_cbor, from_cbor, Value};
//!
//! let value = Value::map(vec![(Value::from("name"), Value::from("alice"))]);
//! let bytes = to_canonical_cbor(&value).unwrap();
//!
//! let decoded = from_cbor(&bytes).unwrap();
//! assert_eq!(value, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod limits;
mod value;

pub use decoder::{from_cbor, CanonicalDecoder};
pub use encoder::{to_canonical_cbor, CanonicalEncoder};
pub use error::{CodecError, CodecResult};
pub use limits::{MAX_BYTES_LENGTH, MAX_CONTAINER_ELEMENTS, MAX_DEPTH};
pub use value::Value;

/// Trait for types that can be encoded to canonical CBOR.
pub trait Encode {
    /// Encode this value to canonical CBOR bytes.
    fn encode(&self) -> CodecResult<Vec<u8>>;
}

/// Trait for types that can be decoded from CBOR.
pub trait Decode: Sized {
    /// Decode this value from CBOR bytes.
    fn decode(bytes: &[u8]) -> CodecResult<Self>;
}

impl Encode for Value {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        to_canonical_cbor(self)
    }
}

impl Decode for Value {
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        from_cbor(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn value_strategy() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Integer),
            any::<f64>()
                .prop_filter("NaN has no encoding", |f| !f.is_nan())
                .prop_map(Value::Float),
            prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::Bytes),
            "[a-z]{0,8}".prop_map(Value::Text),
        ];
        leaf.prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::vec(("[a-z]{1,4}".prop_map(Value::Text), inner), 0..4)
                    .prop_map(Value::Map),
            ]
        })
    }

    #[test]
    fn trait_roundtrip() {
        let value = Value::Array(vec![Value::from(1i64), Value::from("two"), Value::Null]);
        let bytes = value.encode().unwrap();
        assert_eq!(Value::decode(&bytes).unwrap(), value);
    }

    proptest! {
        #[test]
        fn canonical_values_survive_roundtrip(value in value_strategy()) {
            let canonical = value.into_canonical();
            let bytes = to_canonical_cbor(&canonical).unwrap();
            prop_assert_eq!(from_cbor(&bytes).unwrap(), canonical.clone());
            // Re-encoding decoded output is byte-identical.
            prop_assert_eq!(to_canonical_cbor(&from_cbor(&bytes).unwrap()).unwrap(), bytes);
        }
    }
}
