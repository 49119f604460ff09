//! Canonical CBOR encoder.

use crate::error::{CodecError, CodecResult};
use crate::limits::{check_depth, check_len, MAX_BYTES_LENGTH, MAX_CONTAINER_ELEMENTS};
use crate::value::Value;

/// Encode a value to canonical CBOR bytes.
///
/// This function produces deterministic output following the canonical
/// CBOR rules specified in RFC 8949 Section 4.2.1:
/// - Map keys are sorted by their encoded form (length-first, then bytewise)
/// - Integers use the shortest possible encoding
/// - No indefinite-length encoding
///
/// # Errors
///
/// Returns an error if the value cannot be encoded (NaN floats or duplicate
/// map keys).
pub fn to_canonical_cbor(value: &Value) -> CodecResult<Vec<u8>> {
    let mut encoder = CanonicalEncoder::new();
    encoder.encode(value)?;
    Ok(encoder.into_bytes())
}

/// A canonical CBOR encoder.
///
/// Identical values always produce identical bytes, which is what makes
/// rewriting an unchanged store byte-for-byte reproducible.
#[derive(Debug, Default)]
pub struct CanonicalEncoder {
    buffer: Vec<u8>,
}

impl CanonicalEncoder {
    /// Create a new encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume this encoder and return the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Append the encoding of `value`.
    ///
    /// # Errors
    ///
    /// Returns an error for NaN floats, duplicate map keys, or a value over
    /// the decoder's size or nesting limits. The buffer may then hold a
    /// partial item.
    pub fn encode(&mut self, value: &Value) -> CodecResult<()> {
        self.encode_at(value, 0)
    }

    /// Encodes `value`, enclosed by `depth` containers.
    fn encode_at(&mut self, value: &Value, depth: usize) -> CodecResult<()> {
        check_depth(depth)?;
        match value {
            Value::Null => self.buffer.push(0xf6),
            Value::Bool(false) => self.buffer.push(0xf4),
            Value::Bool(true) => self.buffer.push(0xf5),
            Value::Integer(n) => match u64::try_from(*n) {
                Ok(n) => self.head(0, n),
                // -1 - n for negative n, never below zero
                Err(_) => self.head(1, (-1 - *n).unsigned_abs()),
            },
            Value::Float(f) => {
                if f.is_nan() {
                    return Err(CodecError::NaNForbidden);
                }
                // Always double precision; the decoder rejects shorter forms.
                self.buffer.push(0xfb);
                self.buffer.extend_from_slice(&f.to_be_bytes());
            }
            Value::Bytes(bytes) => {
                self.sized_head(2, bytes.len(), MAX_BYTES_LENGTH)?;
                self.buffer.extend_from_slice(bytes);
            }
            Value::Text(text) => {
                self.sized_head(3, text.len(), MAX_BYTES_LENGTH)?;
                self.buffer.extend_from_slice(text.as_bytes());
            }
            Value::Array(items) => {
                self.sized_head(4, items.len(), MAX_CONTAINER_ELEMENTS)?;
                for item in items {
                    self.encode_at(item, depth + 1)?;
                }
            }
            Value::Map(pairs) => self.encode_map(pairs, depth)?,
        }
        Ok(())
    }

    /// Writes a length head after checking `len` against `max`.
    fn sized_head(&mut self, major: u8, len: usize, max: u64) -> CodecResult<()> {
        let len = len as u64;
        check_len(len, max)?;
        self.head(major, len);
        Ok(())
    }

    /// Writes a major type and its argument in the shortest form.
    #[allow(clippy::cast_possible_truncation)]
    fn head(&mut self, major: u8, arg: u64) {
        let major = major << 5;
        let width: usize = match arg {
            0..=23 => {
                self.buffer.push(major | arg as u8);
                return;
            }
            24..=0xff => 1,
            0x100..=0xffff => 2,
            0x1_0000..=0xffff_ffff => 4,
            _ => 8,
        };
        // info 24, 25, 26, 27 for 1, 2, 4, 8 argument bytes
        self.buffer.push(major | (24 + width.trailing_zeros() as u8));
        self.buffer.extend_from_slice(&arg.to_be_bytes()[8 - width..]);
    }

    fn encode_map(&mut self, pairs: &[(Value, Value)], depth: usize) -> CodecResult<()> {
        check_len(pairs.len() as u64, MAX_CONTAINER_ELEMENTS)?;
        let mut entries = pairs
            .iter()
            .map(|(key, value)| {
                let mut key_encoder = Self::new();
                key_encoder.encode_at(key, depth + 1)?;
                Ok((key_encoder.into_bytes(), value))
            })
            .collect::<CodecResult<Vec<_>>>()?;

        // Length first, then bytewise
        entries.sort_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        if entries.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(CodecError::DuplicateKey);
        }

        self.head(5, entries.len() as u64);
        for (key, value) in entries {
            self.buffer.extend_from_slice(&key);
            self.encode_at(value, depth + 1)?;
        }
        Ok(())
    }
}
