//! Canonical CBOR decoder.

use crate::error::{CodecError, CodecResult};
use crate::limits::{check_depth, check_len, MAX_BYTES_LENGTH, MAX_CONTAINER_ELEMENTS};
use crate::value::Value;
use std::cmp::Ordering;

/// Decode a value from CBOR bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid canonical CBOR, contain
/// forbidden constructs (NaN, indefinite-length), or continue past the
/// first item.
pub fn from_cbor(bytes: &[u8]) -> CodecResult<Value> {
    let mut decoder = CanonicalDecoder::new(bytes);
    let value = decoder.decode()?;
    if !decoder.is_empty() {
        return Err(CodecError::TrailingBytes {
            remaining: decoder.remaining().len(),
        });
    }
    Ok(value)
}

/// Additional-info value marking an indefinite length.
const INDEFINITE: u8 = 31;

/// The initial byte of a data item, split into its two fields.
#[derive(Debug, Clone, Copy)]
struct Head {
    major: u8,
    info: u8,
}

impl Head {
    fn from_byte(byte: u8) -> Self {
        Self {
            major: byte >> 5,
            info: byte & 0x1f,
        }
    }
}

/// A strict decoder for canonical CBOR.
///
/// Anything the encoder would not have produced is rejected: non-shortest
/// arguments, short floats, NaN, indefinite lengths, unsorted or repeated
/// map keys.
pub struct CanonicalDecoder<'a> {
    data: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> CanonicalDecoder<'a> {
    /// Create a new decoder for the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            depth: 0,
        }
    }

    /// Check if all bytes have been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    /// Decode the next value.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed or non-canonical input, or when nesting
    /// exceeds the depth limit.
    pub fn decode(&mut self) -> CodecResult<Value> {
        check_depth(self.depth)?;
        self.depth += 1;
        let value = self.decode_item();
        self.depth -= 1;
        value
    }

    fn decode_item(&mut self) -> CodecResult<Value> {
        let head = Head::from_byte(self.take(1)?[0]);

        match head.major {
            0 => {
                let n = self.argument(head)?;
                i64::try_from(n)
                    .map(Value::Integer)
                    .map_err(|_| CodecError::unsupported_type(format!("integer {n} exceeds i64")))
            }
            1 => {
                let n = self.argument(head)?;
                // -1 - n, representable while n fits in i64
                i64::try_from(n)
                    .map(|n| Value::Integer(-1 - n))
                    .map_err(|_| CodecError::unsupported_type(format!("integer -1-{n} below i64")))
            }
            2 => {
                let len = self.length(head, MAX_BYTES_LENGTH)?;
                Ok(Value::Bytes(self.take(len)?.to_vec()))
            }
            3 => {
                let len = self.length(head, MAX_BYTES_LENGTH)?;
                let text = std::str::from_utf8(self.take(len)?).map_err(|_| CodecError::InvalidUtf8)?;
                Ok(Value::Text(text.to_owned()))
            }
            4 => {
                let len = self.length(head, MAX_CONTAINER_ELEMENTS)?;
                let mut items = Vec::with_capacity(self.preallocation(len, 1));
                for _ in 0..len {
                    items.push(self.decode()?);
                }
                Ok(Value::Array(items))
            }
            5 => {
                let len = self.length(head, MAX_CONTAINER_ELEMENTS)?;
                self.decode_map(len)
            }
            6 => {
                // Tags carry no meaning for stored values
                self.argument(head)?;
                self.decode()
            }
            _ => self.decode_simple(head.info),
        }
    }

    /// Consumes `len` bytes.
    fn take(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(CodecError::UnexpectedEof)?;
        let data = self.data;
        let bytes = &data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Reads the argument of `head`, insisting on its shortest form.
    fn argument(&mut self, head: Head) -> CodecResult<u64> {
        let (width, floor) = match head.info {
            0..=23 => return Ok(u64::from(head.info)),
            24 => (1, 24),
            25 => (2, 1 << 8),
            26 => (4, 1 << 16),
            27 => (8, 1 << 32),
            INDEFINITE => return Err(CodecError::IndefiniteLengthForbidden),
            _ => return Err(CodecError::invalid_structure("reserved additional info")),
        };

        let value = self
            .take(width)?
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
        if value < floor {
            return Err(CodecError::invalid_structure(
                "non-canonical: value could be encoded in fewer bytes",
            ));
        }
        Ok(value)
    }

    /// Reads a string or container length no larger than `max`.
    fn length(&mut self, head: Head, max: u64) -> CodecResult<usize> {
        let claimed = self.argument(head)?;
        check_len(claimed, max)?;
        usize::try_from(claimed).map_err(|_| CodecError::SizeLimitExceeded {
            claimed,
            max_allowed: max,
        })
    }

    /// Capacity to reserve for `len` elements of at least `min_item_bytes`
    /// each.
    ///
    /// A header may claim more elements than the input can hold; reserving
    /// only what the remaining bytes could encode keeps a corrupt header from
    /// allocating far beyond the input size.
    fn preallocation(&self, len: usize, min_item_bytes: usize) -> usize {
        len.min(self.remaining().len() / min_item_bytes)
    }

    fn decode_map(&mut self, len: usize) -> CodecResult<Value> {
        let data = self.data;
        let mut pairs = Vec::with_capacity(self.preallocation(len, 2));
        let mut prev_key: Option<&'a [u8]> = None;

        for _ in 0..len {
            let key_start = self.pos;
            let key = self.decode()?;
            let key_bytes = &data[key_start..self.pos];

            if let Some(prev) = prev_key {
                match canonical_order(prev, key_bytes) {
                    Ordering::Less => {}
                    Ordering::Equal => return Err(CodecError::DuplicateKey),
                    Ordering::Greater => {
                        return Err(CodecError::invalid_structure(
                            "non-canonical: map keys not in sorted order",
                        ))
                    }
                }
            }
            prev_key = Some(key_bytes);

            pairs.push((key, self.decode()?));
        }

        Ok(Value::Map(pairs))
    }

    fn decode_simple(&mut self, info: u8) -> CodecResult<Value> {
        match info {
            20 => Ok(Value::Bool(false)),
            21 => Ok(Value::Bool(true)),
            // undefined reads as null
            22 | 23 => Ok(Value::Null),
            24 => match self.take(1)?[0] {
                0..=31 => Err(CodecError::invalid_structure(
                    "non-canonical: simple value should use direct encoding",
                )),
                simple => Err(CodecError::unsupported_type(format!("simple value {simple}"))),
            },
            25 | 26 => Err(CodecError::invalid_structure(
                "non-canonical: floats must use 64-bit encoding",
            )),
            27 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(self.take(8)?);
                let f = f64::from_be_bytes(raw);
                if f.is_nan() {
                    return Err(CodecError::NaNForbidden);
                }
                Ok(Value::Float(f))
            }
            28..=30 => Err(CodecError::invalid_structure("reserved additional info")),
            INDEFINITE => Err(CodecError::invalid_structure("break without indefinite")),
            _ => Err(CodecError::unsupported_type(format!("simple value {info}"))),
        }
    }
}

/// Canonical key order: shorter encodings first, then bytewise.
fn canonical_order(a: &[u8], b: &[u8]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
