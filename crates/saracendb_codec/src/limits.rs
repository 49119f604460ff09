//! Size limits shared by the encoder, the decoder and [`Value::validate`].
//!
//! Anything the encoder writes must decode again, so both sides enforce the
//! same bounds.
//!
//! [`Value::validate`]: crate::Value::validate

use crate::error::{CodecError, CodecResult};

/// Upper bound on the element count of one array or map.
pub const MAX_CONTAINER_ELEMENTS: u64 = 16 * 1024 * 1024;

/// Upper bound on the length of one byte or text string.
pub const MAX_BYTES_LENGTH: u64 = 256 * 1024 * 1024;

/// Maximum nesting of arrays, maps and tags, counting the outermost item.
///
/// An item enclosed by `depth` containers is allowed while
/// `depth < MAX_DEPTH`.
pub const MAX_DEPTH: usize = 256;

/// Fails if an item enclosed by `depth` containers is too deep.
pub(crate) fn check_depth(depth: usize) -> CodecResult<()> {
    if depth >= MAX_DEPTH {
        return Err(CodecError::invalid_structure("nesting too deep"));
    }
    Ok(())
}

/// Fails if `len` exceeds `max`.
pub(crate) fn check_len(len: u64, max: u64) -> CodecResult<()> {
    if len > max {
        return Err(CodecError::SizeLimitExceeded {
            claimed: len,
            max_allowed: max,
        });
    }
    Ok(())
}
