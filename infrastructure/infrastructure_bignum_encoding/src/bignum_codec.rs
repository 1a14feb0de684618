//! Bignum Wire Codec
//!
//! Encodes and decodes arbitrary-precision integers for the external term
//! format. Values whose magnitude fits 255 bytes use the small form
//! (tag 110); anything larger uses the large form (tag 111) with a 4-byte
//! big-endian length. The magnitude itself is always little-endian and the
//! sign travels as a separate byte (0 positive, 1 negative).

use malachite::Integer;

/// Small bignum tag ('n')
pub const SMALL_BIG_EXT: u8 = 110;

/// Large bignum tag ('o')
pub const LARGE_BIG_EXT: u8 = 111;

/// Encoding errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Magnitude needs more bytes than the 4-byte length field can carry
    MagnitudeTooLarge(usize),
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::MagnitudeTooLarge(arity) => {
                write!(f, "bignum magnitude of {} bytes exceeds wire limit", arity)
            }
        }
    }
}

impl std::error::Error for EncodeError {}

/// Decoding errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer ends before the encoding does
    BufferTooShort,
    /// Invalid format
    InvalidFormat(String),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::BufferTooShort => write!(f, "buffer too short"),
            DecodeError::InvalidFormat(message) => write!(f, "invalid format: {}", message),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Append a big integer encoding to a buffer
///
/// Selects the small form when the magnitude fits 255 bytes, otherwise
/// the large form. The tag, length field, sign byte and little-endian
/// magnitude are pushed onto `buf` in wire order.
///
/// # Arguments
/// * `buf` - Output buffer the encoding is appended to
/// * `value` - The integer value to encode
///
/// # Returns
/// * `Ok(())` - Encoding appended
/// * `Err(EncodeError::MagnitudeTooLarge)` - Magnitude exceeds the 4-byte length field
pub fn encode_big_integer(buf: &mut Vec<u8>, value: &Integer) -> Result<(), EncodeError> {
    let (magnitude, is_negative) = integer_to_bytes(value);
    let arity = magnitude.len();

    if arity <= 255 {
        buf.push(SMALL_BIG_EXT);
        buf.push(arity as u8);
    } else if arity <= u32::MAX as usize {
        buf.push(LARGE_BIG_EXT);
        buf.extend_from_slice(&(arity as u32).to_be_bytes());
    } else {
        return Err(EncodeError::MagnitudeTooLarge(arity));
    }

    buf.push(if is_negative { 1 } else { 0 });
    buf.extend_from_slice(&magnitude);
    Ok(())
}

/// Decode a big integer starting at `index`
///
/// `index` must point at the tag byte (110 or 111). Both forms are
/// accepted regardless of magnitude size.
///
/// # Arguments
/// * `data` - The buffer holding the encoding
/// * `index` - Position of the tag byte
///
/// # Returns
/// * `Ok((value, next_index))` - Decoded integer and the position after it
/// * `Err(DecodeError)` - Short buffer or unexpected tag
pub fn decode_big_integer(data: &[u8], index: usize) -> Result<(Integer, usize), DecodeError> {
    if index >= data.len() {
        return Err(DecodeError::BufferTooShort);
    }

    let tag = data[index];
    let (arity, mut pos) = match tag {
        SMALL_BIG_EXT => {
            if index + 2 > data.len() {
                return Err(DecodeError::BufferTooShort);
            }
            (data[index + 1] as usize, index + 2)
        }
        LARGE_BIG_EXT => {
            if index + 5 > data.len() {
                return Err(DecodeError::BufferTooShort);
            }
            let arity = u32::from_be_bytes([
                data[index + 1],
                data[index + 2],
                data[index + 3],
                data[index + 4],
            ]) as usize;
            (arity, index + 5)
        }
        other => {
            return Err(DecodeError::InvalidFormat(format!(
                "expected big integer tag (110 or 111), got {}",
                other
            )));
        }
    };

    if pos >= data.len() {
        return Err(DecodeError::BufferTooShort);
    }
    let is_negative = data[pos] != 0;
    pos += 1;

    if pos + arity > data.len() {
        return Err(DecodeError::BufferTooShort);
    }
    let value = bytes_to_integer(&data[pos..pos + arity], is_negative);
    Ok((value, pos + arity))
}

/// Extract little-endian magnitude bytes and a sign flag from an integer
///
/// Bytes are produced by repeated division by 256. Zero yields an empty
/// magnitude.
pub fn integer_to_bytes(value: &Integer) -> (Vec<u8>, bool) {
    let is_negative = *value < Integer::from(0);
    let abs_value = if is_negative {
        -value.clone()
    } else {
        value.clone()
    };

    let mut byte_vec = Vec::new();
    let mut v = abs_value;
    let base = Integer::from(256u64);

    while v > Integer::from(0) {
        let remainder = &v % &base;
        // Remainder is always < 256, so it fits in u64
        let rem_u64 = u64::try_from(&remainder).unwrap_or(0);
        byte_vec.push(rem_u64 as u8);
        v = &v / &base;
    }

    (byte_vec, is_negative)
}

/// Reconstruct an integer from little-endian magnitude bytes and a sign flag
///
/// The inverse of [`integer_to_bytes`]; an empty magnitude yields zero.
pub fn bytes_to_integer(bytes: &[u8], is_negative: bool) -> Integer {
    let mut value = Integer::from(0);
    let mut multiplier = Integer::from(1u64);

    for &byte in bytes {
        value += Integer::from(byte) * &multiplier;
        multiplier *= Integer::from(256u64);
    }

    if is_negative {
        -value
    } else {
        value
    }
}
