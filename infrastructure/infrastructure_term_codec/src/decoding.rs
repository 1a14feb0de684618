//! Decoding Module
//!
//! Recursive-descent parser for the external term format. The top-level
//! [`decode`] checks the version marker, unwraps the optional compressed
//! envelope and returns the first term together with the unconsumed trailing
//! bytes; [`decode_term`] parses a single term at a cursor position.
//!
//! Every length-prefixed form first checks the buffer holds the declared
//! total size and reports [`DecodeError::IncompleteData`] when it does not.
//! That is the mechanism by which a streaming caller detects "need more
//! bytes": it appends input and retries the same decode from the start.
//! Malformed data (unknown tags, bad lengths, corrupt compressed payloads)
//! is a hard [`DecodeError::InvalidFormat`] instead.

use malachite::Integer;

use entities_terms::{Atom, ImproperList, OpaqueCodec, OpaqueObject, Term, UnresolvedOpaque, OPAQUE_MARKER};
use infrastructure_bignum_encoding::{decode_big_integer, DecodeError as BignumDecodeError};

use crate::compression::{inflate, InflateError};
use crate::{
    ATOM_EXT, BINARY_EXT, COMPRESSED_EXT, INTEGER_EXT, LARGE_BIG_EXT, LARGE_TUPLE_EXT, LIST_EXT,
    MAX_DEPTH, NEW_FLOAT_EXT, NIL_EXT, SMALL_BIG_EXT, SMALL_INTEGER_EXT, SMALL_TUPLE_EXT,
    STRING_EXT, VERSION_MAGIC,
};

/// Decoding errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer ends before a complete term; the caller may append bytes and retry
    IncompleteData,
    /// Leading byte is not the version marker (carries the offending byte)
    InvalidVersion(u8),
    /// Malformed data; fatal for this message
    InvalidFormat(String),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::IncompleteData => write!(f, "incomplete data"),
            DecodeError::InvalidVersion(byte) => {
                write!(f, "unknown protocol version {}", byte)
            }
            DecodeError::InvalidFormat(message) => write!(f, "invalid format: {}", message),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<BignumDecodeError> for DecodeError {
    fn from(error: BignumDecodeError) -> Self {
        match error {
            BignumDecodeError::BufferTooShort => DecodeError::IncompleteData,
            BignumDecodeError::InvalidFormat(message) => DecodeError::InvalidFormat(message),
        }
    }
}

/// Decode one top-level message, resolving local opaque payloads with the
/// default codec
///
/// # Returns
/// * `Ok((term, remainder))` - The decoded term and the unconsumed bytes
/// * `Err(DecodeError)` - Short buffer, bad version or malformed data
pub fn decode(buffer: &[u8]) -> Result<(Term, &[u8]), DecodeError> {
    decode_with(buffer, &UnresolvedOpaque)
}

/// Decode one top-level message
///
/// The buffer must start with the version marker. A compressed envelope is
/// inflated and its payload parsed as exactly one term; the remainder
/// returned to the caller is whatever the zlib stream did not consume
/// (bytes belonging to a subsequent message). A truncated zlib stream is
/// `IncompleteData`; an envelope whose payload does not inflate to exactly
/// the declared size, or holds more than one term, is `InvalidFormat`.
///
/// # Arguments
/// * `buffer` - The encoded message, possibly followed by more stream bytes
/// * `codec` - Deserializer for opaque payloads tagged with this runtime
pub fn decode_with<'a>(
    buffer: &'a [u8],
    codec: &dyn OpaqueCodec,
) -> Result<(Term, &'a [u8]), DecodeError> {
    if buffer.is_empty() {
        return Err(DecodeError::IncompleteData);
    }
    if buffer[0] != VERSION_MAGIC {
        return Err(DecodeError::InvalidVersion(buffer[0]));
    }
    if buffer.len() < 2 {
        return Err(DecodeError::IncompleteData);
    }

    if buffer[1] == COMPRESSED_EXT {
        if buffer.len() < 6 {
            return Err(DecodeError::IncompleteData);
        }
        let declared =
            u32::from_be_bytes([buffer[2], buffer[3], buffer[4], buffer[5]]) as usize;
        let (payload, consumed) = match inflate(&buffer[6..], declared) {
            Ok(result) => result,
            Err(InflateError::Truncated) => return Err(DecodeError::IncompleteData),
            Err(error) => return Err(DecodeError::InvalidFormat(error.to_string())),
        };
        if payload.len() != declared {
            return Err(DecodeError::InvalidFormat(format!(
                "compressed payload inflates to {} bytes, envelope declared {}",
                payload.len(),
                declared
            )));
        }
        // The envelope is complete, so running out of bytes inside the
        // payload is corruption rather than a streaming condition
        let (term, next) = match decode_term_at(&payload, 0, 0, codec) {
            Ok(result) => result,
            Err(DecodeError::IncompleteData) => {
                return Err(DecodeError::InvalidFormat(String::from(
                    "compressed payload holds an incomplete term",
                )))
            }
            Err(error) => return Err(error),
        };
        if next != payload.len() {
            return Err(DecodeError::InvalidFormat(format!(
                "compressed payload holds {} trailing bytes after its term",
                payload.len() - next
            )));
        }
        return Ok((term, &buffer[6 + consumed..]));
    }

    let (term, next) = decode_term_at(buffer, 1, 0, codec)?;
    Ok((term, &buffer[next..]))
}

/// Parse a single term at `index`, resolving local opaque payloads with the
/// default codec
///
/// # Returns
/// * `Ok((term, next_index))` - The decoded term and the position after it
/// * `Err(DecodeError)` - Short buffer or malformed data
pub fn decode_term(buffer: &[u8], index: usize) -> Result<(Term, usize), DecodeError> {
    decode_term_at(buffer, index, 0, &UnresolvedOpaque)
}

/// Parse a single term at `index` with an explicit opaque codec
pub fn decode_term_with(
    buffer: &[u8],
    index: usize,
    codec: &dyn OpaqueCodec,
) -> Result<(Term, usize), DecodeError> {
    decode_term_at(buffer, index, 0, codec)
}

/// Check the buffer reaches at least `end`
fn need(buffer: &[u8], end: usize) -> Result<(), DecodeError> {
    if end > buffer.len() {
        return Err(DecodeError::IncompleteData);
    }
    Ok(())
}

fn decode_term_at(
    buffer: &[u8],
    index: usize,
    depth: usize,
    codec: &dyn OpaqueCodec,
) -> Result<(Term, usize), DecodeError> {
    if depth >= MAX_DEPTH {
        return Err(DecodeError::InvalidFormat(format!(
            "term nesting deeper than {} levels",
            MAX_DEPTH
        )));
    }
    if index >= buffer.len() {
        return Err(DecodeError::IncompleteData);
    }

    match buffer[index] {
        SMALL_INTEGER_EXT => {
            need(buffer, index + 2)?;
            Ok((Term::Integer(Integer::from(buffer[index + 1])), index + 2))
        }
        INTEGER_EXT => {
            need(buffer, index + 5)?;
            let value = i32::from_be_bytes([
                buffer[index + 1],
                buffer[index + 2],
                buffer[index + 3],
                buffer[index + 4],
            ]);
            Ok((Term::Integer(Integer::from(value)), index + 5))
        }
        SMALL_BIG_EXT | LARGE_BIG_EXT => {
            let (value, next) = decode_big_integer(buffer, index)?;
            Ok((Term::Integer(value), next))
        }
        NEW_FLOAT_EXT => {
            need(buffer, index + 9)?;
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&buffer[index + 1..index + 9]);
            Ok((Term::Float(f64::from_be_bytes(bytes)), index + 9))
        }
        ATOM_EXT => {
            need(buffer, index + 3)?;
            let length = u16::from_be_bytes([buffer[index + 1], buffer[index + 2]]) as usize;
            let end = index + 3 + length;
            need(buffer, end)?;
            let term = decode_atom_text(&buffer[index + 3..end])?;
            Ok((term, end))
        }
        NIL_EXT => Ok((Term::nil(), index + 1)),
        STRING_EXT => {
            need(buffer, index + 3)?;
            let length = u16::from_be_bytes([buffer[index + 1], buffer[index + 2]]) as usize;
            let end = index + 3 + length;
            need(buffer, end)?;
            // The compact form carries byte-sized code points; it decodes to
            // a plain list of integers, as the general form would
            let elements = buffer[index + 3..end]
                .iter()
                .map(|&byte| Term::Integer(Integer::from(byte)))
                .collect();
            Ok((Term::List(elements), end))
        }
        BINARY_EXT => {
            need(buffer, index + 5)?;
            let length = u32::from_be_bytes([
                buffer[index + 1],
                buffer[index + 2],
                buffer[index + 3],
                buffer[index + 4],
            ]) as usize;
            let end = index + 5 + length;
            need(buffer, end)?;
            Ok((Term::Binary(buffer[index + 5..end].to_vec()), end))
        }
        SMALL_TUPLE_EXT => {
            need(buffer, index + 2)?;
            let arity = buffer[index + 1] as usize;
            decode_tuple_body(buffer, index + 2, arity, depth, codec)
        }
        LARGE_TUPLE_EXT => {
            need(buffer, index + 5)?;
            let arity = u32::from_be_bytes([
                buffer[index + 1],
                buffer[index + 2],
                buffer[index + 3],
                buffer[index + 4],
            ]) as usize;
            decode_tuple_body(buffer, index + 5, arity, depth, codec)
        }
        LIST_EXT => {
            need(buffer, index + 5)?;
            let length = u32::from_be_bytes([
                buffer[index + 1],
                buffer[index + 2],
                buffer[index + 3],
                buffer[index + 4],
            ]) as usize;
            let mut elements = Vec::new();
            let mut cursor = index + 5;
            for _ in 0..length {
                let (element, next) = decode_term_at(buffer, cursor, depth + 1, codec)?;
                elements.push(element);
                cursor = next;
            }
            if cursor >= buffer.len() {
                return Err(DecodeError::IncompleteData);
            }
            if buffer[cursor] == NIL_EXT {
                return Ok((Term::List(elements), cursor + 1));
            }
            let (tail, next) = decode_term_at(buffer, cursor, depth + 1, codec)?;
            let list = ImproperList::new(elements, tail)
                .map_err(|error| DecodeError::InvalidFormat(error.to_string()))?;
            Ok((Term::ImproperList(list), next))
        }
        other => Err(DecodeError::InvalidFormat(format!(
            "unsupported tag {}",
            other
        ))),
    }
}

/// Fold reserved atom texts into their host values
fn decode_atom_text(bytes: &[u8]) -> Result<Term, DecodeError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| DecodeError::InvalidFormat(String::from("atom text is not valid UTF-8")))?;
    let term = match text {
        "true" => Term::Boolean(true),
        "false" => Term::Boolean(false),
        "undefined" => Term::Undefined,
        name => Term::Atom(Atom::new(name).map_err(|error| {
            DecodeError::InvalidFormat(error.to_string())
        })?),
    };
    Ok(term)
}

fn decode_tuple_body(
    buffer: &[u8],
    index: usize,
    arity: usize,
    depth: usize,
    codec: &dyn OpaqueCodec,
) -> Result<(Term, usize), DecodeError> {
    let mut elements = Vec::new();
    let mut cursor = index;
    for _ in 0..arity {
        let (element, next) = decode_term_at(buffer, cursor, depth + 1, codec)?;
        elements.push(element);
        cursor = next;
    }
    Ok((fold_tuple(elements, codec)?, cursor))
}

/// Reinterpret a marker-led 3-tuple as an opaque object
fn fold_tuple(elements: Vec<Term>, codec: &dyn OpaqueCodec) -> Result<Term, DecodeError> {
    let marked = elements.len() == 3
        && matches!(&elements[0], Term::Atom(atom) if atom.as_str() == OPAQUE_MARKER);
    if !marked {
        return Ok(Term::Tuple(elements));
    }

    let mut parts = elements.into_iter();
    parts.next();
    let language = match parts.next() {
        Some(Term::Atom(atom)) => atom,
        other => {
            return Err(DecodeError::InvalidFormat(format!(
                "opaque tuple language is {}, expected an atom",
                other.map_or("missing", |t| t.variant_name())
            )))
        }
    };
    let data = match parts.next() {
        Some(Term::Binary(data)) => data,
        other => {
            return Err(DecodeError::InvalidFormat(format!(
                "opaque tuple payload is {}, expected a binary",
                other.map_or("missing", |t| t.variant_name())
            )))
        }
    };
    OpaqueObject::decode(data, language, codec)
        .map_err(|error| DecodeError::InvalidFormat(error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use entities_terms::LOCAL_LANGUAGE;

    fn decode_one(bytes: &[u8]) -> Term {
        let (term, remainder) = decode(bytes).unwrap();
        assert!(remainder.is_empty());
        term
    }

    #[test]
    fn test_empty_buffer() {
        assert_eq!(decode(&[]), Err(DecodeError::IncompleteData));
    }

    #[test]
    fn test_version_marker_alone() {
        assert_eq!(decode(&[131]), Err(DecodeError::IncompleteData));
    }

    #[test]
    fn test_invalid_version() {
        assert_eq!(decode(&[130, 106]), Err(DecodeError::InvalidVersion(130)));
    }

    #[test]
    fn test_unsupported_tag() {
        assert!(matches!(
            decode(&[131, 255]),
            Err(DecodeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_nil() {
        assert_eq!(decode_one(&[131, 106]), Term::nil());
    }

    #[test]
    fn test_small_integer() {
        assert_eq!(decode_one(&[131, 97, 255]), Term::int(255));
    }

    #[test]
    fn test_integer() {
        assert_eq!(decode_one(&[131, 98, 0, 0, 1, 0]), Term::int(256));
        assert_eq!(
            decode_one(&[131, 98, 255, 255, 255, 255]),
            Term::int(-1)
        );
    }

    #[test]
    fn test_small_bignum() {
        // -2^40: six magnitude bytes, negative sign
        let term = decode_one(&[131, 110, 6, 1, 0, 0, 0, 0, 0, 1]);
        assert_eq!(term, Term::Integer(-(Integer::from(1u32) << 40u64)));
    }

    #[test]
    fn test_float() {
        let mut bytes = vec![131, 70];
        bytes.extend_from_slice(&1.5f64.to_be_bytes());
        assert_eq!(decode_one(&bytes), Term::Float(1.5));
    }

    #[test]
    fn test_atom() {
        assert_eq!(
            decode_one(&[131, 100, 0, 2, b'o', b'k']),
            Term::Atom(Atom::new("ok").unwrap())
        );
    }

    #[test]
    fn test_reserved_atoms_fold() {
        assert_eq!(
            decode_one(&[131, 100, 0, 4, b't', b'r', b'u', b'e']),
            Term::Boolean(true)
        );
        assert_eq!(
            decode_one(&[131, 100, 0, 5, b'f', b'a', b'l', b's', b'e']),
            Term::Boolean(false)
        );
        assert_eq!(
            decode_one(b"\x83\x64\x00\x09undefined"),
            Term::Undefined
        );
    }

    #[test]
    fn test_atom_rejects_invalid_utf8() {
        assert!(matches!(
            decode(&[131, 100, 0, 1, 0xff]),
            Err(DecodeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_atom_rejects_oversized_wire_length() {
        let mut bytes = vec![131, 100, 1, 0];
        bytes.extend_from_slice(&[b'a'; 256]);
        assert!(matches!(
            decode(&bytes),
            Err(DecodeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_string_decodes_to_integer_list() {
        assert_eq!(
            decode_one(&[131, 107, 0, 2, 104, 105]),
            Term::List(vec![Term::int(104), Term::int(105)])
        );
    }

    #[test]
    fn test_binary() {
        assert_eq!(
            decode_one(&[131, 109, 0, 0, 0, 3, 1, 2, 3]),
            Term::Binary(vec![1, 2, 3])
        );
    }

    #[test]
    fn test_small_tuple() {
        assert_eq!(
            decode_one(&[131, 104, 2, 97, 1, 97, 2]),
            Term::Tuple(vec![Term::int(1), Term::int(2)])
        );
    }

    #[test]
    fn test_large_tuple() {
        assert_eq!(
            decode_one(&[131, 105, 0, 0, 0, 1, 106]),
            Term::Tuple(vec![Term::nil()])
        );
    }

    #[test]
    fn test_proper_list() {
        assert_eq!(
            decode_one(&[131, 108, 0, 0, 0, 2, 97, 1, 97, 2, 106]),
            Term::List(vec![Term::int(1), Term::int(2)])
        );
    }

    #[test]
    fn test_improper_list() {
        let (term, _) = decode(&[131, 108, 0, 0, 0, 1, 97, 1, 97, 2]).unwrap();
        let expected = ImproperList::new(vec![Term::int(1)], Term::int(2)).unwrap();
        assert_eq!(term, Term::ImproperList(expected));
    }

    #[test]
    fn test_zero_length_list_with_nil_tail_is_empty() {
        assert_eq!(decode_one(&[131, 108, 0, 0, 0, 0, 106]), Term::nil());
    }

    #[test]
    fn test_zero_length_list_with_tail_is_invalid() {
        assert!(matches!(
            decode(&[131, 108, 0, 0, 0, 0, 97, 1]),
            Err(DecodeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_list_missing_tail_is_incomplete() {
        assert_eq!(
            decode(&[131, 108, 0, 0, 0, 1, 97, 1]),
            Err(DecodeError::IncompleteData)
        );
    }

    #[test]
    fn test_remainder_is_returned() {
        let (term, remainder) = decode(&[131, 106, 131, 97, 1]).unwrap();
        assert_eq!(term, Term::nil());
        assert_eq!(remainder, &[131, 97, 1]);
    }

    #[test]
    fn test_truncation_of_length_prefixed_forms() {
        let encodings: Vec<Vec<u8>> = vec![
            vec![131, 97, 255],
            vec![131, 98, 0, 0, 1, 0],
            vec![131, 100, 0, 2, b'o', b'k'],
            vec![131, 107, 0, 2, 104, 105],
            vec![131, 109, 0, 0, 0, 2, 9, 9],
            vec![131, 104, 2, 97, 1, 97, 2],
            vec![131, 108, 0, 0, 0, 1, 97, 1, 106],
            vec![131, 110, 2, 0, 0, 1],
        ];
        for encoding in encodings {
            for cut in 0..encoding.len() {
                assert_eq!(
                    decode(&encoding[..cut]),
                    Err(DecodeError::IncompleteData),
                    "prefix of {:?} at {}",
                    encoding,
                    cut
                );
            }
        }
    }

    #[test]
    fn test_nesting_depth_limit() {
        // Tuples nested past the depth limit: [104, 1] repeated, closed by
        // nil. The guard must trip, not the native stack.
        let mut bytes = vec![131];
        for _ in 0..2 * MAX_DEPTH {
            bytes.extend_from_slice(&[104, 1]);
        }
        bytes.push(106);
        assert!(matches!(
            decode(&bytes),
            Err(DecodeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_nesting_below_the_depth_limit_decodes() {
        let depth = MAX_DEPTH / 2;
        let mut bytes = vec![131];
        for _ in 0..depth {
            bytes.extend_from_slice(&[104, 1]);
        }
        bytes.push(106);
        let mut expected = Term::nil();
        for _ in 0..depth {
            expected = Term::Tuple(vec![expected]);
        }
        assert_eq!(decode_one(&bytes), expected);
    }

    #[test]
    fn test_opaque_tuple_reinterpreted() {
        let mut bytes = vec![131, 104, 3];
        bytes.push(100);
        bytes.extend_from_slice(&(OPAQUE_MARKER.len() as u16).to_be_bytes());
        bytes.extend_from_slice(OPAQUE_MARKER.as_bytes());
        bytes.extend_from_slice(&[100, 0, 4, b'j', b'a', b'v', b'a']);
        bytes.extend_from_slice(&[109, 0, 0, 0, 2, 7, 8]);

        let term = decode_one(&bytes);
        assert_eq!(
            term,
            Term::Opaque(OpaqueObject::new(vec![7, 8], Atom::new("java").unwrap()))
        );
    }

    #[test]
    fn test_opaque_tuple_local_language_stays_raw_with_default_codec() {
        let mut bytes = vec![131, 104, 3];
        bytes.push(100);
        bytes.extend_from_slice(&(OPAQUE_MARKER.len() as u16).to_be_bytes());
        bytes.extend_from_slice(OPAQUE_MARKER.as_bytes());
        bytes.extend_from_slice(&[100, 0, 4, b'r', b'u', b's', b't']);
        bytes.extend_from_slice(&[109, 0, 0, 0, 1, 5]);

        let term = decode_one(&bytes);
        assert_eq!(
            term,
            Term::Opaque(OpaqueObject::new(
                vec![5],
                Atom::new(LOCAL_LANGUAGE).unwrap()
            ))
        );
    }

    #[test]
    fn test_opaque_tuple_with_wrong_shapes_is_invalid() {
        // Language element is an integer, not an atom
        let mut bytes = vec![131, 104, 3];
        bytes.push(100);
        bytes.extend_from_slice(&(OPAQUE_MARKER.len() as u16).to_be_bytes());
        bytes.extend_from_slice(OPAQUE_MARKER.as_bytes());
        bytes.extend_from_slice(&[97, 1]);
        bytes.extend_from_slice(&[109, 0, 0, 0, 1, 5]);
        assert!(matches!(
            decode(&bytes),
            Err(DecodeError::InvalidFormat(_))
        ));

        // Payload element is a list, not a binary
        let mut bytes = vec![131, 104, 3];
        bytes.push(100);
        bytes.extend_from_slice(&(OPAQUE_MARKER.len() as u16).to_be_bytes());
        bytes.extend_from_slice(OPAQUE_MARKER.as_bytes());
        bytes.extend_from_slice(&[100, 0, 4, b'j', b'a', b'v', b'a']);
        bytes.push(106);
        assert!(matches!(
            decode(&bytes),
            Err(DecodeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_marker_in_other_arities_stays_a_tuple() {
        let mut bytes = vec![131, 104, 2];
        bytes.push(100);
        bytes.extend_from_slice(&(OPAQUE_MARKER.len() as u16).to_be_bytes());
        bytes.extend_from_slice(OPAQUE_MARKER.as_bytes());
        bytes.extend_from_slice(&[97, 1]);
        let term = decode_one(&bytes);
        assert!(matches!(term, Term::Tuple(elements) if elements.len() == 2));
    }

    #[test]
    fn test_decode_term_cursor() {
        let bytes = [0, 0, 131, 97, 7];
        let (term, next) = decode_term(&bytes, 3).unwrap();
        assert_eq!(term, Term::int(7));
        assert_eq!(next, 5);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(DecodeError::IncompleteData.to_string(), "incomplete data");
        assert!(DecodeError::InvalidVersion(42).to_string().contains("42"));
        assert!(DecodeError::InvalidFormat(String::from("bad tag"))
            .to_string()
            .contains("bad tag"));
    }
}
