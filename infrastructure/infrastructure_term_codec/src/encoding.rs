//! Encoding Module
//!
//! Produces the canonical byte encoding of a term. [`encode_term`] dispatches
//! on the term variant and applies the representation-selection rules:
//! compact byte-list form for short all-byte lists, integer width selection
//! across the small/4-byte/bignum forms, and the reserved atom texts for
//! booleans and the "no value" sentinel. [`encode`] adds the version marker
//! and, when requested, the compressed-term envelope — but only when the
//! compressed form is strictly smaller, so compression never inflates
//! output.

use malachite::Integer;

use entities_terms::{MarshalError, Term, ERLANG_LANGUAGE, OPAQUE_MARKER};
use infrastructure_bignum_encoding::{
    encode_big_integer, EncodeError as BignumEncodeError,
};

use crate::compression::{deflate, CompressionOption};
use crate::{
    ATOM_EXT, BINARY_EXT, COMPRESSED_EXT, INTEGER_EXT, LARGE_TUPLE_EXT, LIST_EXT, NEW_FLOAT_EXT,
    NIL_EXT, SMALL_INTEGER_EXT, SMALL_TUPLE_EXT, STRING_EXT, VERSION_MAGIC,
};

/// Encoding errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A length or arity exceeds the format's 4-byte maximum
    InvalidLength(String),
    /// A value has no wire mapping and its serializer rejected it
    UnsupportedType(String),
    /// The zlib layer failed while building a compressed envelope
    CompressionFailed(String),
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::InvalidLength(message) => write!(f, "invalid length: {}", message),
            EncodeError::UnsupportedType(kind) => {
                write!(f, "unsupported data type: {}", kind)
            }
            EncodeError::CompressionFailed(message) => {
                write!(f, "compression failed: {}", message)
            }
        }
    }
}

impl std::error::Error for EncodeError {}

impl From<BignumEncodeError> for EncodeError {
    fn from(error: BignumEncodeError) -> Self {
        EncodeError::InvalidLength(error.to_string())
    }
}

impl From<MarshalError> for EncodeError {
    fn from(error: MarshalError) -> Self {
        EncodeError::UnsupportedType(error.to_string())
    }
}

/// Encode one top-level message
///
/// The canonical uncompressed body is always produced first. When
/// compression is requested, the compressed envelope (version byte, marker
/// byte, 4-byte uncompressed length, zlib payload) is emitted only if it is
/// strictly smaller than the plain form; on a tie or worse the compressed
/// attempt is discarded. A body too long for the envelope's 4-byte length
/// field skips compression the same way.
pub fn encode(term: &Term, compression: CompressionOption) -> Result<Vec<u8>, EncodeError> {
    let body = encode_term(term)?;

    if let Some(level) = compression.zlib_level() {
        if body.len() <= u32::MAX as usize {
            let deflated = deflate(&body, level)
                .map_err(|error| EncodeError::CompressionFailed(error.to_string()))?;
            if 6 + deflated.len() < 1 + body.len() {
                let mut out = Vec::with_capacity(6 + deflated.len());
                out.push(VERSION_MAGIC);
                out.push(COMPRESSED_EXT);
                out.extend_from_slice(&(body.len() as u32).to_be_bytes());
                out.extend_from_slice(&deflated);
                return Ok(out);
            }
        }
    }

    let mut out = Vec::with_capacity(1 + body.len());
    out.push(VERSION_MAGIC);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Encode a single term without the version marker
pub fn encode_term(term: &Term) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    encode_term_into(term, &mut buf)?;
    Ok(buf)
}

// Arms are kept in the format's documented precedence: tuples, improper
// lists, lists, text, atoms, binaries, booleans before integers, integers,
// floats, the "no value" sentinel, opaque objects.
fn encode_term_into(term: &Term, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    match term {
        Term::Tuple(elements) => {
            if elements.len() <= 255 {
                buf.push(SMALL_TUPLE_EXT);
                buf.push(elements.len() as u8);
            } else if elements.len() <= u32::MAX as usize {
                buf.push(LARGE_TUPLE_EXT);
                buf.extend_from_slice(&(elements.len() as u32).to_be_bytes());
            } else {
                return Err(EncodeError::InvalidLength(format!(
                    "tuple arity {} exceeds the 4-byte field",
                    elements.len()
                )));
            }
            for element in elements {
                encode_term_into(element, buf)?;
            }
            Ok(())
        }
        Term::ImproperList(list) => {
            // Construction guarantees a non-empty sequence; the tail term
            // replaces the nil terminator
            let elements = list.elements();
            if elements.len() > u32::MAX as usize {
                return Err(EncodeError::InvalidLength(format!(
                    "list length {} exceeds the 4-byte field",
                    elements.len()
                )));
            }
            buf.push(LIST_EXT);
            buf.extend_from_slice(&(elements.len() as u32).to_be_bytes());
            for element in elements {
                encode_term_into(element, buf)?;
            }
            encode_term_into(list.tail(), buf)
        }
        Term::List(elements) => encode_list_into(elements, buf),
        Term::CharList(text) => {
            // Text has no wire form of its own; its code points encode as a
            // list of integers
            let elements: Vec<Term> = text
                .chars()
                .map(|c| Term::Integer(Integer::from(c as u32)))
                .collect();
            encode_list_into(&elements, buf)
        }
        Term::Atom(atom) => {
            encode_atom_text(atom.as_str(), buf);
            Ok(())
        }
        Term::Binary(data) => {
            if data.len() > u32::MAX as usize {
                return Err(EncodeError::InvalidLength(format!(
                    "binary length {} exceeds the 4-byte field",
                    data.len()
                )));
            }
            buf.push(BINARY_EXT);
            buf.extend_from_slice(&(data.len() as u32).to_be_bytes());
            buf.extend_from_slice(data);
            Ok(())
        }
        // Booleans take the reserved atom texts ahead of integer handling
        Term::Boolean(true) => {
            encode_atom_text("true", buf);
            Ok(())
        }
        Term::Boolean(false) => {
            encode_atom_text("false", buf);
            Ok(())
        }
        Term::Integer(value) => encode_integer_into(value, buf),
        Term::Float(value) => {
            buf.push(NEW_FLOAT_EXT);
            buf.extend_from_slice(&value.to_be_bytes());
            Ok(())
        }
        Term::Undefined => {
            encode_atom_text("undefined", buf);
            Ok(())
        }
        Term::Opaque(object) => {
            if object.language().as_str() == ERLANG_LANGUAGE {
                // The payload is already a complete encoding produced by the
                // peer; splice it verbatim
                buf.extend_from_slice(object.data());
                return Ok(());
            }
            buf.push(SMALL_TUPLE_EXT);
            buf.push(3);
            encode_atom_text(OPAQUE_MARKER, buf);
            encode_atom_text(object.language().as_str(), buf);
            encode_term_into(&Term::Binary(object.data().to_vec()), buf)
        }
    }
}

/// Write an atom's tag, length and text; the text is bounded by the Atom type
fn encode_atom_text(text: &str, buf: &mut Vec<u8>) {
    buf.push(ATOM_EXT);
    buf.extend_from_slice(&(text.len() as u16).to_be_bytes());
    buf.extend_from_slice(text.as_bytes());
}

fn encode_list_into(elements: &[Term], buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    // The empty list is always the nil tag, ahead of any compact form
    if elements.is_empty() {
        buf.push(NIL_EXT);
        return Ok(());
    }
    if elements.len() <= 65535 {
        if let Some(bytes) = compact_byte_form(elements) {
            buf.push(STRING_EXT);
            buf.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
            buf.extend_from_slice(&bytes);
            return Ok(());
        }
    }
    if elements.len() > u32::MAX as usize {
        return Err(EncodeError::InvalidLength(format!(
            "list length {} exceeds the 4-byte field",
            elements.len()
        )));
    }
    buf.push(LIST_EXT);
    buf.extend_from_slice(&(elements.len() as u32).to_be_bytes());
    for element in elements {
        encode_term_into(element, buf)?;
    }
    buf.push(NIL_EXT);
    Ok(())
}

/// The compact form applies only when every element is an integer in 0..=255
fn compact_byte_form(elements: &[Term]) -> Option<Vec<u8>> {
    let mut bytes = Vec::with_capacity(elements.len());
    for element in elements {
        let value = match element {
            Term::Integer(value) => u64::try_from(value).ok()?,
            _ => return None,
        };
        if value > 255 {
            return None;
        }
        bytes.push(value as u8);
    }
    Some(bytes)
}

fn encode_integer_into(value: &Integer, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    if let Ok(small) = i64::try_from(value) {
        if (0..=255).contains(&small) {
            buf.push(SMALL_INTEGER_EXT);
            buf.push(small as u8);
            return Ok(());
        }
        if small >= i32::MIN as i64 && small <= i32::MAX as i64 {
            buf.push(INTEGER_EXT);
            buf.extend_from_slice(&(small as i32).to_be_bytes());
            return Ok(());
        }
    }
    encode_big_integer(buf, value)?;
    Ok(())
}
