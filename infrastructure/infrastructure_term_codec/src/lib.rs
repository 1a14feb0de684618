//! Infrastructure Layer: Term Codec
//!
//! Implements the external term format: a self-describing binary encoding
//! of atoms, integers of unbounded magnitude, floats, byte strings,
//! proper/improper lists, tuples, and opaque foreign values, exchanged
//! between a host process and an external runtime over a byte stream.
//!
//! ## Overview
//!
//! - [`decoding`]: recursive-descent parser over a borrowed byte buffer.
//!   The top-level entry handles the version marker and the optional
//!   compressed-term envelope; the per-term routine dispatches on a one-byte
//!   tag and threads a cursor through recursive calls. A buffer ending
//!   before a complete term yields [`DecodeError::IncompleteData`], never a
//!   hard parse error, so a streaming caller can buffer more bytes and
//!   retry.
//! - [`encoding`]: dispatches on term variant to produce canonical bytes,
//!   applying the representation-selection rules (compact list-as-string,
//!   integer width selection, compression-or-not). The top-level entry adds
//!   the version marker and the optional compression envelope.
//! - [`compression`]: the zlib layer behind the compressed-term envelope.
//!
//! No component retains state between calls; every operation is a pure
//! transformation over caller-supplied buffers and values.
//!
//! ## See Also
//!
//! - [`entities_terms`]: the term model these routines operate on
//! - [`infrastructure_bignum_encoding`]: the bignum wire codec

pub mod compression;
pub mod decoding;
pub mod encoding;

pub use compression::CompressionOption;
pub use decoding::{decode, decode_term, decode_term_with, decode_with, DecodeError};
pub use encoding::{encode, encode_term, EncodeError};

/// Leading byte of every top-level message
pub const VERSION_MAGIC: u8 = 131;

/// Compressed-term marker ('P'), second byte of a compressed envelope
pub const COMPRESSED_EXT: u8 = 80;

/// New float ('F'): 8 bytes, IEEE-754 double, big-endian
pub const NEW_FLOAT_EXT: u8 = 70;

/// Small integer ('a'): 1 unsigned byte
pub const SMALL_INTEGER_EXT: u8 = 97;

/// Integer ('b'): 4 bytes, signed, big-endian
pub const INTEGER_EXT: u8 = 98;

/// Atom ('d'): 2-byte length, raw text bytes
pub const ATOM_EXT: u8 = 100;

/// Small tuple ('h'): 1-byte arity, then arity terms
pub const SMALL_TUPLE_EXT: u8 = 104;

/// Large tuple ('i'): 4-byte arity, then arity terms
pub const LARGE_TUPLE_EXT: u8 = 105;

/// Nil ('j'): the empty list, no body
pub const NIL_EXT: u8 = 106;

/// String ('k'): compact byte list, 2-byte length, raw bytes
pub const STRING_EXT: u8 = 107;

/// List ('l'): 4-byte length, then length terms, then a nil tag or a tail
pub const LIST_EXT: u8 = 108;

/// Binary ('m'): 4-byte length, raw bytes
pub const BINARY_EXT: u8 = 109;

/// Small bignum ('n'): 1-byte length, sign byte, little-endian magnitude
pub const SMALL_BIG_EXT: u8 = 110;

/// Large bignum ('o'): 4-byte length, sign byte, little-endian magnitude
pub const LARGE_BIG_EXT: u8 = 111;

/// Deepest term nesting the decoder follows before failing
///
/// Kept small enough that the guard trips long before the recursion can
/// exhaust a 2 MiB thread stack.
pub const MAX_DEPTH: usize = 200;
