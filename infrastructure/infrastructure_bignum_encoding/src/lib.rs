//! Infrastructure Layer: Bignum Encoding
//!
//! Provides the arbitrary-precision integer wire codec for the external
//! term format. Integers of unbounded magnitude travel as a length field,
//! a sign byte (0 positive, 1 negative), and a little-endian magnitude
//! byte sequence.
//!
//! ## Encoding Format
//!
//! - **SMALL_BIG_EXT** (tag 110): 1 byte tag + 1 byte length + 1 byte sign
//!   + n magnitude bytes (little-endian)
//! - **LARGE_BIG_EXT** (tag 111): 1 byte tag + 4 bytes length (big-endian)
//!   + 1 byte sign + n magnitude bytes (little-endian)
//!
//! ## Architecture
//!
//! The codec works on `malachite::Integer` values. Magnitude bytes are
//! extracted by repeated division by 256 and reconstructed by
//! multiply-accumulate, matching the wire form exactly; zero has an empty
//! magnitude (the term encoder never routes zero here, it fits the
//! small-integer form).
//!
//! ## See Also
//!
//! - [`infrastructure_term_codec`](../infrastructure_term_codec/index.html):
//!   dispatches bignum tags to this crate

pub mod bignum_codec;

pub use bignum_codec::{
    bytes_to_integer, decode_big_integer, encode_big_integer, integer_to_bytes, DecodeError,
    EncodeError,
};
