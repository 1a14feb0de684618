//! Entities Layer: Term Model
//!
//! Provides the universal value model carried by the external term format.
//! Terms are immutable, acyclic value trees created either by a decode call
//! or constructed by the caller before an encode call; they have no identity
//! beyond structural equality and hold no state between codec calls.
//!
//! ## Overview
//!
//! The `entities_terms` crate is the entities layer of the codec. It defines:
//!
//! - **[`Term`](term::Term)**: the closed variant set of values the codec can
//!   carry (integers of unbounded magnitude, floats, atoms, booleans, the
//!   "no value" sentinel, binaries, character lists, proper and improper
//!   lists, tuples, and opaque foreign values).
//!
//! - **[`Atom`](atom::Atom)**: a validated text literal of at most 255 bytes.
//!
//! - **[`ImproperList`](improper_list::ImproperList)**: a validated non-empty
//!   element sequence with a non-list tail.
//!
//! - **[`OpaqueObject`](opaque::OpaqueObject)**: a tunneled foreign value
//!   (raw bytes plus an origin-language atom) together with the pluggable
//!   [`OpaqueCodec`](opaque::OpaqueCodec) seam used to marshal values that
//!   have no native mapping in the peer runtime.
//!
//! ## Architecture
//!
//! This crate has no knowledge of the wire format. Tag dispatch, length
//! prefixes, and the compression envelope live in the infrastructure layer.
//!
//! ## See Also
//!
//! - [`infrastructure_term_codec`](../infrastructure_term_codec/index.html):
//!   the encoder/decoder over this model
//! - [`infrastructure_bignum_encoding`](../infrastructure_bignum_encoding/index.html):
//!   the arbitrary-precision integer wire codec

pub mod atom;
pub mod common;
pub mod improper_list;
pub mod opaque;
pub mod term;

pub use atom::Atom;
pub use common::ConstructionError;
pub use improper_list::ImproperList;
pub use opaque::{
    MarshalError, OpaqueCodec, OpaqueObject, UnresolvedOpaque, ERLANG_LANGUAGE, LOCAL_LANGUAGE,
    OPAQUE_MARKER,
};
pub use term::Term;
