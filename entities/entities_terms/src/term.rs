//! Term Module
//!
//! Provides the universal value type of the external term format: a closed
//! variant set over which the encoder and decoder dispatch. Composite
//! variants own their children; a term is always a fresh, acyclic tree.

use malachite::Integer;

use crate::atom::Atom;
use crate::improper_list::ImproperList;
use crate::opaque::OpaqueObject;

/// A value representable in the external term format
///
/// Booleans and the "no value" sentinel are distinct variants even though
/// they travel as the reserved atoms `true`, `false` and `undefined`; the
/// encoder maps them ahead of general atom and integer handling and the
/// decoder folds those atom texts back into these variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// Arbitrary-precision signed integer
    Integer(Integer),
    /// IEEE-754 double
    Float(f64),
    /// Text literal of at most 255 bytes
    Atom(Atom),
    /// Boolean, carried on the wire as the atoms `true` / `false`
    Boolean(bool),
    /// The "no value" sentinel, carried on the wire as the atom `undefined`
    Undefined,
    /// Raw byte sequence (a binary blob)
    Binary(Vec<u8>),
    /// Text as a sequence of code points; shares wire forms with lists
    CharList(String),
    /// Proper list; the empty list is the canonical nil
    List(Vec<Term>),
    /// Non-empty element sequence with a non-list tail
    ImproperList(ImproperList),
    /// Fixed-arity ordered sequence
    Tuple(Vec<Term>),
    /// Foreign value tunneled as raw bytes plus an origin-language atom
    Opaque(OpaqueObject),
}

impl Term {
    /// Shorthand for a machine-sized integer term
    pub fn int(value: i64) -> Self {
        Term::Integer(Integer::from(value))
    }

    /// The empty list
    pub fn nil() -> Self {
        Term::List(Vec::new())
    }

    /// Name of the variant, used in diagnostics
    pub fn variant_name(&self) -> &'static str {
        match self {
            Term::Integer(_) => "integer",
            Term::Float(_) => "float",
            Term::Atom(_) => "atom",
            Term::Boolean(_) => "boolean",
            Term::Undefined => "undefined",
            Term::Binary(_) => "binary",
            Term::CharList(_) => "char list",
            Term::List(_) => "list",
            Term::ImproperList(_) => "improper list",
            Term::Tuple(_) => "tuple",
            Term::Opaque(_) => "opaque object",
        }
    }
}

impl From<Integer> for Term {
    fn from(value: Integer) -> Self {
        Term::Integer(value)
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Term::int(value)
    }
}

impl From<bool> for Term {
    fn from(value: bool) -> Self {
        Term::Boolean(value)
    }
}

impl From<f64> for Term {
    fn from(value: f64) -> Self {
        Term::Float(value)
    }
}

impl From<Atom> for Term {
    fn from(atom: Atom) -> Self {
        Term::Atom(atom)
    }
}

impl From<Vec<u8>> for Term {
    fn from(data: Vec<u8>) -> Self {
        Term::Binary(data)
    }
}
