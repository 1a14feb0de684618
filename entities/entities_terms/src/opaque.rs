//! Opaque Object Module
//!
//! Provides the marshaling convention for values that have no native
//! representation in the peer runtime. Such values travel as a reserved
//! 3-tuple `{marker-atom, language-atom, data-binary}`; the marker atom is
//! recognized by position and value only.
//!
//! ## Overview
//!
//! - An opaque object tagged with this runtime's own language identifier is
//!   a value this runtime serialized earlier; decoding hands the payload to
//!   a caller-supplied [`OpaqueCodec`] so the original value can be
//!   reconstructed.
//! - An opaque object tagged with any other language stays unresolved: the
//!   raw payload and language tag round-trip untouched.
//! - An opaque object tagged with the designated peer runtime (`erlang`)
//!   carries a complete term encoding produced by that peer; the encoder
//!   splices it verbatim instead of re-wrapping it.
//!
//! The serializer itself is an application seam, not a codec feature: no
//! universal object-serialization scheme is assumed.

use std::fmt;

use crate::atom::Atom;
use crate::term::Term;

/// Reserved marker atom opening the opaque 3-tuple
pub const OPAQUE_MARKER: &str = "$erlport.opaque";

/// Language identifier of this runtime
pub const LOCAL_LANGUAGE: &str = "rust";

/// Language identifier of the designated peer runtime
pub const ERLANG_LANGUAGE: &str = "erlang";

/// Errors raised by a pluggable opaque codec
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarshalError {
    /// The serializer has no representation for the value (carries its type)
    UnsupportedType(String),
    /// The payload could not be reconstructed
    InvalidPayload(String),
}

impl fmt::Display for MarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarshalError::UnsupportedType(kind) => {
                write!(f, "unsupported data type: {}", kind)
            }
            MarshalError::InvalidPayload(message) => {
                write!(f, "invalid opaque payload: {}", message)
            }
        }
    }
}

impl std::error::Error for MarshalError {}

/// Pluggable serializer for values tunneled through opaque objects
///
/// The embedding application supplies the scheme; the codec only routes
/// payloads tagged with [`LOCAL_LANGUAGE`] through it.
pub trait OpaqueCodec {
    /// Serialize a value that has no wire mapping of its own
    fn serialize(&self, term: &Term) -> Result<Vec<u8>, MarshalError>;

    /// Reconstruct a value this runtime serialized earlier
    fn deserialize(&self, data: &[u8]) -> Result<Term, MarshalError>;
}

/// Default codec: keeps locally tagged payloads as raw opaque objects
///
/// Used when no application codec is supplied. `serialize` always fails,
/// since no serialization scheme exists to invent bytes with.
pub struct UnresolvedOpaque;

impl OpaqueCodec for UnresolvedOpaque {
    fn serialize(&self, term: &Term) -> Result<Vec<u8>, MarshalError> {
        Err(MarshalError::UnsupportedType(
            term.variant_name().to_string(),
        ))
    }

    fn deserialize(&self, data: &[u8]) -> Result<Term, MarshalError> {
        Ok(Term::Opaque(OpaqueObject::new(
            data.to_vec(),
            Atom::literal(LOCAL_LANGUAGE),
        )))
    }
}

/// A tunneled foreign value: raw payload bytes plus an origin-language atom
///
/// Two opaque objects are equal iff both the language tag and the payload
/// bytes match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpaqueObject {
    data: Vec<u8>,
    language: Atom,
}

impl OpaqueObject {
    /// Create an opaque object from payload bytes and an origin language
    pub fn new(data: Vec<u8>, language: Atom) -> Self {
        Self { data, language }
    }

    /// The raw payload bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The origin-language atom
    pub fn language(&self) -> &Atom {
        &self.language
    }

    /// Consume the object, returning payload and language
    pub fn into_parts(self) -> (Vec<u8>, Atom) {
        (self.data, self.language)
    }

    /// Resolve a decoded opaque payload
    ///
    /// A payload tagged with this runtime's own identifier is handed to the
    /// supplied codec and the reconstructed value returned directly; any
    /// other language stays an unresolved [`Term::Opaque`] for the caller
    /// to interpret.
    pub fn decode(
        data: Vec<u8>,
        language: Atom,
        codec: &dyn OpaqueCodec,
    ) -> Result<Term, MarshalError> {
        if language.as_str() == LOCAL_LANGUAGE {
            return codec.deserialize(&data);
        }
        Ok(Term::Opaque(Self::new(data, language)))
    }

    /// Wrap a value through the application's serializer, tagged as local
    ///
    /// # Returns
    /// * `Ok(OpaqueObject)` - Payload produced by the codec
    /// * `Err(MarshalError::UnsupportedType)` - The codec rejected the value
    pub fn from_term(term: &Term, codec: &dyn OpaqueCodec) -> Result<Self, MarshalError> {
        let data = codec.serialize(term)?;
        Ok(Self::new(data, Atom::literal(LOCAL_LANGUAGE)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_equality() {
        let java = Atom::new("java").unwrap();
        let a = OpaqueObject::new(vec![1, 2, 3], java.clone());
        let b = OpaqueObject::new(vec![1, 2, 3], java.clone());
        assert_eq!(a, b);
    }

    #[test]
    fn test_opaque_inequality_on_data() {
        let java = Atom::new("java").unwrap();
        let a = OpaqueObject::new(vec![1, 2, 3], java.clone());
        let b = OpaqueObject::new(vec![1, 2], java);
        assert_ne!(a, b);
    }

    #[test]
    fn test_opaque_inequality_on_language() {
        let a = OpaqueObject::new(vec![1], Atom::new("java").unwrap());
        let b = OpaqueObject::new(vec![1], Atom::new("ruby").unwrap());
        assert_ne!(a, b);
    }

    #[test]
    fn test_decode_foreign_language_stays_unresolved() {
        let ruby = Atom::new("ruby").unwrap();
        let term = OpaqueObject::decode(vec![9, 9], ruby.clone(), &UnresolvedOpaque).unwrap();
        assert_eq!(
            term,
            Term::Opaque(OpaqueObject::new(vec![9, 9], ruby))
        );
    }

    #[test]
    fn test_decode_local_language_uses_codec() {
        struct BinaryCodec;
        impl OpaqueCodec for BinaryCodec {
            fn serialize(&self, term: &Term) -> Result<Vec<u8>, MarshalError> {
                match term {
                    Term::Binary(data) => Ok(data.clone()),
                    other => Err(MarshalError::UnsupportedType(
                        other.variant_name().to_string(),
                    )),
                }
            }
            fn deserialize(&self, data: &[u8]) -> Result<Term, MarshalError> {
                Ok(Term::Binary(data.to_vec()))
            }
        }

        let local = Atom::new(LOCAL_LANGUAGE).unwrap();
        let term = OpaqueObject::decode(vec![5, 6], local, &BinaryCodec).unwrap();
        assert_eq!(term, Term::Binary(vec![5, 6]));

        let wrapped = OpaqueObject::from_term(&Term::Binary(vec![7]), &BinaryCodec).unwrap();
        assert_eq!(wrapped.data(), &[7]);
        assert_eq!(wrapped.language().as_str(), LOCAL_LANGUAGE);

        let rejected = OpaqueObject::from_term(&Term::int(1), &BinaryCodec);
        assert_eq!(
            rejected,
            Err(MarshalError::UnsupportedType(String::from("integer")))
        );
    }

    #[test]
    fn test_unresolved_codec_keeps_payload_raw() {
        let local = Atom::new(LOCAL_LANGUAGE).unwrap();
        let term = OpaqueObject::decode(vec![1, 2], local.clone(), &UnresolvedOpaque).unwrap();
        assert_eq!(term, Term::Opaque(OpaqueObject::new(vec![1, 2], local)));
    }

    #[test]
    fn test_unresolved_codec_rejects_serialization() {
        let result = UnresolvedOpaque.serialize(&Term::Float(1.0));
        assert_eq!(
            result,
            Err(MarshalError::UnsupportedType(String::from("float")))
        );
    }

    #[test]
    fn test_into_parts() {
        let object = OpaqueObject::new(vec![8], Atom::new("java").unwrap());
        let (data, language) = object.into_parts();
        assert_eq!(data, vec![8]);
        assert_eq!(language.as_str(), "java");
    }

    #[test]
    fn test_marshal_error_display() {
        assert!(MarshalError::UnsupportedType(String::from("float"))
            .to_string()
            .contains("float"));
        assert!(MarshalError::InvalidPayload(String::from("bad header"))
            .to_string()
            .contains("bad header"));
    }
}
