//! Atom Module
//!
//! Provides the validated atom wrapper. Atoms are immutable text literals
//! with an encoded length of at most 255 bytes, distinct from ordinary text
//! and byte strings. The bound is enforced once at construction so the
//! encoder never has to re-check it.

use std::fmt;

use crate::common::ConstructionError;

/// An atom: immutable text, at most 255 bytes
///
/// The wrapper stores the text as UTF-8; the length bound applies to the
/// encoded byte length, not the character count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(String);

impl Atom {
    /// Maximum encoded length of an atom in bytes
    pub const MAX_LENGTH: usize = 255;

    /// Create an atom, validating the length bound
    ///
    /// # Arguments
    /// * `name` - The atom text
    ///
    /// # Returns
    /// * `Ok(Atom)` - Validated atom
    /// * `Err(ConstructionError::AtomTooLong)` - Text longer than 255 bytes
    pub fn new(name: impl Into<String>) -> Result<Self, ConstructionError> {
        let name = name.into();
        if name.len() > Self::MAX_LENGTH {
            return Err(ConstructionError::AtomTooLong(name.len()));
        }
        Ok(Self(name))
    }

    /// Construct an atom from a literal known to satisfy the length bound
    pub(crate) fn literal(name: &str) -> Self {
        Self(name.to_string())
    }

    /// The atom text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the atom, returning its text
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Atom {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Atom {
    type Error = ConstructionError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl TryFrom<String> for Atom {
    type Error = ConstructionError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom_new() {
        let atom = Atom::new("ok").unwrap();
        assert_eq!(atom.as_str(), "ok");
        assert_eq!(atom.to_string(), "ok");
    }

    #[test]
    fn test_atom_empty() {
        let atom = Atom::new("").unwrap();
        assert_eq!(atom.as_str(), "");
    }

    #[test]
    fn test_atom_max_length() {
        let name = "a".repeat(255);
        let atom = Atom::new(name.clone()).unwrap();
        assert_eq!(atom.as_str(), name);
    }

    #[test]
    fn test_atom_too_long() {
        let name = "a".repeat(256);
        let result = Atom::new(name);
        assert_eq!(result, Err(ConstructionError::AtomTooLong(256)));
    }

    #[test]
    fn test_atom_length_is_byte_length() {
        // 128 two-byte characters exceed the 255 byte bound
        let name = "\u{00e9}".repeat(128);
        assert_eq!(name.len(), 256);
        let result = Atom::new(name);
        assert_eq!(result, Err(ConstructionError::AtomTooLong(256)));
    }

    #[test]
    fn test_atom_try_from() {
        let atom = Atom::try_from("error").unwrap();
        assert_eq!(atom.as_ref(), "error");
        let atom = Atom::try_from(String::from("badarg")).unwrap();
        assert_eq!(atom.as_str(), "badarg");
        assert!(Atom::try_from("x".repeat(300)).is_err());
    }

    #[test]
    fn test_atom_equality_and_ordering() {
        let a = Atom::new("alpha").unwrap();
        let b = Atom::new("beta").unwrap();
        assert_ne!(a, b);
        assert!(a < b);
        assert_eq!(a, Atom::new("alpha").unwrap());
    }

    #[test]
    fn test_atom_into_string() {
        let atom = Atom::new("undefined").unwrap();
        assert_eq!(atom.into_string(), "undefined");
    }
}
