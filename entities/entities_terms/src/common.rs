//! Common Construction Errors
//!
//! Provides the shared error type raised by the validated wrapper types in
//! this crate. Construction errors surface before any encode or decode
//! attempt; a value that constructs successfully always has a wire form.

use std::fmt;

/// Errors raised when a validated wrapper is misused at construction time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// Atom text longer than 255 bytes (carries the offending length)
    AtomTooLong(usize),
    /// Improper list with no leading elements
    EmptyImproperList,
    /// Improper list tail is itself a list
    ListTail,
}

impl fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructionError::AtomTooLong(length) => {
                write!(f, "atom length {} exceeds the 255 byte limit", length)
            }
            ConstructionError::EmptyImproperList => {
                write!(f, "improper list requires at least one element")
            }
            ConstructionError::ListTail => {
                write!(f, "improper list tail must not be a list")
            }
        }
    }
}

impl std::error::Error for ConstructionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_error_display() {
        let error = ConstructionError::AtomTooLong(300);
        assert!(error.to_string().contains("300"));
        assert!(ConstructionError::EmptyImproperList
            .to_string()
            .contains("at least one element"));
        assert!(ConstructionError::ListTail.to_string().contains("tail"));
    }

    #[test]
    fn test_construction_error_clone_eq() {
        let error1 = ConstructionError::AtomTooLong(256);
        let error2 = error1.clone();
        assert_eq!(error1, error2);
        assert_ne!(error1, ConstructionError::EmptyImproperList);
        assert_ne!(
            ConstructionError::EmptyImproperList,
            ConstructionError::ListTail
        );
    }
}
