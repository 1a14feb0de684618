//! Improper List Module
//!
//! Provides the validated improper-list wrapper: an element sequence whose
//! final tail is not itself a list (as opposed to a proper list terminated
//! by the empty list). Both invariants are checked once at construction:
//! the sequence is never empty and the tail is never a list.

use crate::common::ConstructionError;
use crate::term::Term;

/// A non-empty element sequence with a non-list tail
#[derive(Debug, Clone, PartialEq)]
pub struct ImproperList {
    elements: Vec<Term>,
    tail: Box<Term>,
}

impl ImproperList {
    /// Create an improper list, validating both invariants
    ///
    /// # Arguments
    /// * `elements` - The leading elements; must be non-empty
    /// * `tail` - The trailing term; must not be a list
    ///
    /// # Returns
    /// * `Ok(ImproperList)` - Validated improper list
    /// * `Err(ConstructionError)` - Empty sequence or list-typed tail
    pub fn new(elements: Vec<Term>, tail: Term) -> Result<Self, ConstructionError> {
        if elements.is_empty() {
            return Err(ConstructionError::EmptyImproperList);
        }
        if matches!(tail, Term::List(_) | Term::ImproperList(_)) {
            return Err(ConstructionError::ListTail);
        }
        Ok(Self {
            elements,
            tail: Box::new(tail),
        })
    }

    /// The leading elements (never empty)
    pub fn elements(&self) -> &[Term] {
        &self.elements
    }

    /// The trailing term (never a list)
    pub fn tail(&self) -> &Term {
        &self.tail
    }

    /// Consume the list, returning elements and tail
    pub fn into_parts(self) -> (Vec<Term>, Term) {
        (self.elements, *self.tail)
    }
}
