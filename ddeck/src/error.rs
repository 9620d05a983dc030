//! Deck error kinds raised by staging and commit operations.
//!
//! ```rust
//! use ddeck::{DeckError, DeckErrorKind};
//!
//! let error = DeckError::invalid_slide_index(7);
//! assert_eq!(error.kind, DeckErrorKind::InvalidIndex);
//! assert_eq!(error.message, "Invalid slide index: 7");
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckErrorKind {
    NoPresentation,
    InvalidIndex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckError {
    pub kind: DeckErrorKind,
    pub message: String,
}

impl DeckError {
    pub fn new(kind: DeckErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Raised when an edit is staged before any presentation exists.
    pub fn presentation_required() -> Self {
        Self::new(
            DeckErrorKind::NoPresentation,
            "No presentation created. Use create_presentation first.",
        )
    }

    pub fn no_presentation_loaded() -> Self {
        Self::new(DeckErrorKind::NoPresentation, "No presentation loaded")
    }

    pub fn no_presentation_created() -> Self {
        Self::new(DeckErrorKind::NoPresentation, "No presentation created")
    }

    pub fn invalid_slide_index(index: i64) -> Self {
        Self::new(
            DeckErrorKind::InvalidIndex,
            format!("Invalid slide index: {index}"),
        )
    }

    pub fn invalid_field_index(field: &str, index: i64) -> Self {
        Self::new(
            DeckErrorKind::InvalidIndex,
            format!("Invalid {field}: {index}"),
        )
    }
}

impl Display for DeckError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for DeckError {}
