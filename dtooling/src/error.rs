//! Tool execution errors and classifications.

use std::error::Error;
use std::fmt::{Display, Formatter};

use ddeck::DeckError;
use dmemory::MemoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    NotFound,
    InvalidArguments,
    Execution,
    Storage,
    Panicked,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
    pub tool_name: Option<String>,
    pub tool_call_id: Option<String>,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            tool_name: None,
            tool_call_id: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, message)
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArguments, message)
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Execution, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Storage, message)
    }

    pub fn panicked(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Panicked, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Other, message)
    }

    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    pub fn with_tool_call_id(mut self, tool_call_id: impl Into<String>) -> Self {
        self.tool_call_id = Some(tool_call_id.into());
        self
    }

    /// Errors caused by what the model asked for rather than by the runtime.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind,
            ToolErrorKind::InvalidArguments | ToolErrorKind::NotFound | ToolErrorKind::Execution
        )
    }
}

impl Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.tool_name, &self.tool_call_id) {
            (Some(tool_name), Some(tool_call_id)) => write!(
                f,
                "{:?} [tool={}, call_id={}]: {}",
                self.kind, tool_name, tool_call_id, self.message
            ),
            (Some(tool_name), None) => {
                write!(f, "{:?} [tool={}]: {}", self.kind, tool_name, self.message)
            }
            _ => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ToolError {}

impl From<DeckError> for ToolError {
    fn from(value: DeckError) -> Self {
        Self::execution(value.message)
    }
}

impl From<MemoryError> for ToolError {
    fn from(value: MemoryError) -> Self {
        Self::storage(format!("failed to save session: {}", value.message))
    }
}

#[cfg(test)]
mod tests {
    use ddeck::DeckError;
    use dmemory::MemoryError;

    use super::*;

    #[test]
    fn deck_errors_keep_their_user_facing_message() {
        let error = ToolError::from(DeckError::invalid_field_index("to_index", 9));
        assert_eq!(error.kind, ToolErrorKind::Execution);
        assert_eq!(error.message, "Invalid to_index: 9");
        assert!(error.is_user_error());
    }

    #[test]
    fn storage_errors_are_not_user_errors() {
        let error = ToolError::from(MemoryError::storage("disk full"));
        assert_eq!(error.kind, ToolErrorKind::Storage);
        assert!(error.message.contains("disk full"));
        assert!(!error.is_user_error());
    }

    #[test]
    fn context_fields_are_included_in_display() {
        let error = ToolError::not_found("missing")
            .with_tool_name("lookup")
            .with_tool_call_id("call_1");

        let rendered = error.to_string();
        assert!(rendered.contains("lookup"));
        assert!(rendered.contains("call_1"));
    }
}
