//! Agent-run errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

use dmemory::MemoryError;
use dprovider::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentErrorKind {
    InvalidRequest,
    Provider,
    Store,
    Parse,
    TurnLimit,
}

impl AgentErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Provider => "provider",
            Self::Store => "store",
            Self::Parse => "parse",
            Self::TurnLimit => "turn_limit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentError {
    pub kind: AgentErrorKind,
    pub message: String,
}

impl AgentError {
    pub fn new(kind: AgentErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::InvalidRequest, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::Provider, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::Store, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::Parse, message)
    }

    pub fn turn_limit(max_turns: u32) -> Self {
        Self::new(
            AgentErrorKind::TurnLimit,
            format!("turn limit of {max_turns} reached before the model finished"),
        )
    }

    /// Text carried by the terminal `error` event.
    pub fn event_text(&self) -> String {
        format!("Agent error: {}", self.message)
    }
}

impl Display for AgentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for AgentError {}

impl From<ProviderError> for AgentError {
    fn from(value: ProviderError) -> Self {
        AgentError::provider(value.message)
    }
}

impl From<MemoryError> for AgentError {
    fn from(value: MemoryError) -> Self {
        AgentError::store(value.message)
    }
}
