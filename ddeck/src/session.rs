//! Per-session editing state.

use dcommon::SessionId;
use serde::{Deserialize, Serialize};

use crate::{AppliedEdit, PendingEdit, Presentation};

/// Parsed text of a file supplied as reference material for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextFile {
    pub filename: String,
    pub text: String,
}

impl ContextFile {
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
        }
    }
}

/// A rendered slide of a style template, as base64-encoded JPEG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenshot {
    pub index: usize,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleTemplate {
    pub filename: String,
    pub text: String,
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: SessionId,
    #[serde(default)]
    pub presentation: Option<Presentation>,
    #[serde(default)]
    pub pending_edits: Vec<PendingEdit>,
    #[serde(default)]
    pub applied_edits: Vec<AppliedEdit>,
    #[serde(default)]
    pub context_files: Vec<ContextFile>,
    #[serde(default)]
    pub style_template: Option<StyleTemplate>,
}

impl Session {
    pub fn new(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: session_id.into(),
            presentation: None,
            pending_edits: Vec::new(),
            applied_edits: Vec::new(),
            context_files: Vec::new(),
            style_template: None,
        }
    }

    pub fn with_generated_id() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    /// Replaces the current presentation with an empty one and forgets all
    /// staged and applied edits.
    pub fn create_presentation(&mut self, title: impl Into<String>) -> &Presentation {
        self.pending_edits.clear();
        self.applied_edits.clear();
        self.presentation.insert(Presentation::new(title))
    }

    pub fn slide_count(&self) -> usize {
        self.presentation
            .as_ref()
            .map(Presentation::slide_count)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::{ContextFile, Session};
    use crate::{EditOperation, PendingEdit};

    #[test]
    fn create_presentation_resets_edit_history() {
        let mut session = Session::new("s-1");
        session.create_presentation("First");
        session
            .pending_edits
            .push(PendingEdit::new(0, EditOperation::Delete, "Delete slide 1"));
        session
            .applied_edits
            .push(PendingEdit::new(0, EditOperation::Delete, "Delete slide 1"));

        let deck = session.create_presentation("Second");
        assert_eq!(deck.title, "Second");
        assert!(session.pending_edits.is_empty());
        assert!(session.applied_edits.is_empty());
    }

    #[test]
    fn generated_ids_are_distinct() {
        let first = Session::with_generated_id();
        let second = Session::with_generated_id();
        assert_ne!(first.session_id, second.session_id);
        assert_eq!(first.slide_count(), 0);
    }

    #[test]
    fn session_round_trips_through_json() {
        let mut session = Session::new("s-json");
        session.create_presentation("Deck");
        session.context_files.push(ContextFile::new("notes.md", "# Notes"));

        let encoded = serde_json::to_string(&session).expect("session should serialize");
        let decoded: Session = serde_json::from_str(&encoded).expect("session should deserialize");
        assert_eq!(decoded, session);
    }

    #[test]
    fn legacy_session_without_optional_fields_loads() {
        let decoded: Session = serde_json::from_str(r#"{"session_id":"old"}"#)
            .expect("minimal session should deserialize");
        assert_eq!(decoded.session_id.as_str(), "old");
        assert!(decoded.presentation.is_none());
    }
}
