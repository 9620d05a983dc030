//! Presentation, slide and edit data structures.
//!
//! ```rust
//! use ddeck::{Presentation, Slide, SlideLayout};
//!
//! let mut deck = Presentation::new("Quarterly review");
//! deck.slides.push(Slide::new(5, "<h1>Intro</h1>", SlideLayout::Title));
//! deck.slides.push(Slide::new(9, "<h1>Numbers</h1>", SlideLayout::Blank));
//! deck.reindex();
//!
//! assert_eq!(deck.slides[0].index, 0);
//! assert_eq!(deck.slides[1].index, 1);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    pub title: String,
    #[serde(default)]
    pub theme: Map<String, Value>,
    #[serde(default)]
    pub slides: Vec<Slide>,
}

impl Presentation {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            theme: Map::new(),
            slides: Vec::new(),
        }
    }

    /// Assigns every slide its current position.
    ///
    /// `Slide::index` is only authoritative right after this runs.
    pub fn reindex(&mut self) {
        for (position, slide) in self.slides.iter_mut().enumerate() {
            slide.index = position;
        }
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub index: usize,
    pub html: String,
    #[serde(default)]
    pub layout: SlideLayout,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Slide {
    pub fn new(index: usize, html: impl Into<String>, layout: SlideLayout) -> Self {
        Self {
            index,
            html: html.into(),
            layout,
            notes: None,
        }
    }

    pub fn has_notes(&self) -> bool {
        self.notes.as_deref().is_some_and(|notes| !notes.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideLayout {
    #[default]
    Blank,
    Title,
    TitleContent,
    TwoColumn,
    SectionHeader,
    ImageFocus,
}

impl SlideLayout {
    pub const ALL: [SlideLayout; 6] = [
        Self::Blank,
        Self::Title,
        Self::TitleContent,
        Self::TwoColumn,
        Self::SectionHeader,
        Self::ImageFocus,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::Title => "title",
            Self::TitleContent => "title_content",
            Self::TwoColumn => "two_column",
            Self::SectionHeader => "section_header",
            Self::ImageFocus => "image_focus",
        }
    }

    /// Parses a layout name coming from a tool call. Unknown names map to
    /// [`SlideLayout::Blank`].
    pub fn parse_lenient(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|layout| layout.as_str() == normalized)
            .unwrap_or_default()
    }
}

/// Operation-specific payload of a staged edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "UPPERCASE")]
pub enum EditOperation {
    Add { html: String, layout: SlideLayout },
    Update { html: String },
    Delete,
    Reorder { to_index: usize },
}

impl EditOperation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "ADD",
            Self::Update { .. } => "UPDATE",
            Self::Delete => "DELETE",
            Self::Reorder { .. } => "REORDER",
        }
    }

    pub fn is_add(&self) -> bool {
        matches!(self, Self::Add { .. })
    }
}

/// An edit recorded against a session but not yet applied.
///
/// For `Reorder`, `slide_index` is the source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingEdit {
    pub edit_id: String,
    pub slide_index: usize,
    #[serde(flatten)]
    pub operation: EditOperation,
    pub preview: String,
}

impl PendingEdit {
    pub fn new(slide_index: usize, operation: EditOperation, preview: impl Into<String>) -> Self {
        Self {
            edit_id: uuid::Uuid::new_v4().to_string(),
            slide_index,
            operation,
            preview: preview.into(),
        }
    }
}

/// Immutable record of an edit the commit engine applied.
pub type AppliedEdit = PendingEdit;
