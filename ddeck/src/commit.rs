//! Commit engine: applies every staged edit in order.
//!
//! An edit whose target no longer exists is skipped and logged; it never
//! stops later edits from applying. The pending list is always emptied.
//!
//! ```rust
//! use ddeck::{Session, SlideLayout};
//!
//! let mut session = Session::new("demo");
//! session.create_presentation("Demo");
//! session.stage_add("<h1>A</h1>", SlideLayout::Title, None).expect("add should stage");
//! session.stage_add("<h1>B</h1>", SlideLayout::Blank, None).expect("add should stage");
//!
//! let summary = session.commit().expect("commit should run");
//! assert_eq!(summary.applied_count, 2);
//! assert_eq!(summary.total_slides, 2);
//! assert!(session.pending_edits.is_empty());
//! ```

use serde::Serialize;
use tracing::{info, warn};

use crate::{DeckError, EditOperation, PendingEdit, Presentation, Session, Slide};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub applied_count: usize,
    pub skipped_count: usize,
    pub total_slides: usize,
}

impl Session {
    pub fn commit(&mut self) -> Result<CommitSummary, DeckError> {
        let deck = self
            .presentation
            .as_mut()
            .ok_or_else(DeckError::no_presentation_created)?;

        let pending = std::mem::take(&mut self.pending_edits);
        let mut applied_count = 0;
        let mut skipped_count = 0;

        for edit in pending {
            match apply_edit(deck, &edit) {
                Ok(()) => {
                    applied_count += 1;
                    self.applied_edits.push(edit);
                }
                Err(reason) => {
                    skipped_count += 1;
                    warn!(
                        session_id = %self.session_id,
                        edit_id = %edit.edit_id,
                        operation = edit.operation.name(),
                        slide_index = edit.slide_index,
                        reason,
                        "skipped stale edit during commit"
                    );
                }
            }
        }

        let summary = CommitSummary {
            applied_count,
            skipped_count,
            total_slides: deck.slide_count(),
        };
        info!(
            session_id = %self.session_id,
            applied_count,
            skipped_count,
            total_slides = summary.total_slides,
            "committed pending edits"
        );

        Ok(summary)
    }
}

fn apply_edit(deck: &mut Presentation, edit: &PendingEdit) -> Result<(), &'static str> {
    let len = deck.slides.len();
    match &edit.operation {
        EditOperation::Add { html, layout } => {
            let slide = Slide::new(edit.slide_index, html.clone(), *layout);
            if edit.slide_index >= len {
                deck.slides.push(slide);
            } else {
                deck.slides.insert(edit.slide_index, slide);
            }
        }
        EditOperation::Update { html } => {
            let slide = deck
                .slides
                .get_mut(edit.slide_index)
                .ok_or("slide index out of bounds")?;
            slide.html.clone_from(html);
            return Ok(());
        }
        EditOperation::Delete => {
            if edit.slide_index >= len {
                return Err("slide index out of bounds");
            }
            deck.slides.remove(edit.slide_index);
        }
        EditOperation::Reorder { to_index } => {
            if edit.slide_index >= len {
                return Err("source index out of bounds");
            }
            let slide = deck.slides.remove(edit.slide_index);
            let destination = (*to_index).min(deck.slides.len());
            deck.slides.insert(destination, slide);
        }
    }

    deck.reindex();
    Ok(())
}
