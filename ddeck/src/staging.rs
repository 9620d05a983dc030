//! Edit staging: turns requested changes into [`PendingEdit`]s with resolved
//! positions, without touching the slides.
//!
//! Positions of unpositioned adds account for adds that are still pending, so
//! several adds staged back to back append in call order.
//!
//! ```rust
//! use ddeck::{Session, SlideLayout};
//!
//! let mut session = Session::new("demo");
//! session.create_presentation("Demo");
//!
//! let first = session.stage_add("<h1>A</h1>", SlideLayout::Title, None).expect("add should stage").clone();
//! let second = session.stage_add("<h1>B</h1>", SlideLayout::Blank, None).expect("add should stage").clone();
//! assert_eq!((first.slide_index, second.slide_index), (0, 1));
//!
//! // Nothing is committed yet, so slide 0 cannot be updated.
//! assert!(session.stage_update(0, "<h1>A2</h1>").is_err());
//! ```

use serde::Serialize;
use tracing::debug;

use crate::{DeckError, EditOperation, PendingEdit, Presentation, Session, SlideLayout};

/// Position sentinel meaning "append after everything already staged".
pub const APPEND_POSITION: i64 = -1;

/// Read-only view of a staged edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingEditSummary {
    pub edit_id: String,
    pub slide_index: usize,
    pub operation: &'static str,
    pub preview: String,
}

impl Session {
    /// Stages a new slide.
    ///
    /// `requested_position` of `None` or [`APPEND_POSITION`], or any position
    /// at or past the end of committed plus pending slides, appends. Other
    /// negative positions clamp to the front.
    pub fn stage_add(
        &mut self,
        html: impl Into<String>,
        layout: SlideLayout,
        requested_position: Option<i64>,
    ) -> Result<&PendingEdit, DeckError> {
        let current = self
            .presentation
            .as_ref()
            .ok_or_else(DeckError::presentation_required)?
            .slide_count();
        let pending_adds = self
            .pending_edits
            .iter()
            .filter(|edit| edit.operation.is_add())
            .count();
        let append_index = current + pending_adds;

        let index = match requested_position {
            None | Some(APPEND_POSITION) => append_index,
            Some(position) if position >= 0 && position as usize >= append_index => append_index,
            Some(position) => position.max(0) as usize,
        };

        let edit = PendingEdit::new(
            index,
            EditOperation::Add {
                html: html.into(),
                layout,
            },
            format!("Add slide at position {}", index + 1),
        );
        Ok(self.push_edit(edit))
    }

    pub fn stage_update(
        &mut self,
        slide_index: i64,
        html: impl Into<String>,
    ) -> Result<&PendingEdit, DeckError> {
        let deck = self.loaded_presentation()?;
        let index = committed_index(deck, slide_index)
            .ok_or_else(|| DeckError::invalid_slide_index(slide_index))?;

        let edit = PendingEdit::new(
            index,
            EditOperation::Update { html: html.into() },
            format!("Update slide {}", index + 1),
        );
        Ok(self.push_edit(edit))
    }

    pub fn stage_delete(&mut self, slide_index: i64) -> Result<&PendingEdit, DeckError> {
        let deck = self.loaded_presentation()?;
        let index = committed_index(deck, slide_index)
            .ok_or_else(|| DeckError::invalid_slide_index(slide_index))?;

        let edit = PendingEdit::new(
            index,
            EditOperation::Delete,
            format!("Delete slide {}", index + 1),
        );
        Ok(self.push_edit(edit))
    }

    /// Stages a move. Both indices are checked against committed slides only;
    /// interactions between several pending moves resolve by commit order.
    pub fn stage_reorder(
        &mut self,
        from_index: i64,
        to_index: i64,
    ) -> Result<&PendingEdit, DeckError> {
        let deck = self.loaded_presentation()?;
        let from = committed_index(deck, from_index)
            .ok_or_else(|| DeckError::invalid_field_index("from_index", from_index))?;
        let to = committed_index(deck, to_index)
            .ok_or_else(|| DeckError::invalid_field_index("to_index", to_index))?;

        let edit = PendingEdit::new(
            from,
            EditOperation::Reorder { to_index: to },
            format!("Move slide {} to position {}", from + 1, to + 1),
        );
        Ok(self.push_edit(edit))
    }

    pub fn pending_summary(&self) -> Vec<PendingEditSummary> {
        self.pending_edits
            .iter()
            .map(|edit| PendingEditSummary {
                edit_id: edit.edit_id.clone(),
                slide_index: edit.slide_index,
                operation: edit.operation.name(),
                preview: edit.preview.clone(),
            })
            .collect()
    }

    fn loaded_presentation(&self) -> Result<&Presentation, DeckError> {
        self.presentation
            .as_ref()
            .ok_or_else(DeckError::no_presentation_loaded)
    }

    fn push_edit(&mut self, edit: PendingEdit) -> &PendingEdit {
        debug!(
            session_id = %self.session_id,
            edit_id = %edit.edit_id,
            operation = edit.operation.name(),
            slide_index = edit.slide_index,
            "staged edit"
        );
        self.pending_edits.push(edit);
        &self.pending_edits[self.pending_edits.len() - 1]
    }
}

fn committed_index(deck: &Presentation, index: i64) -> Option<usize> {
    usize::try_from(index)
        .ok()
        .filter(|index| *index < deck.slide_count())
}

#[cfg(test)]
mod tests {
    use crate::{DeckErrorKind, EditOperation, Session, Slide, SlideLayout};

    fn session_with_slides(count: usize) -> Session {
        let mut session = Session::new("staging");
        session.create_presentation("Deck");
        let deck = session.presentation.as_mut().expect("deck should exist");
        for index in 0..count {
            deck.slides
                .push(Slide::new(index, format!("<h1>{index}</h1>"), SlideLayout::Blank));
        }
        session
    }

    #[test]
    fn unpositioned_adds_append_after_pending_adds() {
        let mut session = session_with_slides(2);

        let indices = (0..3)
            .map(|_| {
                session
                    .stage_add("<p>x</p>", SlideLayout::Blank, None)
                    .expect("add should stage")
                    .slide_index
            })
            .collect::<Vec<_>>();

        assert_eq!(indices, vec![2, 3, 4]);
        assert_eq!(session.pending_edits[0].preview, "Add slide at position 3");
    }

    #[test]
    fn add_position_resolution_follows_sentinel_and_clamps() {
        let mut session = session_with_slides(3);

        let append = session
            .stage_add("a", SlideLayout::Blank, Some(-1))
            .expect("add should stage")
            .slide_index;
        assert_eq!(append, 3);

        let past_end = session
            .stage_add("b", SlideLayout::Blank, Some(99))
            .expect("add should stage")
            .slide_index;
        assert_eq!(past_end, 4);

        let inside = session
            .stage_add("c", SlideLayout::Blank, Some(1))
            .expect("add should stage")
            .slide_index;
        assert_eq!(inside, 1);

        let negative = session
            .stage_add("d", SlideLayout::Blank, Some(-7))
            .expect("add should stage")
            .slide_index;
        assert_eq!(negative, 0);
    }

    #[test]
    fn add_without_presentation_asks_for_create_presentation() {
        let mut session = Session::new("empty");
        let error = session
            .stage_add("x", SlideLayout::Blank, None)
            .expect_err("add without deck should fail");

        assert_eq!(error.kind, DeckErrorKind::NoPresentation);
        assert_eq!(
            error.message,
            "No presentation created. Use create_presentation first."
        );
    }

    #[test]
    fn out_of_range_targets_are_rejected_without_staging() {
        let mut session = session_with_slides(2);

        let update = session
            .stage_update(2, "x")
            .expect_err("update past end should fail");
        assert_eq!(update.message, "Invalid slide index: 2");

        let delete = session
            .stage_delete(-1)
            .expect_err("negative delete should fail");
        assert_eq!(delete.message, "Invalid slide index: -1");

        let from = session
            .stage_reorder(5, 0)
            .expect_err("bad source should fail");
        assert_eq!(from.message, "Invalid from_index: 5");

        let to = session
            .stage_reorder(0, 2)
            .expect_err("bad destination should fail");
        assert_eq!(to.message, "Invalid to_index: 2");

        assert!(session.pending_edits.is_empty());
    }

    #[test]
    fn pending_adds_are_not_valid_update_targets() {
        let mut session = session_with_slides(1);
        session
            .stage_add("new", SlideLayout::Blank, None)
            .expect("add should stage");

        assert!(session.stage_update(1, "changed").is_err());
        assert!(session.stage_update(0, "changed").is_ok());
    }

    #[test]
    fn reorder_records_source_and_destination() {
        let mut session = session_with_slides(3);
        let edit = session.stage_reorder(0, 2).expect("reorder should stage");

        assert_eq!(edit.slide_index, 0);
        assert_eq!(edit.operation, EditOperation::Reorder { to_index: 2 });
        assert_eq!(edit.preview, "Move slide 1 to position 3");
    }

    #[test]
    fn pending_summary_lists_edits_in_staging_order() {
        let mut session = session_with_slides(1);
        session.stage_delete(0).expect("delete should stage");
        session
            .stage_add("x", SlideLayout::Blank, None)
            .expect("add should stage");

        let summary = session.pending_summary();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].operation, "DELETE");
        assert_eq!(summary[1].operation, "ADD");
        assert_eq!(summary[1].slide_index, 1);
    }
}
