//! Slide deck document model with staged editing.
//!
//! Edits are recorded against a [`Session`] as [`PendingEdit`]s and only touch
//! the [`Presentation`] when [`Session::commit`] runs.
//!
//! ```rust
//! use ddeck::{Session, SlideLayout};
//!
//! let mut session = Session::new("deck-1");
//! session.create_presentation("Tides");
//! session.stage_add("<h1>Why tides happen</h1>", SlideLayout::Title, None).expect("add should stage");
//! assert_eq!(session.slide_count(), 0);
//!
//! session.commit().expect("commit should run");
//! assert_eq!(session.slide_count(), 1);
//! ```

pub mod commit;
pub mod error;
pub mod model;
pub mod session;
pub mod staging;
pub mod text;

pub use commit::CommitSummary;
pub use error::{DeckError, DeckErrorKind};
pub use model::{AppliedEdit, EditOperation, PendingEdit, Presentation, Slide, SlideLayout};
pub use session::{ContextFile, Screenshot, Session, StyleTemplate};
pub use staging::{APPEND_POSITION, PendingEditSummary};
