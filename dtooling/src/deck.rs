//! The slide deck tool set.
//!
//! Structural edits are staged; only `commit_edits` touches the slides, and it
//! persists the session right after applying them. `create_presentation` and
//! `set_theme` change the presentation immediately.
//!
//! ```rust
//! use dtooling::{DECK_TOOL_NAMES, deck_tool_registry};
//!
//! let registry = deck_tool_registry();
//! assert_eq!(registry.names(), DECK_TOOL_NAMES);
//! ```

use ddeck::text::slide_preview;
use ddeck::{DeckError, SlideLayout};
use dprovider::ToolDefinition;
use serde_json::{Value, json};
use tracing::info;

use crate::args::{integer_arg, object_arg, optional_integer, string_arg};
use crate::{ParamType, Tool, ToolArgs, ToolContext, ToolError, ToolFuture, ToolRegistry, ToolSchema};

pub const DECK_TOOL_NAMES: [&str; 10] = [
    "create_presentation",
    "add_slide",
    "update_slide",
    "delete_slide",
    "reorder_slides",
    "list_slides",
    "get_slide",
    "set_theme",
    "get_pending_edits",
    "commit_edits",
];

const DEFAULT_TITLE: &str = "Untitled Presentation";

/// Builds a registry holding the deck tools in their advertised order.
pub fn deck_tool_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_deck_tools(&mut registry);
    registry
}

pub fn register_deck_tools(registry: &mut ToolRegistry) {
    registry.register_sync_fn(
        ToolSchema::new()
            .param("title", ParamType::String)
            .into_definition(
                "create_presentation",
                "Create a new presentation. Title is required.",
            ),
        create_presentation,
    );
    registry.register_sync_fn(
        ToolSchema::new()
            .param("html", ParamType::String)
            .param("position", ParamType::Integer)
            .param("layout", ParamType::String)
            .into_definition(
                "add_slide",
                "Add a new slide with HTML content. Position and layout are optional (use -1 \
                 for position if unknown, 'blank' for layout).",
            ),
        add_slide,
    );
    registry.register_sync_fn(
        ToolSchema::new()
            .param("slide_index", ParamType::Integer)
            .param("html", ParamType::String)
            .into_definition("update_slide", "Update an existing slide's HTML content"),
        update_slide,
    );
    registry.register_sync_fn(
        ToolSchema::new()
            .param("slide_index", ParamType::Integer)
            .into_definition("delete_slide", "Delete a slide from the presentation"),
        delete_slide,
    );
    registry.register_sync_fn(
        ToolSchema::new()
            .param("from_index", ParamType::Integer)
            .param("to_index", ParamType::Integer)
            .into_definition("reorder_slides", "Move a slide to a new position"),
        reorder_slides,
    );
    registry.register_sync_fn(
        ToolSchema::new()
            .param("dummy", ParamType::String)
            .into_definition(
                "list_slides",
                "List all slides in the presentation. No parameters required.",
            ),
        list_slides,
    );
    registry.register_sync_fn(
        ToolSchema::new()
            .param("slide_index", ParamType::Integer)
            .into_definition("get_slide", "Get full details of a specific slide"),
        get_slide,
    );
    registry.register_sync_fn(
        ToolSchema::new()
            .param("theme", ParamType::Object)
            .into_definition("set_theme", "Set the presentation theme (colors, fonts)"),
        set_theme,
    );
    registry.register_sync_fn(
        ToolSchema::new()
            .param("dummy", ParamType::String)
            .into_definition(
                "get_pending_edits",
                "Get all pending edits that haven't been committed. No parameters required.",
            ),
        get_pending_edits,
    );
    registry.register(CommitEditsTool);
}

fn create_presentation(args: &ToolArgs, ctx: &mut ToolContext<'_>) -> Result<Value, ToolError> {
    let title = string_arg(args, "title", DEFAULT_TITLE)?;
    ctx.session.create_presentation(title.clone());
    info!(session_id = %ctx.session_id(), %title, "created presentation");
    Ok(json!({ "success": true, "title": title, "slide_count": 0 }))
}

fn add_slide(args: &ToolArgs, ctx: &mut ToolContext<'_>) -> Result<Value, ToolError> {
    let html = string_arg(args, "html", "")?;
    let position = optional_integer(args, "position")?;
    let layout = SlideLayout::parse_lenient(&string_arg(args, "layout", "blank")?);

    let edit = ctx.session.stage_add(html, layout, position)?;
    Ok(json!({
        "success": true,
        "slide_index": edit.slide_index,
        "edit_id": edit.edit_id,
    }))
}

fn update_slide(args: &ToolArgs, ctx: &mut ToolContext<'_>) -> Result<Value, ToolError> {
    let slide_index = integer_arg(args, "slide_index", 0)?;
    let html = string_arg(args, "html", "")?;

    let edit = ctx.session.stage_update(slide_index, html)?;
    Ok(json!({
        "success": true,
        "slide_index": edit.slide_index,
        "edit_id": edit.edit_id,
    }))
}

fn delete_slide(args: &ToolArgs, ctx: &mut ToolContext<'_>) -> Result<Value, ToolError> {
    let slide_index = integer_arg(args, "slide_index", 0)?;

    let edit = ctx.session.stage_delete(slide_index)?;
    Ok(json!({
        "success": true,
        "slide_index": edit.slide_index,
        "edit_id": edit.edit_id,
    }))
}

fn reorder_slides(args: &ToolArgs, ctx: &mut ToolContext<'_>) -> Result<Value, ToolError> {
    let from_index = integer_arg(args, "from_index", 0)?;
    let to_index = integer_arg(args, "to_index", 0)?;

    ctx.session.stage_reorder(from_index, to_index)?;
    Ok(json!({ "success": true, "from_index": from_index, "to_index": to_index }))
}

fn list_slides(_args: &ToolArgs, ctx: &mut ToolContext<'_>) -> Result<Value, ToolError> {
    let Some(deck) = ctx.session.presentation.as_ref() else {
        return Ok(json!({ "slides": [], "count": 0 }));
    };

    let slides = deck
        .slides
        .iter()
        .map(|slide| {
            json!({
                "index": slide.index,
                "layout": slide.layout.as_str(),
                "preview": slide_preview(&slide.html),
                "has_notes": slide.has_notes(),
            })
        })
        .collect::<Vec<_>>();

    Ok(json!({ "count": slides.len(), "slides": slides }))
}

fn get_slide(args: &ToolArgs, ctx: &mut ToolContext<'_>) -> Result<Value, ToolError> {
    let deck = ctx
        .session
        .presentation
        .as_ref()
        .ok_or_else(DeckError::no_presentation_loaded)?;
    let slide_index = integer_arg(args, "slide_index", 0)?;
    let slide = usize::try_from(slide_index)
        .ok()
        .and_then(|index| deck.slide(index))
        .ok_or_else(|| DeckError::invalid_slide_index(slide_index))?;

    Ok(json!({
        "index": slide.index,
        "html": slide.html,
        "layout": slide.layout.as_str(),
        "notes": slide.notes,
    }))
}

fn set_theme(args: &ToolArgs, ctx: &mut ToolContext<'_>) -> Result<Value, ToolError> {
    let deck = ctx
        .session
        .presentation
        .as_mut()
        .ok_or_else(DeckError::no_presentation_created)?;
    let theme = object_arg(args, "theme")?;
    deck.theme = theme.clone();

    Ok(json!({ "success": true, "theme": theme }))
}

fn get_pending_edits(_args: &ToolArgs, ctx: &mut ToolContext<'_>) -> Result<Value, ToolError> {
    let edits = ctx.session.pending_summary();
    Ok(json!({ "count": edits.len(), "edits": edits }))
}

/// Applies every staged edit, then saves the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitEditsTool;

impl Tool for CommitEditsTool {
    fn definition(&self) -> ToolDefinition {
        ToolSchema::new()
            .param("dummy", ParamType::String)
            .into_definition(
                "commit_edits",
                "Apply all pending edits to the presentation. No parameters required.",
            )
    }

    fn invoke<'a>(
        &'a self,
        _args: &'a ToolArgs,
        context: &'a mut ToolContext<'_>,
    ) -> ToolFuture<'a, Result<Value, ToolError>> {
        Box::pin(async move {
            let summary = context.session.commit()?;
            context.store.save(&*context.session).await?;

            Ok(json!({
                "success": true,
                "applied_count": summary.applied_count,
                "skipped_count": summary.skipped_count,
                "total_slides": summary.total_slides,
            }))
        })
    }
}
