//! Human-readable progress lines for dispatched tool calls.
//!
//! ```rust
//! use dagent::describe_tool_call;
//! use serde_json::json;
//!
//! let args = json!({"html": "<h1>Moon phases</h1><ul><li>New</li><li>Full</li></ul>"});
//! let description = describe_tool_call("add_slide", args.as_object().expect("object"));
//! assert_eq!(description.friendly.as_deref(), Some("Adding slide: Moon phases"));
//! assert_eq!(description.details.as_deref(), Some("• New\n• Full"));
//! ```

use ddeck::text::{slide_content, slide_title};
use dtooling::{ToolArgs, optional_integer};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolDescription {
    pub friendly: Option<String>,
    pub details: Option<String>,
}

impl ToolDescription {
    fn friendly(friendly: String) -> Self {
        Self {
            friendly: Some(friendly),
            details: None,
        }
    }
}

pub fn describe_tool_call(tool_name: &str, args: &ToolArgs) -> ToolDescription {
    let html = || args.get("html").and_then(Value::as_str).unwrap_or("");
    let slide_number = || {
        optional_integer(args, "slide_index")
            .ok()
            .flatten()
            .unwrap_or(0)
            .saturating_add(1)
    };

    match tool_name {
        "create_presentation" => {
            let title = args
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or("Untitled");
            ToolDescription::friendly(format!("Creating presentation: {title}"))
        }
        "add_slide" => {
            let friendly = match slide_title(html()) {
                Some(title) => format!("Adding slide: {title}"),
                None => "Adding a new slide...".to_string(),
            };
            ToolDescription {
                friendly: Some(friendly),
                details: slide_content(html()),
            }
        }
        "update_slide" => {
            let number = slide_number();
            let friendly = match slide_title(html()) {
                Some(title) => format!("Updating slide {number}: {title}"),
                None => format!("Updating slide {number}..."),
            };
            ToolDescription {
                friendly: Some(friendly),
                details: slide_content(html()),
            }
        }
        "delete_slide" => ToolDescription::friendly(format!("Deleting slide {}", slide_number())),
        "list_slides" => ToolDescription::friendly("Listing all slides...".to_string()),
        "get_slide" => {
            ToolDescription::friendly(format!("Getting slide {} details...", slide_number()))
        }
        "commit_edits" => ToolDescription::friendly("Saving changes...".to_string()),
        "set_theme" => ToolDescription::friendly("Setting presentation theme...".to_string()),
        _ => ToolDescription::default(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::{ToolDescription, describe_tool_call};

    fn describe(name: &str, args: Value) -> ToolDescription {
        describe_tool_call(name, args.as_object().expect("test args should be an object"))
    }

    #[test]
    fn slide_numbers_are_one_based() {
        assert_eq!(
            describe("delete_slide", json!({"slide_index": 2})).friendly.as_deref(),
            Some("Deleting slide 3")
        );
        assert_eq!(
            describe("get_slide", json!({})).friendly.as_deref(),
            Some("Getting slide 1 details...")
        );
    }

    #[test]
    fn integral_float_indices_match_the_handler_reading() {
        assert_eq!(
            describe("delete_slide", json!({"slide_index": 2.0})).friendly.as_deref(),
            Some("Deleting slide 3")
        );
        assert_eq!(
            describe("get_slide", json!({"slide_index": "two"})).friendly.as_deref(),
            Some("Getting slide 1 details...")
        );
    }

    #[test]
    fn update_without_title_uses_ellipsis_form() {
        let description = describe("update_slide", json!({"slide_index": 0, "html": ""}));
        assert_eq!(description.friendly.as_deref(), Some("Updating slide 1..."));
        assert_eq!(description.details, None);

        let titled = describe(
            "update_slide",
            json!({"slide_index": 1, "html": "<h2>Agenda</h2><p>Intro</p>"}),
        );
        assert_eq!(titled.friendly.as_deref(), Some("Updating slide 2: Agenda"));
        assert_eq!(titled.details.as_deref(), Some("Intro"));
    }

    #[test]
    fn add_without_html_and_unknown_tools() {
        assert_eq!(
            describe("add_slide", json!({})).friendly.as_deref(),
            Some("Adding a new slide...")
        );
        assert_eq!(
            describe("create_presentation", json!({})).friendly.as_deref(),
            Some("Creating presentation: Untitled")
        );
        assert_eq!(describe("get_pending_edits", json!({})), ToolDescription::default());
        assert_eq!(describe("reorder_slides", json!({})), ToolDescription::default());
    }
}
