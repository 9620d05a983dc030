//! System prompts and the opening user message of a run.

use ddeck::Session;
use dprovider::{ContentPart, Message, Role};

pub const SYSTEM_PROMPT_NEW: &str = r#"You are a presentation creation assistant. Create professional slides using HTML.

WORKFLOW:
1. Use create_presentation to start a new presentation with a title
2. Use add_slide to add slides with HTML content
3. Use commit_edits to finalize and save all changes

CRITICAL - SLIDE DIMENSIONS:
- Slides are EXACTLY 960px wide x 540px tall (16:9 aspect ratio)
- ALL content MUST fit within these bounds - no overflow allowed
- Your root div MUST have: width: 960px; height: 540px; overflow: hidden;
- Use box-sizing: border-box to include padding in dimensions

HTML TEMPLATE (USE THIS STRUCTURE):
<div style="width: 960px; height: 540px; padding: 40px; box-sizing: border-box; overflow: hidden; font-family: Arial, sans-serif;">
  <h1 style="color: #1a73e8; margin: 0 0 20px 0; font-size: 36px;">Slide Title</h1>
  <ul style="font-size: 22px; line-height: 1.5; margin: 0; padding-left: 24px;">
    <li>First key point</li>
    <li>Second key point</li>
    <li>Third key point</li>
  </ul>
</div>

DESIGN RULES:
- Root container: ALWAYS 960x540px with overflow:hidden
- Title: max 36px font, single line preferred
- Body text: 18-24px font size
- Padding: 40px on all sides (leaves 880x460px for content)
- Maximum 5-6 bullet points per slide
- If using cards/grids, calculate sizes to fit within bounds
- Test mentally: will this content fit in 880x460px usable area?

You can call add_slide multiple times in parallel for efficiency when creating multiple slides.
Always call commit_edits when done to save the presentation."#;

pub const SYSTEM_PROMPT_CONTINUATION: &str = r#"You are editing an existing presentation.

CRITICAL: Only modify slides the user specifically requests.
DO NOT change slides that weren't mentioned unless explicitly asked.

CRITICAL - SLIDE DIMENSIONS:
- Slides are EXACTLY 960px wide x 540px tall (16:9 aspect ratio)
- ALL content MUST fit within these bounds - no overflow allowed
- Root div MUST have: width: 960px; height: 540px; overflow: hidden; box-sizing: border-box;

WORKFLOW:
1. Use list_slides to see all current slides
2. Use get_slide to see details of specific slides
3. Use update_slide or add_slide to make changes
4. Use commit_edits to save changes

Use list_slides first to understand the current state before making any changes."#;

/// Base prompt plus the session's context files and style template.
pub fn build_system_prompt(session: &Session, continuation: bool) -> String {
    let mut prompt = if continuation {
        SYSTEM_PROMPT_CONTINUATION
    } else {
        SYSTEM_PROMPT_NEW
    }
    .to_string();

    let context = session
        .context_files
        .iter()
        .filter(|file| !file.text.is_empty())
        .map(|file| format!("=== {} ===\n{}", file.filename, file.text))
        .collect::<Vec<_>>()
        .join("\n\n");
    if !context.is_empty() {
        prompt.push_str("\n\nCONTEXT FILES:\n");
        prompt.push_str(&context);
    }

    if let Some(template) = session
        .style_template
        .as_ref()
        .filter(|template| !template.text.is_empty())
    {
        prompt.push_str("\n\nSTYLE TEMPLATE REFERENCE:");
        prompt.push_str(&format!("\nFilename: {}", template.filename));
        prompt.push_str(&format!("\nTemplate content:\n{}", template.text));
        if !template.screenshots.is_empty() {
            prompt.push_str(
                "\n\nStyle reference screenshots will be provided in the user message.",
            );
        }
    }

    prompt
}

/// The instructions, preceded by template screenshots when the session has any.
pub fn build_user_message(session: &Session, instructions: &str) -> Message {
    let screenshots = session
        .style_template
        .as_ref()
        .map(|template| template.screenshots.as_slice())
        .unwrap_or_default();

    if screenshots.is_empty() {
        return Message::new(Role::User, instructions);
    }

    let mut parts = Vec::with_capacity(screenshots.len() * 2 + 2);
    parts.push(ContentPart::text(format!(
        "STYLE TEMPLATE REFERENCE SCREENSHOTS:\nThe following {} screenshots show the visual style you should emulate:",
        screenshots.len()
    )));
    for screenshot in screenshots {
        parts.push(ContentPart::text(format!("\nSlide {}:", screenshot.index + 1)));
        parts.push(ContentPart::image_url(format!(
            "data:image/jpeg;base64,{}",
            screenshot.data
        )));
    }
    parts.push(ContentPart::text(instructions));

    Message::with_parts(Role::User, parts)
}

#[cfg(test)]
mod tests {
    use ddeck::{ContextFile, Screenshot, Session, StyleTemplate};
    use dprovider::{ContentPart, Role};

    use super::*;

    fn template(screenshots: Vec<Screenshot>) -> StyleTemplate {
        StyleTemplate {
            filename: "brand.pptx".to_string(),
            text: "Navy headings, white body".to_string(),
            screenshots,
        }
    }

    #[test]
    fn bare_session_uses_the_base_prompts() {
        let session = Session::new("p");
        assert_eq!(build_system_prompt(&session, false), SYSTEM_PROMPT_NEW);
        assert_eq!(
            build_system_prompt(&session, true),
            SYSTEM_PROMPT_CONTINUATION
        );
    }

    #[test]
    fn context_files_with_text_are_appended() {
        let mut session = Session::new("p");
        session.context_files = vec![
            ContextFile::new("notes.md", "Tides are caused by the moon."),
            ContextFile::new("empty.pdf", ""),
            ContextFile::new("data.txt", "High tide at 6am."),
        ];

        let prompt = build_system_prompt(&session, false);
        assert!(prompt.ends_with(
            "\n\nCONTEXT FILES:\n=== notes.md ===\nTides are caused by the moon.\n\n=== data.txt ===\nHigh tide at 6am."
        ));
        assert!(!prompt.contains("empty.pdf"));
    }

    #[test]
    fn style_template_section_mentions_screenshots_only_when_present() {
        let mut session = Session::new("p");
        session.style_template = Some(template(Vec::new()));
        let prompt = build_system_prompt(&session, true);
        assert!(prompt.contains(
            "STYLE TEMPLATE REFERENCE:\nFilename: brand.pptx\nTemplate content:\nNavy headings, white body"
        ));
        assert!(!prompt.contains("screenshots will be provided"));

        session.style_template = Some(template(vec![Screenshot {
            index: 0,
            data: "AAAA".to_string(),
        }]));
        assert!(build_system_prompt(&session, true).contains("screenshots will be provided"));
    }

    #[test]
    fn user_message_is_plain_without_screenshots() {
        let message = build_user_message(&Session::new("p"), "Make a deck");
        assert_eq!(message.role, Role::User);
        assert_eq!(message.content, "Make a deck");
        assert!(!message.is_multimodal());
    }

    #[test]
    fn screenshots_become_labelled_image_parts() {
        let mut session = Session::new("p");
        session.style_template = Some(template(vec![
            Screenshot {
                index: 0,
                data: "AAAA".to_string(),
            },
            Screenshot {
                index: 4,
                data: "BBBB".to_string(),
            },
        ]));

        let message = build_user_message(&session, "Match the template");
        assert_eq!(message.parts.len(), 6);
        assert!(matches!(&message.parts[0], ContentPart::Text(text) if text.contains("The following 2 screenshots")));
        assert_eq!(message.parts[3], ContentPart::text("\nSlide 5:"));
        assert_eq!(
            message.parts[4],
            ContentPart::image_url("data:image/jpeg;base64,BBBB")
        );
        assert_eq!(message.parts[5], ContentPart::text("Match the template"));
    }
}
