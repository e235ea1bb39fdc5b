//! Markdown body to HTML using pulldown-cmark.
//!
//! Plain CommonMark plus two extensions, each switchable from
//! `[markdown]` in `config.toml`:
//!
//! - **Figures**: a paragraph that starts with an image on its own line
//!   becomes a `<figure>`. Lines that follow in the same paragraph become the
//!   `<figcaption>`.
//!
//!   ```text
//!   ![Harbour at dusk](/photos/harbour.jpg)
//!   Taken from the ferry.
//!   ```
//!
//! - **Emoji**: GitHub `:shortcode:` names outside code are replaced with
//!   the emoji character.
//!
//! Raw HTML in the source passes through untouched.

use std::borrow::Cow;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, TextMergeStream, html};

use crate::config::MarkdownConfig;

/// Which extensions to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownOptions {
    pub figures: bool,
    pub emoji: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            figures: true,
            emoji: true,
        }
    }
}

impl From<&MarkdownConfig> for MarkdownOptions {
    fn from(config: &MarkdownConfig) -> Self {
        Self {
            figures: config.figures,
            emoji: config.emoji,
        }
    }
}

/// Render a markdown body (front matter already removed) to HTML.
pub fn render(source: &str, options: &MarkdownOptions) -> String {
    let parser = TextMergeStream::new(Parser::new_ext(source, Options::empty()));

    let mut in_code_block = false;
    let events: Vec<Event> = parser
        .map(|event| match event {
            Event::Start(Tag::CodeBlock(_)) => {
                in_code_block = true;
                event
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                event
            }
            Event::Text(text) if options.emoji && !in_code_block => {
                let replaced = match replace_shortcodes(&text) {
                    Cow::Owned(s) => Some(s),
                    Cow::Borrowed(_) => None,
                };
                match replaced {
                    Some(s) => Event::Text(CowStr::from(s)),
                    None => Event::Text(text),
                }
            }
            other => other,
        })
        .collect();

    let events = if options.figures {
        wrap_figures(events)
    } else {
        events
    };

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

// =============================================================================
// Emoji
// =============================================================================

fn is_shortcode_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'))
}

/// Replace every known `:shortcode:` in `text`. Unknown names and stray
/// colons (`12:30:45`) are left alone.
pub fn replace_shortcodes(text: &str) -> Cow<'_, str> {
    if !text.contains(':') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut changed = false;
    while let Some(start) = rest.find(':') {
        let after = &rest[start + 1..];
        let Some(end) = after.find(':') else {
            break;
        };
        let name = &after[..end];
        let emoji = if is_shortcode_name(name) {
            emojis::get_by_shortcode(name)
        } else {
            None
        };
        match emoji {
            Some(emoji) => {
                out.push_str(&rest[..start]);
                out.push_str(emoji.as_str());
                rest = &after[end + 1..];
                changed = true;
            }
            None => {
                // The closing colon may open the next shortcode.
                out.push_str(&rest[..=start]);
                rest = after;
            }
        }
    }

    if !changed {
        return Cow::Borrowed(text);
    }
    out.push_str(rest);
    Cow::Owned(out)
}

// =============================================================================
// Figures
// =============================================================================

/// Length of the leading image in a paragraph's events, if the paragraph is
/// a figure: it starts with an image that is followed by nothing or by a
/// line break.
fn figure_image_len(paragraph: &[Event]) -> Option<usize> {
    if !matches!(paragraph.first(), Some(Event::Start(Tag::Image { .. }))) {
        return None;
    }
    let mut depth = 0usize;
    for (i, event) in paragraph.iter().enumerate() {
        match event {
            Event::Start(Tag::Image { .. }) => depth += 1,
            Event::End(TagEnd::Image) => {
                depth -= 1;
                if depth == 0 {
                    return match paragraph.get(i + 1) {
                        None | Some(Event::SoftBreak | Event::HardBreak) => Some(i + 1),
                        _ => None,
                    };
                }
            }
            _ => {}
        }
    }
    None
}

fn wrap_figures(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut iter = events.into_iter();

    while let Some(event) = iter.next() {
        if !matches!(event, Event::Start(Tag::Paragraph)) {
            out.push(event);
            continue;
        }

        let mut paragraph = Vec::new();
        for inner in iter.by_ref() {
            if matches!(inner, Event::End(TagEnd::Paragraph)) {
                break;
            }
            paragraph.push(inner);
        }

        let Some(image_len) = figure_image_len(&paragraph) else {
            out.push(Event::Start(Tag::Paragraph));
            out.extend(paragraph);
            out.push(Event::End(TagEnd::Paragraph));
            continue;
        };

        let mut rest = paragraph.split_off(image_len);
        if !rest.is_empty() {
            // Drop the line break between image and caption.
            rest.remove(0);
        }

        out.push(Event::Html("<figure>\n".into()));
        out.extend(paragraph);
        out.push(Event::Html("\n".into()));
        if !rest.is_empty() {
            out.push(Event::Html("<figcaption><p>".into()));
            out.extend(rest);
            out.push(Event::Html("</p></figcaption>\n".into()));
        }
        out.push(Event::Html("</figure>\n".into()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_default(source: &str) -> String {
        render(source, &MarkdownOptions::default())
    }

    #[test]
    fn plain_commonmark() {
        assert_eq!(
            render_default("# Title\n\nSome *text*.\n"),
            "<h1>Title</h1>\n<p>Some <em>text</em>.</p>\n"
        );
    }

    #[test]
    fn raw_html_passes_through() {
        let html = render_default("<div class=\"map\"></div>\n");
        assert!(html.contains("<div class=\"map\"></div>"));
    }

    // =========================================================================
    // Emoji
    // =========================================================================

    #[test]
    fn shortcode_becomes_emoji() {
        assert_eq!(render_default(":rocket: launch\n"), "<p>🚀 launch</p>\n");
    }

    #[test]
    fn unknown_shortcode_left_alone() {
        assert_eq!(
            replace_shortcodes(":not_an_emoji_name:"),
            ":not_an_emoji_name:"
        );
    }

    #[test]
    fn times_are_not_shortcodes() {
        assert!(matches!(replace_shortcodes("12:30:45"), Cow::Borrowed(_)));
    }

    #[test]
    fn adjacent_shortcodes() {
        assert_eq!(replace_shortcodes("a :tada::tada: b"), "a 🎉🎉 b");
    }

    #[test]
    fn shortcodes_in_code_untouched() {
        let inline = render_default("`:rocket:`\n");
        assert!(inline.contains("<code>:rocket:</code>"));

        let block = render_default("```\n:rocket:\n```\n");
        assert!(block.contains(":rocket:"));
        assert!(!block.contains('🚀'));
    }

    #[test]
    fn emoji_can_be_disabled() {
        let options = MarkdownOptions {
            emoji: false,
            ..MarkdownOptions::default()
        };
        assert_eq!(render(":rocket:\n", &options), "<p>:rocket:</p>\n");
    }

    // =========================================================================
    // Figures
    // =========================================================================

    #[test]
    fn image_with_caption_becomes_figure() {
        let html = render_default("![a cat](cat.jpg)\nA cat on a wall\n");
        assert!(html.starts_with("<figure>\n<img src=\"cat.jpg\" alt=\"a cat\""));
        assert!(html.contains("<figcaption><p>A cat on a wall</p></figcaption>\n"));
        assert!(html.ends_with("</figure>\n"));
        assert!(!html.contains("<p><img"));
    }

    #[test]
    fn lone_image_becomes_figure_without_caption() {
        let html = render_default("![a cat](cat.jpg)\n");
        assert!(html.starts_with("<figure>\n<img"));
        assert!(!html.contains("figcaption"));
    }

    #[test]
    fn inline_image_stays_in_paragraph() {
        let html = render_default("Look ![a cat](cat.jpg) here\n");
        assert!(html.starts_with("<p>Look <img"));
        assert!(!html.contains("<figure>"));
    }

    #[test]
    fn image_followed_by_text_on_same_line_is_not_a_figure() {
        let html = render_default("![a cat](cat.jpg) sleeping\n");
        assert!(!html.contains("<figure>"));
    }

    #[test]
    fn figures_can_be_disabled() {
        let options = MarkdownOptions {
            figures: false,
            ..MarkdownOptions::default()
        };
        let html = render("![a cat](cat.jpg)\n", &options);
        assert!(html.starts_with("<p><img"));
    }
}
