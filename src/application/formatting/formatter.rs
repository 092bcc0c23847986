//! Message formatter - Markdown to sanitized, render-ready HTML

use std::panic::{self, AssertUnwindSafe};

use pulldown_cmark::{html, Options, Parser};

use super::blocks::{rewrite_blocks, BlockStyle};
use super::sanitize::{escape_html, sanitize_event};
use crate::application::errors::FormatError;
use crate::domain::entities::RenderableMarkup;

/// Fence tag reserved for diagrams
pub const DIAGRAM_LANGUAGE: &str = "mermaid";

/// Text on copy controls
pub const COPY_LABEL: &str = "Copy";

/// Stateless Markdown formatter.
///
/// Pipeline: parse → sanitize → diagram/code block rewrite → HTML. The same
/// input always yields the same markup.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    style: BlockStyle,
}

impl MessageFormatter {
    pub fn new(diagram_language: impl Into<String>, copy_label: impl Into<String>) -> Self {
        Self {
            style: BlockStyle {
                diagram_language: diagram_language.into(),
                copy_label: copy_label.into(),
            },
        }
    }

    /// Format a message. Never fails: if rendering breaks, the text comes
    /// back escaped inside a paragraph.
    pub fn format(&self, text: &str) -> RenderableMarkup {
        render_or_escape(text, |t| self.render(t))
    }

    /// Format a message, reporting renderer failures instead of falling back
    pub fn try_format(&self, text: &str) -> Result<RenderableMarkup, FormatError> {
        guarded(text, |t| self.render(t))
    }

    fn render(&self, text: &str) -> RenderableMarkup {
        let parser = Parser::new_ext(text, markdown_options()).map(sanitize_event);
        let events = rewrite_blocks(parser, &self.style);

        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        RenderableMarkup::new(out)
    }
}

impl Default for MessageFormatter {
    fn default() -> Self {
        Self::new(DIAGRAM_LANGUAGE, COPY_LABEL)
    }
}

/// Format with the default diagram tag and copy label
pub fn format(text: &str) -> RenderableMarkup {
    MessageFormatter::default().format(text)
}

fn markdown_options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts
}

/// Run `render` on the trimmed text, escaping the text if it panics
fn render_or_escape<F>(text: &str, render: F) -> RenderableMarkup
where
    F: FnOnce(&str) -> RenderableMarkup,
{
    match guarded(text, render) {
        Ok(markup) => markup,
        Err(e) => {
            tracing::warn!("Falling back to plain text: {}", e);
            plain_text(text.trim())
        }
    }
}

fn guarded<F>(text: &str, render: F) -> Result<RenderableMarkup, FormatError>
where
    F: FnOnce(&str) -> RenderableMarkup,
{
    let text = text.trim();
    if text.is_empty() {
        return Ok(RenderableMarkup::default());
    }

    panic::catch_unwind(AssertUnwindSafe(|| render(text))).map_err(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        FormatError::Renderer(reason)
    })
}

fn plain_text(text: &str) -> RenderableMarkup {
    if text.is_empty() {
        return RenderableMarkup::default();
    }
    RenderableMarkup::new(format!("<p>{}</p>\n", escape_html(text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(format("").is_empty());
        assert!(format(" \n\t ").is_empty());
    }

    #[test]
    fn test_plain_text_fallback_is_escaped() {
        let markup = plain_text("<img src=x onerror=alert(1)>");
        assert_eq!(
            markup.as_str(),
            "<p>&lt;img src=x onerror=alert(1)&gt;</p>\n"
        );
    }

    #[test]
    fn test_renderer_panic_fails_closed() {
        let markup = render_or_escape("  <b>bold</b> & \"q\"  ", |_| panic!("renderer exploded"));
        assert_eq!(
            markup.as_str(),
            "<p>&lt;b&gt;bold&lt;/b&gt; &amp; &quot;q&quot;</p>\n"
        );

        match guarded("x", |_| panic!("renderer exploded")) {
            Err(FormatError::Renderer(reason)) => assert_eq!(reason, "renderer exploded"),
            other => panic!("unexpected result {:?}", other),
        }

        let reason = match guarded("x", |_| panic!("bad byte at {}", 3)) {
            Err(FormatError::Renderer(reason)) => reason,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(reason, "bad byte at 3");
    }

    #[test]
    fn test_guard_passes_trimmed_text_through() {
        let seen = guarded("  hi \n", |t| RenderableMarkup::new(t.to_string())).unwrap();
        assert_eq!(seen.as_str(), "hi");
        assert!(guarded("   ", |_| panic!("not called")).unwrap().is_empty());
    }

    #[test]
    fn test_custom_labels() {
        let formatter = MessageFormatter::new("graphviz", "複製");
        let markup = formatter.format("```graphviz\ndigraph { a -> b }\n```");
        assert!(markup.as_str().contains("<pre class=\"graphviz\">"));
        assert!(markup.as_str().contains(">複製</button>"));

        // mermaid is an ordinary code block for this formatter
        let markup = formatter.format("```mermaid\ngraph TD;\n```");
        assert!(markup.as_str().contains("language-mermaid hljs"));
    }

    #[test]
    fn test_inline_code_is_escaped() {
        let markup = format("use `<script>` carefully");
        assert!(markup.as_str().contains("<code>&lt;script&gt;</code>"));
    }

    #[test]
    fn test_javascript_link_is_neutralised() {
        let markup = format("[click](javascript:alert(1))");
        assert!(!markup.as_str().contains("javascript:"));
        assert!(markup.as_str().contains("href=\"#\""));
    }

    #[test]
    fn test_code_block_inside_list() {
        let markup = format("- step\n\n  ```bash\n  ls -la\n  ```\n");
        assert!(markup.as_str().contains("<li>"));
        assert_eq!(markup.copy_payloads(), vec!["ls -la".to_string()]);
    }
}
