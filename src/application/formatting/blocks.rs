//! Fenced code block rewriting
//!
//! Runs after sanitization. Diagram blocks become a diagram container,
//! tagged code blocks get a code-block wrapper; both carry a copy control.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag, TagEnd};

use super::sanitize::escape_html;
use crate::domain::entities::encode_payload;

/// How a fenced block is rendered
#[derive(Debug, Clone, PartialEq, Eq)]
enum BlockKind {
    Diagram,
    Code(String),
}

/// Settings for the block rewriter
#[derive(Debug, Clone)]
pub struct BlockStyle {
    pub diagram_language: String,
    pub copy_label: String,
}

impl BlockStyle {
    fn classify(&self, info: &str) -> Option<BlockKind> {
        let lang = info.split_ascii_whitespace().next().unwrap_or("");
        if lang.is_empty() {
            return None;
        }
        if lang == self.diagram_language {
            return Some(BlockKind::Diagram);
        }
        if lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Some(BlockKind::Code(lang.to_string()));
        }
        None
    }

    fn render(&self, kind: &BlockKind, source: &str) -> String {
        let payload = encode_payload(source);
        let label = escape_html(&self.copy_label);
        let body = escape_html(source);
        match kind {
            BlockKind::Diagram => {
                let class = escape_html(&self.diagram_language);
                format!(
                    "<div class=\"{class}-container\" data-source=\"{payload}\">\
                     <button class=\"copy-btn\" data-copy=\"{payload}\">{label}</button>\
                     <pre class=\"{class}\">{body}</pre></div>\n"
                )
            }
            BlockKind::Code(lang) => format!(
                "<div class=\"code-block\">\
                 <button class=\"copy-btn\" data-copy=\"{payload}\">{label}</button>\
                 <pre><code class=\"language-{lang} hljs\">{body}</code></pre></div>\n"
            ),
        }
    }
}

/// Replace diagram and tagged code blocks in a sanitized event stream
pub fn rewrite_blocks<'a, I>(events: I, style: &BlockStyle) -> Vec<Event<'a>>
where
    I: IntoIterator<Item = Event<'a>>,
{
    let mut out = Vec::new();
    let mut open: Option<(BlockKind, String)> = None;

    for event in events {
        if let Some((kind, mut source)) = open.take() {
            match event {
                Event::Text(text) => {
                    source.push_str(&text);
                    open = Some((kind, source));
                }
                Event::End(TagEnd::CodeBlock) => {
                    // The fence always leaves a trailing newline on the body
                    let source = source.strip_suffix('\n').unwrap_or(&source);
                    out.push(Event::Html(CowStr::from(style.render(&kind, source))));
                }
                _ => open = Some((kind, source)),
            }
            continue;
        }

        if let Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) = &event {
            if let Some(kind) = style.classify(info) {
                open = Some((kind, String::new()));
                continue;
            }
        }
        out.push(event);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> BlockStyle {
        BlockStyle {
            diagram_language: "mermaid".to_string(),
            copy_label: "Copy".to_string(),
        }
    }

    #[test]
    fn test_classify() {
        let style = style();
        assert_eq!(style.classify(""), None);
        assert_eq!(style.classify("mermaid"), Some(BlockKind::Diagram));
        assert_eq!(style.classify("rust"), Some(BlockKind::Code("rust".into())));
        assert_eq!(
            style.classify("python title=x"),
            Some(BlockKind::Code("python".into()))
        );
        assert_eq!(style.classify("c++"), None);
        assert_eq!(
            style.classify("python\tx=1"),
            Some(BlockKind::Code("python".into()))
        );
        assert_eq!(style.classify("  \t"), None);
    }

    #[test]
    fn test_split_text_events_are_joined() {
        let events = vec![
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(CowStr::Borrowed("sh")))),
            Event::Text(CowStr::Borrowed("echo a\n")),
            Event::Text(CowStr::Borrowed("echo b\n")),
            Event::End(TagEnd::CodeBlock),
        ];
        let out = rewrite_blocks(events, &style());
        assert_eq!(out.len(), 1);
        match &out[0] {
            Event::Html(html) => {
                assert!(html.contains("data-copy=\"echo%20a%0Aecho%20b\""));
                assert!(html.contains("class=\"language-sh hljs\""));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_untagged_blocks_pass_through() {
        let events = vec![
            Event::Start(Tag::CodeBlock(CodeBlockKind::Indented)),
            Event::Text(CowStr::Borrowed("x\n")),
            Event::End(TagEnd::CodeBlock),
        ];
        assert_eq!(rewrite_blocks(events.clone(), &style()), events);
    }
}
