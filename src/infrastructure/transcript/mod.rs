//! HTML transcript of the conversation
//!
//! Every new entry rewrites the whole document, so the file is always a
//! complete page. Its script wires the copy buttons and runs syntax
//! highlighting and diagram rendering on the next animation frame.

use std::path::{Path, PathBuf};

use crate::application::formatting::escape_html;
use crate::application::view::entry_html;
use crate::domain::entities::TimelineEntry;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{TITLE}}</title>
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/highlight.js@11/styles/github.min.css">
<script src="https://cdn.jsdelivr.net/npm/highlight.js@11/lib/highlight.min.js"></script>
<script src="https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.min.js"></script>
<style>
body { font-family: sans-serif; max-width: 52rem; margin: 1rem auto; }
.message { margin: .5rem 0; padding: .5rem .75rem; border-radius: .5rem; }
.user-message { background: #dcf8c6; margin-left: 20%; }
.other-message { background: #f1f0f0; margin-right: 20%; }
.user-name { font-weight: bold; font-size: .85rem; }
.message-time { color: #888; font-size: .75rem; text-align: right; }
.connection-status { text-align: center; color: #666; font-size: .85rem; margin: .5rem 0; }
.code-block, .{{DIAGRAM}}-container { position: relative; }
.copy-btn { position: absolute; top: .25rem; right: .25rem; font-size: .75rem; }
</style>
</head>
<body>
<div id="chat-messages">
"#;

const PAGE_TAIL: &str = r#"</div>
<script>
mermaid.initialize({ startOnLoad: false });

function renderCode() {
  requestAnimationFrame(() => {
    document.querySelectorAll("pre code").forEach((b) => hljs.highlightElement(b));
    mermaid.run({ querySelector: ".{{DIAGRAM}}" });
  });
}

document.addEventListener("click", (e) => {
  const btn = e.target.closest(".copy-btn");
  if (!btn) return;
  const text = decodeURIComponent(btn.dataset.copy);
  const label = btn.innerText;
  navigator.clipboard
    .writeText(text)
    .then(() => {
      btn.innerText = "{{COPIED}}";
      setTimeout(() => (btn.innerText = label), {{FEEDBACK_MS}});
    })
    .catch(() => alert("{{FAILED}}"));
});

document.addEventListener("DOMContentLoaded", renderCode);
window.scrollTo(0, document.body.scrollHeight);
</script>
</body>
</html>
"#;

/// Page settings baked into the transcript's script
#[derive(Debug, Clone)]
pub struct TranscriptOptions {
    pub title: String,
    pub diagram_language: String,
    pub copied_label: String,
    pub failed_message: String,
    pub feedback_ms: u64,
}

/// HTML transcript file
pub struct Transcript {
    path: PathBuf,
    head: String,
    tail: String,
    fragments: Vec<String>,
}

impl Transcript {
    pub fn new(path: impl Into<PathBuf>, options: &TranscriptOptions) -> Self {
        let fill = |template: &str| {
            template
                .replace("{{TITLE}}", &escape_html(&options.title))
                .replace("{{DIAGRAM}}", &options.diagram_language)
                .replace("{{COPIED}}", &js_string(&options.copied_label))
                .replace("{{FAILED}}", &js_string(&options.failed_message))
                .replace("{{FEEDBACK_MS}}", &options.feedback_ms.to_string())
        };
        Self {
            path: path.into(),
            head: fill(PAGE_HEAD),
            tail: fill(PAGE_TAIL),
            fragments: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Add one entry and rewrite the file
    pub async fn append(&mut self, entry: &TimelineEntry) -> std::io::Result<()> {
        self.fragments.push(entry_html(entry));
        self.flush().await
    }

    /// Replace the whole conversation, as after a history reload
    pub async fn reset(&mut self, entries: &[TimelineEntry]) -> std::io::Result<()> {
        self.fragments = entries.iter().map(entry_html).collect();
        self.flush().await
    }

    /// The full document
    pub fn render(&self) -> String {
        let body_len: usize = self.fragments.iter().map(String::len).sum();
        let mut page = String::with_capacity(self.head.len() + body_len + self.tail.len());
        page.push_str(&self.head);
        for fragment in &self.fragments {
            page.push_str(fragment);
        }
        page.push_str(&self.tail);
        page
    }

    async fn flush(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, self.render()).await
    }
}

/// Contents for a double-quoted JS string inside a `<script>` block
fn js_string(text: &str) -> String {
    serde_json::to_string(text)
        .map(|quoted| quoted[1..quoted.len() - 1].replace("</", "<\\/"))
        .unwrap_or_default()
}
