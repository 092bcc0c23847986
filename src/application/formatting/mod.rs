//! Message formatting - Markdown, sanitization, diagram and code blocks

pub mod blocks;
pub mod formatter;
pub mod sanitize;

pub use formatter::{format, MessageFormatter, COPY_LABEL, DIAGRAM_LANGUAGE};
pub use sanitize::escape_html;
