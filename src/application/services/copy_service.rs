use std::time::Duration;

use crate::application::errors::ClipboardError;
use crate::domain::entities::decode_payload;
use crate::domain::traits::Clipboard;

/// Button label while the "copied" confirmation is showing
pub const COPIED_LABEL: &str = "Copied!";

/// Shown when the clipboard write fails
pub const COPY_FAILED_MESSAGE: &str = "Copy failed";

/// How long the confirmation label stays before reverting
pub const COPY_FEEDBACK: Duration = Duration::from_millis(1500);

/// Result of a copy request, as the user sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Swap the label to [`COPIED_LABEL`] for the feedback period
    Copied,
    /// Alert the user
    Failed(String),
}

/// Writes copy-control payloads to a clipboard
pub struct CopyService<C: Clipboard> {
    clipboard: C,
}

impl<C: Clipboard> CopyService<C> {
    pub fn new(clipboard: C) -> Self {
        Self { clipboard }
    }

    /// Copy a percent-encoded payload as embedded in a `data-copy` attribute
    pub fn copy_encoded(&mut self, encoded: &str) -> CopyOutcome {
        match decode_payload(encoded) {
            Some(text) => self.copy_text(&text),
            None => self.failed(ClipboardError::Decode),
        }
    }

    /// Copy already-decoded text
    pub fn copy_text(&mut self, text: &str) -> CopyOutcome {
        match self.clipboard.write_text(text) {
            Ok(()) => {
                tracing::debug!("Copied {} bytes", text.len());
                CopyOutcome::Copied
            }
            Err(e) => self.failed(e),
        }
    }

    fn failed(&self, error: ClipboardError) -> CopyOutcome {
        tracing::warn!("Clipboard write failed: {}", error);
        CopyOutcome::Failed(format!("{}: {}", COPY_FAILED_MESSAGE, error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MemoryClipboard {
        contents: Option<String>,
        broken: bool,
    }

    impl Clipboard for MemoryClipboard {
        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.broken {
                return Err(ClipboardError::System("no display".into()));
            }
            self.contents = Some(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_encoded_payload_is_decoded_before_writing() {
        let mut svc = CopyService::new(MemoryClipboard::default());
        assert_eq!(svc.copy_encoded("graph%20TD%3B%20A--%3EB%3B"), CopyOutcome::Copied);
        assert_eq!(svc.clipboard.contents.as_deref(), Some("graph TD; A-->B;"));
    }

    #[test]
    fn test_invalid_payload_fails() {
        let mut svc = CopyService::new(MemoryClipboard::default());
        assert!(matches!(svc.copy_encoded("%FF"), CopyOutcome::Failed(_)));
        assert!(svc.clipboard.contents.is_none());
    }

    #[test]
    fn test_clipboard_failure_is_surfaced() {
        let mut svc = CopyService::new(MemoryClipboard {
            contents: None,
            broken: true,
        });
        match svc.copy_text("x") {
            CopyOutcome::Failed(msg) => assert!(msg.contains("no display")),
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}
