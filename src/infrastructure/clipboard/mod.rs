//! System clipboard.
//!
//! Tries in order:
//! 1. OSC 52 - terminal clipboard escape sequence (works over SSH)
//! 2. System clipboard via `arboard`

use std::io::Write;

use base64::Engine;

use crate::application::errors::ClipboardError;
use crate::domain::traits::Clipboard;

/// Clipboard backed by the terminal and the desktop clipboard
#[derive(Debug, Default)]
pub struct SystemClipboard {
    /// Skip OSC 52, e.g. when stdout is not a terminal
    system_only: bool,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn system_only() -> Self {
        Self { system_only: true }
    }

    fn copy_osc52(text: &str) -> Result<(), ClipboardError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(text);

        // OSC 52 format: ESC ] 52 ; c ; <base64-data> ESC \
        let mut stdout = std::io::stdout();
        write!(stdout, "\x1b]52;c;{}\x1b\\", encoded)
            .map_err(|e| ClipboardError::Osc52(e.to_string()))?;
        stdout
            .flush()
            .map_err(|e| ClipboardError::Osc52(e.to_string()))?;

        Ok(())
    }

    fn copy_system(text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::System(e.to_string()))?;

        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::System(e.to_string()))?;

        Ok(())
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if !self.system_only && Self::copy_osc52(text).is_ok() {
            return Ok(());
        }
        Self::copy_system(text)
    }
}
