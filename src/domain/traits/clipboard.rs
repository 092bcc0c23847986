use crate::application::errors::ClipboardError;

/// Clipboard trait - somewhere copied text can go
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}
