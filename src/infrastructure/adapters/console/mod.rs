//! Console adapter - terminal front end for the chat

use crate::application::view::entry_line;
use crate::domain::entities::{ConnectionState, TimelineEntry, EMOJIS};

/// Line continuation marker: a line ending in `\` keeps composing
const CONTINUATION: char = '\\';

/// What a typed line means for the draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftLine {
    /// Still composing; the line was added to the draft
    Composing,
    /// The draft is complete and ready to parse
    Complete(String),
}

/// Terminal state: the message being composed and the latest copy targets
#[derive(Debug, Default)]
pub struct ConsoleAdapter {
    draft: Vec<String>,
    copy_targets: Vec<String>,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line of stdin into the draft
    pub fn feed(&mut self, line: &str) -> DraftLine {
        match line.strip_suffix(CONTINUATION) {
            Some(partial) => {
                self.draft.push(partial.to_string());
                DraftLine::Composing
            }
            None => {
                self.draft.push(line.to_string());
                DraftLine::Complete(std::mem::take(&mut self.draft).join("\n"))
            }
        }
    }

    pub fn is_composing(&self) -> bool {
        !self.draft.is_empty()
    }

    /// Append an emoji to the draft. Returns the emoji, or `None` for an
    /// index outside the picker.
    pub fn add_emoji(&mut self, index: usize) -> Option<&'static str> {
        let emoji = *EMOJIS.get(index.checked_sub(1)?)?;
        match self.draft.last_mut() {
            Some(last) => last.push_str(emoji),
            None => self.draft.push(emoji.to_string()),
        }
        Some(emoji)
    }

    /// Encoded copy payload `n` (1-based) of the latest message that had any
    pub fn copy_target(&self, n: usize) -> Option<&str> {
        self.copy_targets
            .get(n.checked_sub(1)?)
            .map(String::as_str)
    }

    pub fn show_entry(&mut self, entry: &TimelineEntry) {
        println!("{}", entry_line(entry));
        if let Some(msg) = entry.as_message() {
            let payloads = msg.markup.encoded_payloads();
            if !payloads.is_empty() {
                println!(
                    "    [{} copyable block(s), /copy <n>]",
                    payloads.len()
                );
                self.copy_targets = payloads;
            }
        }
    }

    pub fn show_connection(&self, state: &ConnectionState) {
        if state.is_error() {
            eprintln!("=== {} ===", state.banner());
        } else {
            println!("=== {} ===", state.banner());
        }
    }

    pub fn show_online(&self, count: u32) {
        println!("  ({} online)", count);
    }

    pub fn show_typing(&self, user: &str) {
        println!("  {} is typing...", user);
    }

    pub fn show_typing_stopped(&self, users: &[String]) {
        if let Some(line) = typing_stopped_line(users) {
            println!("  {}", line);
        }
    }

    pub fn show_emoji_picker(&self) {
        let items: Vec<String> = EMOJIS
            .iter()
            .enumerate()
            .map(|(i, e)| format!("{} {}", i + 1, e))
            .collect();
        println!("  {}", items.join("  "));
    }

    pub fn show_notice(&self, text: &str) {
        println!("  {}", text);
    }

    /// Blocking, user-facing failure
    pub fn alert(&self, text: &str) {
        eprintln!("!! {}", text);
    }
}

fn typing_stopped_line(users: &[String]) -> Option<String> {
    if users.is_empty() {
        return None;
    }
    Some(format!("{} stopped typing", users.join(", ")))
}
