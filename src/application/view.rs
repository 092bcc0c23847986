//! Timeline presentation - HTML fragments and terminal lines

use crate::application::formatting::escape_html;
use crate::domain::entities::{RenderedMessage, TimelineEntry};

/// HTML fragment for one timeline entry. Sender names and system text are
/// escaped; message bodies are formatter output and go in as-is.
pub fn entry_html(entry: &TimelineEntry) -> String {
    match entry {
        TimelineEntry::System(text) => {
            format!("<div class=\"connection-status\">{}</div>\n", escape_html(text))
        }
        TimelineEntry::Message(msg) => message_html(msg),
    }
}

fn message_html(msg: &RenderedMessage) -> String {
    let side = if msg.is_me { "user-message" } else { "other-message" };
    let user_info = if msg.is_me {
        String::new()
    } else {
        format!(
            "<div class=\"user-info\"><span class=\"user-name\">{}</span></div>",
            escape_html(&msg.sender)
        )
    };
    format!(
        "<div class=\"message {side} clearfix\">{user_info}\
         <div class=\"message-content\">{}</div>\
         <div class=\"message-time\">{}</div></div>\n",
        msg.markup,
        escape_html(&msg.time),
    )
}

/// Plain-text rendering for the terminal
pub fn entry_line(entry: &TimelineEntry) -> String {
    match entry {
        TimelineEntry::System(text) => format!("  * {}", text),
        TimelineEntry::Message(msg) => {
            let who = if msg.is_me { "you" } else { msg.sender.as_str() };
            let mut lines = msg.raw.lines();
            let first = lines.next().unwrap_or("");
            let mut out = format!("[{}] {}: {}", msg.time, who, first);
            for line in lines {
                out.push_str("\n    ");
                out.push_str(line);
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::formatting::format;

    fn message(sender: &str, is_me: bool, raw: &str) -> TimelineEntry {
        TimelineEntry::Message(RenderedMessage {
            sender: sender.to_string(),
            is_me,
            raw: raw.to_string(),
            markup: format(raw),
            time: "09:05".to_string(),
        })
    }

    #[test]
    fn test_other_message_shows_escaped_sender() {
        let html = entry_html(&message("<img src=x>", false, "hi"));
        assert!(html.contains("other-message"));
        assert!(html.contains("<span class=\"user-name\">&lt;img src=x&gt;</span>"));
        assert!(html.contains("<div class=\"message-content\"><p>hi</p>\n</div>"));
    }

    #[test]
    fn test_own_message_has_no_user_info() {
        let html = entry_html(&message("me", true, "hi"));
        assert!(html.contains("user-message"));
        assert!(!html.contains("user-info"));
    }

    #[test]
    fn test_system_entry_is_escaped() {
        let html = entry_html(&TimelineEntry::system("<b>amy</b> joined the chat"));
        assert_eq!(
            html,
            "<div class=\"connection-status\">&lt;b&gt;amy&lt;/b&gt; joined the chat</div>\n"
        );
    }

    #[test]
    fn test_terminal_lines() {
        assert_eq!(entry_line(&message("amy", false, "one\ntwo")), "[09:05] amy: one\n    two");
        assert_eq!(entry_line(&message("me", true, "hi")), "[09:05] you: hi");
        assert_eq!(entry_line(&TimelineEntry::system("welcome")), "  * welcome");
    }
}
