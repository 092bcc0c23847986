//! Input parser - Turns a line typed by the user into an action

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Nothing but whitespace; nothing is sent
    Empty,
    Message(String),
    Rename(String),
    ClearHistory,
    History,
    /// Copy the n-th block (1-based) of the latest message that has one
    Copy(usize),
    /// Show the picker, or append the n-th emoji (1-based) to the draft
    Emoji(Option<usize>),
    Help,
    Quit,
}

/// Parses input lines into [`Input`] actions
pub struct InputParser {
    command_prefix: String,
}

impl InputParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    /// Parse one line of input
    pub fn parse(&self, text: &str) -> Input {
        let text = text.trim();
        if text.is_empty() {
            return Input::Empty;
        }

        if let Some(cmd_text) = text.strip_prefix(self.command_prefix.as_str()) {
            if let Some(input) = self.parse_command(cmd_text) {
                return input;
            }
        }

        // Unknown commands and plain text are sent as-is
        Input::Message(text.to_string())
    }

    fn parse_command(&self, cmd_text: &str) -> Option<Input> {
        let (name, rest) = match cmd_text.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (cmd_text, ""),
        };

        let input = match name {
            "nick" | "name" => {
                if rest.is_empty() {
                    return None;
                }
                Input::Rename(rest.to_string())
            }
            "clear" => Input::ClearHistory,
            "history" => Input::History,
            "copy" => Input::Copy(rest.parse().unwrap_or(1).max(1)),
            "emoji" => Input::Emoji(rest.parse().ok().filter(|n| *n > 0)),
            "help" => Input::Help,
            "quit" | "exit" => Input::Quit,
            _ => return None,
        };
        Some(input)
    }

    pub fn prefix(&self) -> &str {
        &self.command_prefix
    }
}

impl Default for InputParser {
    fn default() -> Self {
        Self::new("/")
    }
}

/// Help text for the console
pub fn help_text(prefix: &str) -> String {
    [
        ("nick <name>", "Change your display name"),
        ("clear", "Clear the server history and reload"),
        ("history", "Reload the history"),
        ("copy [n]", "Copy the n-th code block of the latest message"),
        ("emoji [n]", "Show the emoji picker or add emoji n to the draft"),
        ("quit", "Leave the chat"),
    ]
    .iter()
    .map(|(cmd, desc)| format!("  {}{} - {}", prefix, cmd, desc))
    .collect::<Vec<_>>()
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_is_empty() {
        let parser = InputParser::default();
        assert_eq!(parser.parse(""), Input::Empty);
        assert_eq!(parser.parse("   \t"), Input::Empty);
    }

    #[test]
    fn test_plain_message_is_trimmed() {
        let parser = InputParser::default();
        assert_eq!(
            parser.parse("  Hello **world** "),
            Input::Message("Hello **world**".into())
        );
    }

    #[test]
    fn test_commands() {
        let parser = InputParser::default();
        assert_eq!(parser.parse("/nick  Amy Lee "), Input::Rename("Amy Lee".into()));
        assert_eq!(parser.parse("/clear"), Input::ClearHistory);
        assert_eq!(parser.parse("/copy"), Input::Copy(1));
        assert_eq!(parser.parse("/copy 3"), Input::Copy(3));
        assert_eq!(parser.parse("/copy 0"), Input::Copy(1));
        assert_eq!(parser.parse("/emoji"), Input::Emoji(None));
        assert_eq!(parser.parse("/emoji 2"), Input::Emoji(Some(2)));
        assert_eq!(parser.parse("/quit"), Input::Quit);
    }

    #[test]
    fn test_unknown_command_is_sent_as_text() {
        let parser = InputParser::default();
        assert_eq!(parser.parse("/shrug"), Input::Message("/shrug".into()));
        assert_eq!(parser.parse("/nick"), Input::Message("/nick".into()));
        assert_eq!(
            parser.parse("/usr/bin is a path"),
            Input::Message("/usr/bin is a path".into())
        );
    }

    #[test]
    fn test_custom_prefix() {
        let parser = InputParser::new("!");
        assert_eq!(parser.parse("!help"), Input::Help);
        assert_eq!(parser.parse("/help"), Input::Message("/help".into()));
    }
}
