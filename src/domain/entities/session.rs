use std::fmt;

use rand::Rng;

/// The local user's identity for one run of the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    display_name: String,
}

impl Session {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }

    /// A throwaway name of the form `user<0-999>`
    pub fn generate() -> Self {
        let n: u32 = rand::thread_rng().gen_range(0..1000);
        Self::new(format!("user{}", n))
    }

    /// Use the configured name when there is one, otherwise generate
    pub fn resolve(configured: Option<&str>) -> Self {
        match configured.map(str::trim) {
            Some(name) if !name.is_empty() => Self::new(name),
            _ => Self::generate(),
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_me(&self, username: &str) -> bool {
        self.display_name == username
    }

    /// Switch to a new name. Returns the previous name, or `None` when the
    /// new name is blank or unchanged.
    pub fn rename(&mut self, new_name: &str) -> Option<String> {
        let new_name = new_name.trim();
        if new_name.is_empty() || new_name == self.display_name {
            return None;
        }
        Some(std::mem::replace(&mut self.display_name, new_name.to_string()))
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}
