//! Typing indicators - inbound expiry and outbound throttling

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// How long an indicator stays up after the sender's last keystroke
pub const TYPING_TIMEOUT: Duration = Duration::from_secs(3);

/// Minimum gap between two outbound typing notifications
pub const TYPING_THROTTLE: Duration = Duration::from_secs(1);

/// Tracks who is typing right now
pub struct TypingTracker {
    last_seen: HashMap<String, Instant>,
    timeout: Duration,
}

impl TypingTracker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            last_seen: HashMap::new(),
            timeout,
        }
    }

    /// Record a typing event. Returns `true` when a new indicator should be
    /// shown; a repeat from the same sender only restarts its timer. The
    /// local user's own echo is ignored.
    pub fn observe(&mut self, sender: &str, own_name: &str, now: Instant) -> bool {
        if sender == own_name {
            return false;
        }
        self.last_seen.insert(sender.to_string(), now).is_none()
    }

    /// A message from the sender supersedes their indicator
    pub fn clear(&mut self, sender: &str) -> bool {
        self.last_seen.remove(sender).is_some()
    }

    /// Drop indicators whose timer ran out and return their senders, sorted
    pub fn expire(&mut self, now: Instant) -> Vec<String> {
        let timeout = self.timeout;
        let mut expired: Vec<String> = self
            .last_seen
            .iter()
            .filter(|(_, t)| now.duration_since(**t) >= timeout)
            .map(|(name, _)| name.clone())
            .collect();
        for name in &expired {
            self.last_seen.remove(name);
        }
        expired.sort();
        expired
    }

    /// Senders with a live indicator, sorted
    pub fn active(&self) -> Vec<String> {
        let mut names: Vec<String> = self.last_seen.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for TypingTracker {
    fn default() -> Self {
        Self::new(TYPING_TIMEOUT)
    }
}

/// Limits outbound typing notifications to one per window
pub struct TypingThrottle {
    window: Duration,
    last_sent: Option<Instant>,
}

impl TypingThrottle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_sent: None,
        }
    }

    /// Whether a notification may go out now; records it if so
    pub fn should_emit(&mut self, now: Instant) -> bool {
        match self.last_sent {
            Some(t) if now.duration_since(t) < self.window => false,
            _ => {
                self.last_sent = Some(now);
                true
            }
        }
    }
}

impl Default for TypingThrottle {
    fn default() -> Self {
        Self::new(TYPING_THROTTLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_expires_after_timeout() {
        let start = Instant::now();
        let mut tracker = TypingTracker::default();

        assert!(tracker.observe("amy", "me", start));
        assert!(tracker.expire(start + Duration::from_millis(2999)).is_empty());
        assert_eq!(tracker.expire(start + TYPING_TIMEOUT), vec!["amy".to_string()]);
        assert!(tracker.active().is_empty());
    }

    #[test]
    fn test_repeat_event_restarts_timer() {
        let start = Instant::now();
        let mut tracker = TypingTracker::default();

        assert!(tracker.observe("amy", "me", start));
        assert!(!tracker.observe("amy", "me", start + Duration::from_secs(2)));
        assert!(tracker.expire(start + Duration::from_secs(4)).is_empty());
        assert_eq!(tracker.expire(start + Duration::from_secs(5)), vec!["amy".to_string()]);
    }

    #[test]
    fn test_own_echo_is_ignored() {
        let mut tracker = TypingTracker::default();
        assert!(!tracker.observe("me", "me", Instant::now()));
        assert!(tracker.active().is_empty());
    }

    #[test]
    fn test_senders_expire_independently() {
        let start = Instant::now();
        let mut tracker = TypingTracker::default();
        tracker.observe("bob", "me", start);
        tracker.observe("amy", "me", start + Duration::from_secs(2));
        assert_eq!(tracker.active(), vec!["amy".to_string(), "bob".to_string()]);
        assert_eq!(tracker.expire(start + Duration::from_secs(3)), vec!["bob".to_string()]);
        assert!(tracker.clear("amy"));
        assert!(!tracker.clear("amy"));
    }

    #[test]
    fn test_throttle_window() {
        let start = Instant::now();
        let mut throttle = TypingThrottle::default();
        assert!(throttle.should_emit(start));
        assert!(!throttle.should_emit(start + Duration::from_millis(999)));
        assert!(throttle.should_emit(start + TYPING_THROTTLE));
    }
}
