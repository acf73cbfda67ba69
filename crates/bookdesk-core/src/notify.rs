//! Transient notifications for mutation outcomes.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a toast stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(4);

/// Oldest toasts are dropped beyond this many.
const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub severity: Severity,
    pub message: String,
    pub expires_at: Instant,
}

impl Toast {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Default)]
pub struct Notifications {
    toasts: VecDeque<Toast>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>, now: Instant) {
        if self.toasts.len() >= MAX_TOASTS {
            self.toasts.pop_front();
        }
        self.toasts.push_back(Toast {
            severity,
            message: message.into(),
            expires_at: now + TOAST_TTL,
        });
    }

    pub fn success(&mut self, message: impl Into<String>, now: Instant) {
        self.push(Severity::Success, message, now);
    }

    pub fn error(&mut self, message: impl Into<String>, now: Instant) {
        self.push(Severity::Error, message, now);
    }

    /// Drop expired toasts.
    pub fn prune(&mut self, now: Instant) {
        self.toasts.retain(|t| !t.is_expired(now));
    }

    /// Most recent toast still on screen.
    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire() {
        let now = Instant::now();
        let mut n = Notifications::new();
        n.success("saved", now);
        n.error("failed", now + Duration::from_secs(2));
        assert_eq!(n.latest().map(|t| t.severity), Some(Severity::Error));

        n.prune(now + TOAST_TTL);
        assert_eq!(n.len(), 1);
        assert_eq!(n.latest().map(|t| t.message.as_str()), Some("failed"));

        n.prune(now + Duration::from_secs(10));
        assert!(n.is_empty());
    }

    #[test]
    fn test_oldest_dropped_when_full() {
        let now = Instant::now();
        let mut n = Notifications::new();
        for i in 0..7 {
            n.success(format!("t{}", i), now);
        }
        assert_eq!(n.len(), MAX_TOASTS);
        assert_eq!(n.iter().next().map(|t| t.message.as_str()), Some("t2"));
    }
}
