use std::time::{Duration, Instant};

use serde::Serialize;

/// How long a notification stays on screen.
pub const DEFAULT_NOTIFICATION_MS: u64 = 1200;

/// A transient, non-blocking message shown by every rendering surface.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub message: String,
    pub duration_ms: u64,
    #[serde(skip)]
    issued_at: Instant,
}

impl Notification {
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_duration(message, DEFAULT_NOTIFICATION_MS)
    }

    pub fn with_duration(message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            message: message.into(),
            duration_ms,
            issued_at: Instant::now(),
        }
    }

    pub fn expires_at(&self) -> Instant {
        self.issued_at + Duration::from_millis(self.duration_ms)
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}

impl PartialEq for Notification {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message && self.duration_ms == other.duration_ms
    }
}

impl Eq for Notification {}
