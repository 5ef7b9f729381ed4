//! Banner shown above the console views.

use std::time::{Duration, Instant};

/// At most one message is visible at a time; showing a new one replaces the
/// previous banner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Notification {
    #[default]
    None,
    Info {
        message: String,
        /// Auto-dismiss deadline; `None` stays until replaced or dismissed
        expires_at: Option<Instant>,
    },
    Error {
        message: String,
    },
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Notification::Info {
            message: message.into(),
            expires_at: None,
        }
    }

    /// Info banner dismissed after `timeout`. A deadline past what `Instant`
    /// can represent never expires.
    pub fn timed_info(message: impl Into<String>, timeout: Duration, now: Instant) -> Self {
        Notification::Info {
            message: message.into(),
            expires_at: now.checked_add(timeout),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification::Error {
            message: message.into(),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Notification::None => None,
            Notification::Info { message, .. } | Notification::Error { message } => Some(message),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notification::Error { .. })
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        match self {
            Notification::None => false,
            Notification::Info {
                expires_at: Some(deadline),
                ..
            } => now < *deadline,
            _ => true,
        }
    }

    /// Drop a timed message whose deadline has passed
    pub fn clear_expired(&mut self, now: Instant) {
        if !self.is_visible_at(now) {
            *self = Notification::None;
        }
    }

    pub fn dismiss(&mut self) {
        *self = Notification::None;
    }
}
