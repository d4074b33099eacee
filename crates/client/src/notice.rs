//! Transient notifications produced at the controller's action boundary.

use std::fmt;

use crate::error::ClientError;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A toast-style message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Error notice for a failed action.
    #[must_use]
    pub fn from_error(title: impl Into<String>, err: &ClientError) -> Self {
        Self::error(title, err.user_message())
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.level, NoticeLevel::Error)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        if self.message.is_empty() {
            write!(f, "[{tag}] {}", self.title)
        } else {
            write!(f, "[{tag}] {}: {}", self.title, self.message)
        }
    }
}
