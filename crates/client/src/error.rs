//! Unified error handling for the client.
//!
//! Every controller action catches these at its boundary and turns them into
//! a [`crate::notice::Notice`]; none of them is fatal to the page.

use quorum_core::{CodeError, EmailError};
use thiserror::Error;

use crate::session::SessionError;

/// User-facing text for transport failures.
pub const CONNECTION_PROBLEM: &str = "Connection problem. Please try again.";

/// Bad local input. Blocks the request; nothing is sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Email failed to parse.
    #[error("Enter a valid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Verification code is not six digits.
    #[error("Enter the 6-digit code: {0}")]
    InvalidCode(#[from] CodeError),

    /// A code was submitted before one was requested.
    #[error("Request a code first")]
    CodeNotRequested,

    /// Poll title is blank.
    #[error("Enter a poll title")]
    EmptyTitle,

    /// Fewer than the minimum number of non-blank options.
    #[error("Add at least {min} answer options (got {got})")]
    TooFewOptions {
        /// Minimum number of options.
        min: usize,
        /// Non-blank options supplied.
        got: usize,
    },

    /// Vote submitted with no option chosen.
    #[error("Choose an option before voting")]
    NoOptionSelected,

    /// The option is not part of the poll.
    #[error("Option {0} is not part of this poll")]
    UnknownOption(i32),

    /// Selection attempted on a poll that is closed or already voted on.
    #[error("This poll is not accepting your vote")]
    NotSelectable,

    /// Action requires a signed-in user.
    #[error("Sign in to continue")]
    NotSignedIn,
}

/// Application-level error type for the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Local validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The auth endpoint rejected the request (wrong or expired code, ...).
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// An endpoint answered `success: false`.
    #[error("Server error: {0}")]
    Server(String),

    /// Client-side role check failed. Advisory only; the server decides.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Transport or decoding failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Persisting the session failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// The referenced poll is not in the current list.
    #[error("Poll {0} not found")]
    PollNotFound(i32),
}

impl ClientError {
    /// Text suitable for a transient notification.
    ///
    /// Network failures collapse to [`CONNECTION_PROBLEM`]; server-supplied
    /// messages are shown as-is.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Auth(msg) | Self::Server(msg) | Self::Forbidden(msg) => msg.clone(),
            Self::Network(_) => CONNECTION_PROBLEM.to_string(),
            Self::Session(e) => format!("Could not save your session: {e}"),
            Self::PollNotFound(id) => format!("Poll {id} no longer exists"),
        }
    }

    /// Returns `true` if the request was blocked before reaching the network.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}
