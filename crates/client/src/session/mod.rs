//! Persisted session: the signed-in user record and its opaque auth token.
//!
//! The store is an explicit object handed to the page controller at
//! construction. It is read once at mount and written only by login and
//! logout.
//!
//! # Keys
//!
//! Both keys are written together on login and removed together on logout
//! or when the stored record cannot be read back.

mod file;
mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use quorum_core::User;
use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, warn};

/// Session storage keys.
pub mod keys {
    /// Key for the serialized signed-in user.
    pub const USER: &str = "user";

    /// Key for the opaque auth token.
    pub const AUTH_TOKEN: &str = "auth_token";

    /// Every key the session owns, in the order they are cleared.
    pub const ALL: [&str; 2] = [USER, AUTH_TOKEN];
}

/// Errors raised by session storage.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading or writing the backing store failed.
    #[error("session storage I/O failed for '{key}': {source}")]
    Io {
        /// Session key being accessed.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The stored user record could not be encoded.
    #[error("could not encode session user: {0}")]
    Encode(#[from] serde_json::Error),

    /// Injected failure from the in-memory backend.
    #[error("session storage rejected write to '{0}'")]
    Rejected(String),
}

/// Key/value persistence behind the session store.
pub trait SessionBackend {
    /// Read a key; `Ok(None)` if it is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Write a key, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Remove a key. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be modified.
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// A restored session.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: SecretString,
}

/// Scoped load/save/clear of the persisted session.
#[derive(Debug, Clone)]
pub struct SessionStore<B> {
    backend: B,
}

impl<B: SessionBackend> SessionStore<B> {
    /// Wrap a backend.
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Access the backend (used by tests to inspect stored keys).
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Restore the persisted session.
    ///
    /// Returns `None` when nothing is stored. An unreadable, unparsable or
    /// half-written record clears every session key and also yields `None`;
    /// this never fails outward.
    pub fn load(&self) -> Option<Session> {
        let user_raw = match self.backend.read(keys::USER) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to read stored session user");
                self.discard();
                return None;
            }
        };
        let token = match self.backend.read(keys::AUTH_TOKEN) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read stored session token");
                self.discard();
                return None;
            }
        };

        match (user_raw, token) {
            (None, None) => None,
            (Some(raw), Some(token)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => {
                    debug!(user_id = %user.id, "Restored session");
                    Some(Session {
                        user,
                        token: SecretString::from(token),
                    })
                }
                Err(e) => {
                    warn!(error = %e, "Stored session user is corrupt, clearing session");
                    self.discard();
                    None
                }
            },
            _ => {
                warn!("Stored session is incomplete, clearing session");
                self.discard();
                None
            }
        }
    }

    /// Persist a user and token together.
    ///
    /// If the second write fails the first is rolled back, so callers never
    /// observe one key without the other.
    ///
    /// # Errors
    ///
    /// Returns an error if either key cannot be written.
    pub fn save(&self, user: &User, token: &SecretString) -> Result<(), SessionError> {
        use secrecy::ExposeSecret;

        let encoded = serde_json::to_string(user)?;
        self.backend.write(keys::AUTH_TOKEN, token.expose_secret())?;
        if let Err(e) = self.backend.write(keys::USER, &encoded) {
            if let Err(rollback) = self.backend.remove(keys::AUTH_TOKEN) {
                warn!(error = %rollback, "Failed to roll back session token");
            }
            return Err(e);
        }
        debug!(user_id = %user.id, "Session saved");
        Ok(())
    }

    /// Remove both session keys.
    ///
    /// Every key is attempted even if an earlier removal fails.
    ///
    /// # Errors
    ///
    /// Returns the first removal error.
    pub fn clear(&self) -> Result<(), SessionError> {
        let mut first_error = None;
        for key in keys::ALL {
            if let Err(e) = self.backend.remove(key) {
                warn!(error = %e, key, "Failed to remove session key");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn discard(&self) {
        // Already logged per key inside `clear`.
        let _ = self.clear();
    }
}
