//! The signed-in user.

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::UserId;
use super::status::Role;

/// A user as issued by the auth service on successful code verification.
///
/// Persisted client-side until logout. The role is never changed by the
/// client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<String>,
    pub name: String,
    pub role: Role,
}

impl User {
    /// Returns `true` if the user may administer polls.
    #[must_use]
    pub const fn is_owner(&self) -> bool {
        self.role.is_owner()
    }

    /// Name to show, falling back to the email's local part.
    #[must_use]
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            self.email.local_part()
        } else {
            name
        }
    }

    /// Upper-cased first letter of the display name, for avatars.
    #[must_use]
    pub fn initial(&self) -> char {
        self.display_name()
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('?')
    }
}
