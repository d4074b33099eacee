//! Status and role enums.

use serde::{Deserialize, Deserializer, Serialize};

/// Whether a poll still accepts votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PollStatus {
    /// Open for voting.
    #[default]
    Active,
    /// Voting closed by the owner; results are read-only.
    Closed,
}

impl PollStatus {
    /// The status an owner toggle moves the poll to.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Closed,
            Self::Closed => Self::Active,
        }
    }

    /// Returns `true` if the poll accepts votes.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Wire/display name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }
}

impl std::fmt::Display for PollStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PollStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "closed" => Ok(Self::Closed),
            _ => Err(format!("invalid poll status: {s}")),
        }
    }
}

/// User role with different permission levels.
///
/// The auth service stores ordinary accounts as `"user"`; any role other than
/// `"owner"` is treated as a member so an unexpected value never grants
/// administration rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Can browse and vote.
    #[default]
    Member,
    /// Can additionally create, close, reopen and delete polls.
    Owner,
}

impl Role {
    /// Map a role string from the wire.
    ///
    /// Same matching as [`str::parse`], but an unrecognised role becomes
    /// [`Role::Member`] instead of an error.
    #[must_use]
    pub fn from_wire(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// Returns `true` for the owner role.
    #[must_use]
    pub const fn is_owner(self) -> bool {
        matches!(self, Self::Owner)
    }

    /// Wire/display name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Owner => "owner",
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&raw))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    /// Trimmed, ASCII case-insensitive. The service calls members `user`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "member" | "user" => Ok(Self::Member),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_toggle() {
        assert_eq!(PollStatus::Active.toggled(), PollStatus::Closed);
        assert_eq!(PollStatus::Closed.toggled(), PollStatus::Active);
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&PollStatus::Closed).unwrap(),
            "\"closed\""
        );
        let parsed: PollStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(parsed, PollStatus::Active);
    }

    #[test]
    fn test_role_from_wire() {
        let owner: Role = serde_json::from_str("\"owner\"").unwrap();
        let user: Role = serde_json::from_str("\"user\"").unwrap();
        let unknown: Role = serde_json::from_str("\"superuser\"").unwrap();
        assert_eq!(owner, Role::Owner);
        assert_eq!(user, Role::Member);
        assert_eq!(unknown, Role::Member);
    }

    #[test]
    fn test_role_serializes_canonical_name() {
        assert_eq!(serde_json::to_string(&Role::Member).unwrap(), "\"member\"");
        assert_eq!("user".parse::<Role>().unwrap(), Role::Member);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_parse_and_wire_agree_on_known_values() {
        for raw in ["owner", " Owner ", "OWNER", "member", "User"] {
            assert_eq!(Role::from_wire(raw), raw.parse::<Role>().unwrap());
        }
        assert_eq!(Role::from_wire("Owner"), Role::Owner);
        assert!("superuser".parse::<Role>().is_err());
        assert_eq!(Role::from_wire("superuser"), Role::Member);
    }
}
