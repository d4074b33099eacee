//! JSON shapes exchanged with the three endpoints.

use chrono::{DateTime, NaiveDateTime, Utc};
use quorum_core::{Email, OptionId, Poll, PollId, PollOption, PollStatus, Role, User, UserId, UserVote};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

// ============================================================================
// Auth endpoint
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthAction {
    SendCode,
    VerifyCode,
}

#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    pub action: AuthAction,
    pub email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'a str>,
}

/// Both auth actions answer with this envelope.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    pub code: Option<String>,
    pub message: Option<String>,
    pub token: Option<String>,
    pub user: Option<WireUser>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireUser {
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
}

impl TryFrom<WireUser> for User {
    type Error = ClientError;

    fn try_from(wire: WireUser) -> Result<Self, Self::Error> {
        let email = Email::parse(&wire.email)
            .map_err(|e| ClientError::Network(format!("auth service sent a bad email: {e}")))?;
        let name = wire
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.local_part().to_owned());
        Ok(Self {
            id: wire.id,
            email,
            phone: wire.phone,
            name,
            role: wire.role,
        })
    }
}

// ============================================================================
// Poll endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct WirePoll {
    pub id: PollId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: PollStatus,
    #[serde(default)]
    pub options: Vec<WireOption>,
    #[serde(default)]
    pub created_by: Option<UserId>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, alias = "creator_name")]
    pub creator: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireOption {
    pub id: OptionId,
    pub option_text: String,
    #[serde(default)]
    pub votes_count: u32,
}

impl From<WirePoll> for Poll {
    fn from(wire: WirePoll) -> Self {
        Self {
            id: wire.id,
            title: wire.title,
            description: wire.description.unwrap_or_default(),
            status: wire.status,
            options: wire
                .options
                .into_iter()
                .map(|o| PollOption {
                    id: o.id,
                    text: o.option_text,
                    vote_count: o.votes_count,
                })
                .collect(),
            created_by: wire.created_by,
            created_at: wire.created_at.as_deref().and_then(parse_timestamp),
            creator_name: wire.creator,
        }
    }
}

/// Accepts RFC 3339 and the bare `YYYY-MM-DD HH:MM:SS[.f]` form databases
/// print; anything else is treated as missing.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|t| t.and_utc())
}

/// `GET ?user_id=` answer.
#[derive(Debug, Deserialize)]
pub struct VoteHistory {
    #[serde(default)]
    pub voted_polls: Vec<PollId>,
    #[serde(default)]
    pub voted_options: Vec<VotedOption>,
}

#[derive(Debug, Deserialize)]
pub struct VotedOption {
    pub poll_id: PollId,
    pub option_id: OptionId,
}

impl VoteHistory {
    /// One record per voted poll, with the option filled in where known.
    pub fn into_votes(self) -> Vec<UserVote> {
        let mut votes: Vec<UserVote> = Vec::with_capacity(self.voted_polls.len());
        for poll_id in self.voted_polls {
            if votes.iter().any(|v| v.poll_id == poll_id) {
                continue;
            }
            let option_id = self
                .voted_options
                .iter()
                .find(|v| v.poll_id == poll_id)
                .map(|v| v.option_id);
            votes.push(UserVote { poll_id, option_id });
        }
        votes
    }
}

#[derive(Debug, Serialize)]
pub struct VoteRequest {
    pub poll_id: PollId,
    pub option_id: OptionId,
    pub user_id: UserId,
}

// ============================================================================
// Admin endpoint
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatusRequest {
    pub poll_id: PollId,
    pub status: PollStatus,
}

#[derive(Debug, Serialize)]
pub struct DeleteRequest {
    pub poll_id: PollId,
}

// ============================================================================
// Shared
// ============================================================================

/// `{success, error?}` answer used by voting and admin calls.
#[derive(Debug, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub poll_id: Option<PollId>,
    pub error: Option<String>,
}

/// Body of a non-2xx answer.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}
