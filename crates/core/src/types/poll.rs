//! Polls, their options, and the current user's vote records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{OptionId, PollId, UserId};
use super::status::PollStatus;

/// One answer a voter can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: OptionId,
    pub text: String,
    /// Server-confirmed count; never incremented locally.
    pub vote_count: u32,
}

/// A poll as last fetched from the poll service.
///
/// The client only ever holds a read-only copy for one fetch cycle; every
/// mutation goes through the service and is followed by a full reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub title: String,
    pub description: String,
    pub status: PollStatus,
    /// Options in display order.
    pub options: Vec<PollOption>,
    pub created_by: Option<UserId>,
    pub created_at: Option<DateTime<Utc>>,
    pub creator_name: Option<String>,
}

impl Poll {
    /// Total votes, derived from the options on every call.
    #[must_use]
    pub fn total_votes(&self) -> u64 {
        self.options.iter().map(|o| u64::from(o.vote_count)).sum()
    }

    /// Returns `true` if the poll accepts votes.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Look up an option by id.
    #[must_use]
    pub fn option(&self, id: OptionId) -> Option<&PollOption> {
        self.options.iter().find(|o| o.id == id)
    }

    /// Creation time in milliseconds since the epoch; missing timestamps sort as 0.
    #[must_use]
    pub fn created_at_millis(&self) -> i64 {
        self.created_at.map_or(0, |t| t.timestamp_millis())
    }
}

/// Records that the current user has voted on a poll.
///
/// The poll service reports only the ids of polls the user voted on, so
/// `option_id` is `None` unless the service also reports the chosen option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserVote {
    pub poll_id: PollId,
    pub option_id: Option<OptionId>,
}

impl UserVote {
    /// A vote record where the chosen option is unknown.
    #[must_use]
    pub const fn on_poll(poll_id: PollId) -> Self {
        Self {
            poll_id,
            option_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll(counts: &[u32]) -> Poll {
        Poll {
            id: PollId::new(1),
            title: "Favourite language?".to_string(),
            description: String::new(),
            status: PollStatus::Active,
            options: counts
                .iter()
                .zip(1..)
                .map(|(&vote_count, id)| PollOption {
                    id: OptionId::new(id),
                    text: format!("Option {id}"),
                    vote_count,
                })
                .collect(),
            created_by: None,
            created_at: None,
            creator_name: None,
        }
    }

    #[test]
    fn test_total_votes_is_sum_of_options() {
        assert_eq!(poll(&[45, 38, 52, 23]).total_votes(), 158);
        assert_eq!(poll(&[]).total_votes(), 0);
    }

    #[test]
    fn test_total_votes_does_not_overflow_u32() {
        assert_eq!(poll(&[u32::MAX, 1]).total_votes(), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_option_lookup() {
        let p = poll(&[1, 2]);
        assert_eq!(p.option(OptionId::new(2)).map(|o| o.vote_count), Some(2));
        assert!(p.option(OptionId::new(9)).is_none());
    }

    #[test]
    fn test_missing_created_at_is_epoch() {
        assert_eq!(poll(&[]).created_at_millis(), 0);
    }
}
