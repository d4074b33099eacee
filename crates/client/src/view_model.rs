//! Derived poll list and statistics.
//!
//! Everything here is a pure function of its inputs and is recomputed on
//! every call; nothing is cached between renders.

use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions, Strength};
use quorum_core::{Poll, PollId, PollStatus, User, UserVote};
use tracing::warn;

/// Which polls to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollFilter {
    #[default]
    All,
    Active,
    Closed,
    /// Polls the signed-in user voted on. Empty when signed out.
    MyVotes,
}

impl PollFilter {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Closed => "closed",
            Self::MyVotes => "my_votes",
        }
    }

    fn keeps(self, poll: &Poll, votes: &[UserVote], signed_in: bool) -> bool {
        match self {
            Self::All => true,
            Self::Active => poll.status == PollStatus::Active,
            Self::Closed => poll.status == PollStatus::Closed,
            Self::MyVotes => signed_in && has_voted(votes, poll.id),
        }
    }
}

/// List ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Newest first; polls without a timestamp sort as the epoch.
    #[default]
    New,
    /// Most votes first.
    Popular,
    /// Title, A to Z, locale-aware and ignoring case.
    Alphabetical,
}

impl SortBy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Popular => "popular",
            Self::Alphabetical => "alphabetical",
        }
    }

    fn compare(self, a: &Poll, b: &Poll, titles: &TitleCollator) -> Ordering {
        match self {
            Self::New => newest_first(a, b),
            Self::Popular => b.total_votes().cmp(&a.total_votes()),
            Self::Alphabetical => titles.compare(&a.title, &b.title),
        }
    }
}

fn newest_first(a: &Poll, b: &Poll) -> Ordering {
    b.created_at_millis().cmp(&a.created_at_millis())
}

/// Locale-aware title ordering using the Unicode root collation.
///
/// Case differences are ignored at the collation level; ties fall back to
/// the raw title so the order is total.
struct TitleCollator(Option<Collator>);

impl TitleCollator {
    fn new() -> Self {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Secondary);
        match Collator::try_new(&Default::default(), options) {
            Ok(collator) => Self(Some(collator)),
            Err(e) => {
                warn!(error = %e, "Collation data unavailable, sorting titles by code point");
                Self(None)
            }
        }
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        let primary = match &self.0 {
            Some(collator) => collator.compare(a, b),
            None => a.to_lowercase().cmp(&b.to_lowercase()),
        };
        primary.then_with(|| a.cmp(b))
    }
}

/// Search, filter and sort settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollQuery {
    pub search: String,
    pub filter: PollFilter,
    pub sort: SortBy,
}

impl PollQuery {
    fn matches_search(&self, poll: &Poll) -> bool {
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || poll.title.to_lowercase().contains(&needle)
            || poll.description.to_lowercase().contains(&needle)
    }
}

/// Aggregate numbers shown above the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub total_polls: usize,
    pub active_polls: usize,
    pub total_votes: u64,
    pub my_votes: usize,
}

/// Output of [`derive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollListView<'a> {
    pub polls: Vec<&'a Poll>,
    pub stats: PollStats,
}

/// Returns `true` if `votes` records a vote on `poll`.
#[must_use]
pub fn has_voted(votes: &[UserVote], poll: PollId) -> bool {
    votes.iter().any(|v| v.poll_id == poll)
}

/// Statistics over the unfiltered poll set.
#[must_use]
pub fn stats(polls: &[Poll], votes: &[UserVote]) -> PollStats {
    PollStats {
        total_polls: polls.len(),
        active_polls: polls.iter().filter(|p| p.is_active()).count(),
        total_votes: polls.iter().map(Poll::total_votes).sum(),
        my_votes: votes.len(),
    }
}

/// Filter and sort `polls` for display.
#[must_use]
pub fn derive<'a>(
    polls: &'a [Poll],
    votes: &[UserVote],
    query: &PollQuery,
    user: Option<&User>,
) -> PollListView<'a> {
    let signed_in = user.is_some();
    let mut visible: Vec<&Poll> = polls
        .iter()
        .filter(|p| query.matches_search(p) && query.filter.keeps(p, votes, signed_in))
        .collect();
    let titles = TitleCollator::new();
    visible.sort_by(|a, b| query.sort.compare(a, b, &titles));

    PollListView {
        polls: visible,
        stats: stats(polls, votes),
    }
}

/// The `limit` newest polls, for the home tab.
#[must_use]
pub fn recent(polls: &[Poll], limit: usize) -> Vec<&Poll> {
    let mut newest: Vec<&Poll> = polls.iter().collect();
    newest.sort_by(|a, b| newest_first(a, b));
    newest.truncate(limit);
    newest
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use quorum_core::{Email, OptionId, PollOption, Role, UserId};

    use super::*;

    fn poll(id: i32, title: &str, status: PollStatus, counts: &[u32], ts: Option<i64>) -> Poll {
        Poll {
            id: PollId::new(id),
            title: title.to_string(),
            description: format!("About {title}"),
            status,
            options: counts
                .iter()
                .zip(1..)
                .map(|(&vote_count, n)| PollOption {
                    id: OptionId::new(id * 10 + n),
                    text: format!("Option {n}"),
                    vote_count,
                })
                .collect(),
            created_by: Some(UserId::new(1)),
            created_at: ts.map(|s| Utc.timestamp_opt(s, 0).unwrap()),
            creator_name: None,
        }
    }

    fn fixture() -> Vec<Poll> {
        vec![
            poll(1, "favourite language", PollStatus::Active, &[45, 38, 52, 23], Some(100)),
            poll(2, "Meeting time", PollStatus::Closed, &[28, 42, 19], Some(300)),
            poll(3, "Roadmap features", PollStatus::Active, &[31, 47, 25, 18], None),
            poll(4, "apples or oranges", PollStatus::Closed, &[], Some(200)),
        ]
    }

    fn voter() -> User {
        User {
            id: UserId::new(7),
            email: Email::parse("voter@example.com").unwrap(),
            phone: None,
            name: "Voter".to_string(),
            role: Role::Member,
        }
    }

    fn ids(view: &PollListView<'_>) -> Vec<i32> {
        view.polls.iter().map(|p| p.id.as_i32()).collect()
    }

    fn query(filter: PollFilter, sort: SortBy) -> PollQuery {
        PollQuery {
            search: String::new(),
            filter,
            sort,
        }
    }

    #[test]
    fn test_active_and_closed_partition_all() {
        let polls = fixture();
        let active = derive(&polls, &[], &query(PollFilter::Active, SortBy::New), None);
        let closed = derive(&polls, &[], &query(PollFilter::Closed, SortBy::New), None);

        let mut union: Vec<i32> = ids(&active).into_iter().chain(ids(&closed)).collect();
        union.sort_unstable();
        assert_eq!(union, vec![1, 2, 3, 4]);
        assert!(ids(&active).iter().all(|id| !ids(&closed).contains(id)));
    }

    #[test]
    fn test_sort_new_treats_missing_timestamp_as_oldest() {
        let polls = fixture();
        let view = derive(&polls, &[], &PollQuery::default(), None);
        assert_eq!(ids(&view), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_sort_popular() {
        let polls = fixture();
        let view = derive(&polls, &[], &query(PollFilter::All, SortBy::Popular), None);
        assert_eq!(ids(&view), vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_sort_alphabetical_ignores_case_and_is_idempotent() {
        let polls = fixture();
        let q = query(PollFilter::All, SortBy::Alphabetical);
        let first = derive(&polls, &[], &q, None);
        assert_eq!(ids(&first), vec![4, 1, 2, 3]);

        let resorted: Vec<Poll> = first.polls.iter().map(|p| (*p).clone()).collect();
        let second = derive(&resorted, &[], &q, None);
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_sort_alphabetical_collates_accents_and_cyrillic() {
        let polls = vec![
            poll(1, "Zebra", PollStatus::Active, &[], None),
            poll(2, "Éclair", PollStatus::Active, &[], None),
            poll(3, "жук", PollStatus::Active, &[], None),
            poll(4, "ёж", PollStatus::Active, &[], None),
            poll(5, "eclair", PollStatus::Active, &[], None),
        ];
        let view = derive(&polls, &[], &query(PollFilter::All, SortBy::Alphabetical), None);
        let titles: Vec<&str> = view.polls.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["eclair", "Éclair", "Zebra", "ёж", "жук"]);
    }

    #[test]
    fn test_search_matches_title_or_description() {
        let polls = fixture();
        let mut q = PollQuery::default();
        q.search = "MEETING".to_string();
        assert_eq!(ids(&derive(&polls, &[], &q, None)), vec![2]);

        q.search = "about roadmap".to_string();
        assert_eq!(ids(&derive(&polls, &[], &q, None)), vec![3]);
    }

    #[test]
    fn test_my_votes_requires_user() {
        let polls = fixture();
        let votes = vec![UserVote::on_poll(PollId::new(3))];
        let q = query(PollFilter::MyVotes, SortBy::New);

        assert!(derive(&polls, &votes, &q, None).polls.is_empty());
        assert_eq!(ids(&derive(&polls, &votes, &q, Some(&voter()))), vec![3]);
    }

    #[test]
    fn test_stats_cover_unfiltered_set() {
        let polls = fixture();
        let votes = vec![UserVote::on_poll(PollId::new(1))];
        let view = derive(&polls, &votes, &query(PollFilter::Closed, SortBy::New), None);
        assert_eq!(
            view.stats,
            PollStats {
                total_polls: 4,
                active_polls: 2,
                total_votes: 158 + 89 + 121,
                my_votes: 1,
            }
        );
    }

    #[test]
    fn test_recent() {
        let polls = fixture();
        let newest: Vec<i32> = recent(&polls, 2).iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(newest, vec![2, 4]);
    }
}
