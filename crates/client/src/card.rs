//! Per-poll voting state machine.
//!
//! ```text
//! Idle ──select──▶ Selected ──submit──▶ Voting ──finish──▶ Idle
//!   ▲                 │                                     │
//!   └────select───────┘                    reload + sync ───┴──▶ Voted
//!
//! status == closed (at any sync) ─────────────────────────────▶ Closed
//! ```
//!
//! `Voted` and `Closed` are display-only. The card never touches vote
//! counts; it only learns about a successful vote from the next reload.

use quorum_core::{OptionId, Poll, PollId};

use crate::error::ValidationError;

/// Where a card is in the voting flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    /// Nothing chosen yet.
    Idle,
    /// An option is chosen but not submitted.
    Selected(OptionId),
    /// The vote request is in flight.
    Voting(OptionId),
    /// The user's vote is recorded.
    Voted,
    /// The poll no longer accepts votes.
    Closed,
}

/// Interactive state for one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollCard {
    poll_id: PollId,
    state: CardState,
}

impl PollCard {
    /// Card for a freshly loaded poll.
    #[must_use]
    pub fn new(poll: &Poll, voted: bool) -> Self {
        let mut card = Self {
            poll_id: poll.id,
            state: CardState::Idle,
        };
        card.sync(poll, voted);
        card
    }

    #[must_use]
    pub const fn poll_id(&self) -> PollId {
        self.poll_id
    }

    #[must_use]
    pub const fn state(&self) -> CardState {
        self.state
    }

    /// Option currently chosen or being submitted.
    #[must_use]
    pub const fn selected(&self) -> Option<OptionId> {
        match self.state {
            CardState::Selected(id) | CardState::Voting(id) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_voting(&self) -> bool {
        matches!(self.state, CardState::Voting(_))
    }

    /// Whether option buttons accept input.
    #[must_use]
    pub const fn is_selectable(&self) -> bool {
        matches!(self.state, CardState::Idle | CardState::Selected(_))
    }

    /// Reconcile with server data after a reload.
    ///
    /// Closed wins over voted. An in-flight vote is left alone. A selection
    /// whose option disappeared is dropped.
    pub fn sync(&mut self, poll: &Poll, voted: bool) {
        self.state = if !poll.is_active() {
            CardState::Closed
        } else if voted {
            CardState::Voted
        } else {
            match self.state {
                CardState::Voting(id) => CardState::Voting(id),
                CardState::Selected(id) if poll.option(id).is_some() => CardState::Selected(id),
                _ => CardState::Idle,
            }
        };
    }

    /// Choose an option.
    ///
    /// # Errors
    ///
    /// `NotSelectable` unless the card is idle or already has a selection;
    /// `UnknownOption` if the option is not part of the poll.
    pub fn select(&mut self, poll: &Poll, option: OptionId) -> Result<(), ValidationError> {
        if !self.is_selectable() || !poll.is_active() {
            return Err(ValidationError::NotSelectable);
        }
        if poll.option(option).is_none() {
            return Err(ValidationError::UnknownOption(option.as_i32()));
        }
        self.state = CardState::Selected(option);
        Ok(())
    }

    /// Move to `Voting` and return the option to send.
    ///
    /// # Errors
    ///
    /// `NoOptionSelected` from `Idle`; `NotSelectable` if the card is voting,
    /// voted or closed.
    pub fn begin_submit(&mut self) -> Result<OptionId, ValidationError> {
        match self.state {
            CardState::Selected(id) => {
                self.state = CardState::Voting(id);
                Ok(id)
            }
            CardState::Idle => Err(ValidationError::NoOptionSelected),
            CardState::Voting(_) | CardState::Voted | CardState::Closed => {
                Err(ValidationError::NotSelectable)
            }
        }
    }

    /// The vote request settled. Success or failure, the selection is cleared;
    /// the following reload decides whether the card becomes `Voted`.
    pub fn finish(&mut self) {
        if self.is_voting() {
            self.state = CardState::Idle;
        }
    }

    /// Status badge text.
    #[must_use]
    pub const fn badge(&self) -> &'static str {
        match self.state {
            CardState::Closed => "Voting closed",
            CardState::Voted => "You voted",
            _ => "Active",
        }
    }
}

/// Share of `count` in `total` as a percentage rounded to one decimal.
///
/// Zero when nobody has voted.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage(count: u32, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = f64::from(count) * 100.0 / total as f64;
    (raw * 10.0).round() / 10.0
}

/// Per-option percentages for a poll, in option order.
#[must_use]
pub fn percentages(poll: &Poll) -> Vec<f64> {
    let total = poll.total_votes();
    poll.options
        .iter()
        .map(|o| percentage(o.vote_count, total))
        .collect()
}
