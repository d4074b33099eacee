//! Plain-text rendering of controller state.
//!
//! Every function returns a `String` so output can be asserted in tests;
//! the commands decide where it goes.

use std::fmt::Write as _;

use quorum_client::card::{self, CardState, PollCard};
use quorum_client::controller::Tab;
use quorum_client::layout::{Column, ListConfig, ListLayout};
use quorum_client::view_model::PollStats;
use quorum_client::Notice;
use quorum_core::{Poll, User};

const BAR_WIDTH: usize = 20;

/// A poll together with its card, as shown in a list.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub poll: &'a Poll,
    pub card: Option<&'a PollCard>,
}

impl Row<'_> {
    fn badge(&self) -> &'static str {
        match self.card {
            Some(card) => card.badge(),
            None if self.poll.is_active() => "Active",
            None => "Voting closed",
        }
    }

    fn cell(&self, column: Column) -> String {
        match column {
            Column::Title => self.poll.title.clone(),
            Column::Status => self.badge().to_string(),
            Column::Options => self.poll.options.len().to_string(),
            Column::Votes => self.poll.total_votes().to_string(),
            Column::Creator => self.poll.creator_name.clone().unwrap_or_default(),
            Column::Created => self
                .poll
                .created_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Render a poll list in the configured layout.
#[must_use]
pub fn list(rows: &[Row<'_>], config: &ListConfig) -> String {
    if rows.is_empty() {
        return format!("{}\n", config.empty_message);
    }
    match config.layout {
        ListLayout::Compact => compact(rows),
        ListLayout::Cards => {
            let mut out = String::new();
            for row in rows {
                out.push_str(&poll_card(*row, config));
                out.push('\n');
            }
            out
        }
        ListLayout::Table => table(rows, config),
    }
}

fn compact(rows: &[Row<'_>]) -> String {
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "#{:<4} {}  [{}]  {} votes",
            row.poll.id,
            row.poll.title,
            row.badge(),
            row.poll.total_votes()
        );
    }
    out
}

fn table(rows: &[Row<'_>], config: &ListConfig) -> String {
    let mut header: Vec<String> = vec!["ID".to_string()];
    header.extend(config.columns.iter().map(|c| c.label().to_string()));

    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.poll.id.to_string()];
            cells.extend(config.columns.iter().map(|c| row.cell(*c)));
            cells
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            std::iter::once(&header)
                .chain(body.iter())
                .filter_map(|cells| cells.get(i))
                .map(|c| c.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for cells in std::iter::once(&header).chain(body.iter()) {
        let line: Vec<String> = cells
            .iter()
            .zip(widths.iter().copied())
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }
    if !config.row_actions.is_empty() {
        let actions: Vec<&str> = config.row_actions.iter().map(|a| a.label).collect();
        let _ = writeln!(out, "\nActions: {}", actions.join(", "));
    }
    out
}

/// One poll with per-option results.
#[must_use]
pub fn poll_card(row: Row<'_>, config: &ListConfig) -> String {
    let poll = row.poll;
    let mut out = String::new();
    let _ = writeln!(out, "#{} {}  [{}]", poll.id, poll.title, row.badge());
    if !poll.description.is_empty() {
        let _ = writeln!(out, "    {}", poll.description);
    }
    if let Some(creator) = &poll.creator_name {
        let _ = writeln!(out, "    by {creator}");
    }

    let total = poll.total_votes();
    let selected = row.card.and_then(PollCard::selected);
    for option in &poll.options {
        let pct = card::percentage(option.vote_count, total);
        let marker = if selected == Some(option.id) { '>' } else { ' ' };
        let _ = writeln!(
            out,
            "  {marker} ({}) {:<24} {:>5} votes {:>5.1}% {}",
            option.id,
            option.text,
            option.vote_count,
            pct,
            bar(pct)
        );
    }
    let _ = writeln!(out, "    Total votes: {total}");

    if let Some(card) = row.card {
        match card.state() {
            CardState::Voting(_) => {
                let _ = writeln!(out, "    Submitting vote...");
            }
            CardState::Voted => {
                let _ = writeln!(out, "    You voted in this poll");
            }
            CardState::Closed => {
                let _ = writeln!(out, "    Voting closed");
            }
            CardState::Idle | CardState::Selected(_) => {}
        }
    }
    if !config.row_actions.is_empty() {
        let toggle = if poll.is_active() { "close" } else { "reopen" };
        let _ = writeln!(out, "    Owner: {toggle} | delete");
    }
    out
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn bar(pct: f64) -> String {
    let filled = ((pct / 100.0) * BAR_WIDTH as f64).round().clamp(0.0, BAR_WIDTH as f64) as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// Aggregate statistics block.
#[must_use]
pub fn stats(stats: &PollStats, signed_in: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Polls:        {}", stats.total_polls);
    let _ = writeln!(out, "Active:       {}", stats.active_polls);
    let _ = writeln!(out, "Total votes:  {}", stats.total_votes);
    if signed_in {
        let _ = writeln!(out, "Your votes:   {}", stats.my_votes);
    }
    out
}

/// Tab bar, marking the current tab.
#[must_use]
pub fn tabs(visible: &[Tab], current: Tab) -> String {
    let labels: Vec<String> = visible
        .iter()
        .map(|t| {
            if *t == current {
                format!("[{t}]")
            } else {
                t.to_string()
            }
        })
        .collect();
    format!("{}\n", labels.join(" | "))
}

/// Profile tab for the signed-in user.
#[must_use]
pub fn profile(user: &User, stats: &PollStats, visible: &[Tab]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "({}) {}", user.initial(), user.display_name());
    let _ = writeln!(out, "Email:  {}", user.email);
    if let Some(phone) = &user.phone {
        let _ = writeln!(out, "Phone:  {phone}");
    }
    let role = if user.is_owner() { "Owner" } else { "Member" };
    let _ = writeln!(out, "Role:   {role}");
    let _ = writeln!(out, "Voted in {} of {} polls", stats.my_votes, stats.total_polls);
    let labels: Vec<&str> = visible.iter().map(|t| t.label()).collect();
    let _ = writeln!(out, "Tabs:   {}", labels.join(", "));
    out
}

/// One line per notice.
#[must_use]
pub fn notices(notices: &[Notice]) -> String {
    notices.iter().fold(String::new(), |mut out, n| {
        let _ = writeln!(out, "{n}");
        out
    })
}
