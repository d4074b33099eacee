//! Browsing and voting.

use std::io::Write;

use quorum_client::controller::Tab;
use quorum_client::layout::ListLayout;
use quorum_client::view_model::{PollFilter, PollQuery};
use quorum_core::{OptionId, PollId};

use super::{CommandError, Page, flush_notices};
use crate::render::{self, Row};

/// Print the poll list for `query` in `layout`.
pub fn list(
    page: &mut Page,
    out: &mut impl Write,
    query: PollQuery,
    layout: ListLayout,
) -> Result<(), CommandError> {
    let tab = if query.filter == PollFilter::MyVotes {
        Tab::MyVotes
    } else {
        Tab::Polls
    };
    page.set_search(query.search);
    page.set_filter(query.filter);
    page.set_sort(query.sort);
    page.set_tab(tab);

    let config = layout.config(page.user().is_some_and(|u| u.is_owner()));
    let view = page.view();

    let mut text = render::tabs(&page.visible_tabs(), page.tab());
    if config.show_stats {
        text.push_str(&render::stats(&view.stats, page.user().is_some()));
    }
    text.push('\n');
    let rows: Vec<Row<'_>> = view
        .polls
        .iter()
        .map(|poll| Row {
            poll,
            card: page.card(poll.id),
        })
        .collect();
    text.push_str(&render::list(&rows, &config));

    out.write_all(text.as_bytes())?;
    flush_notices(page, out)?;
    Ok(())
}

/// Print one poll with its results.
pub fn show(page: &mut Page, out: &mut impl Write, id: PollId) -> Result<(), CommandError> {
    let poll = page.poll(id).ok_or(CommandError::PollNotFound(id))?;
    let config = ListLayout::Cards.config(page.user().is_some_and(|u| u.is_owner()));
    let text = render::poll_card(
        Row {
            poll,
            card: page.card(id),
        },
        &config,
    );
    out.write_all(text.as_bytes())?;
    flush_notices(page, out)?;
    Ok(())
}

/// Select `option` on `poll` and submit the vote.
pub async fn vote(
    page: &mut Page,
    out: &mut impl Write,
    poll: PollId,
    option: OptionId,
) -> Result<(), CommandError> {
    if page.poll(poll).is_none() {
        flush_notices(page, out)?;
        return Err(CommandError::PollNotFound(poll));
    }
    if !page.select_option(poll, option) {
        flush_notices(page, out)?;
        return Err(CommandError::Failed("option cannot be selected"));
    }

    let ok = page.submit_vote(poll).await;
    flush_notices(page, out)?;
    if !ok {
        return Err(CommandError::Failed("vote was not counted"));
    }
    show(page, out, poll)
}

/// Home tab: statistics and the newest polls.
pub fn stats(page: &mut Page, out: &mut impl Write) -> Result<(), CommandError> {
    let config = ListLayout::Compact.config(false);
    let mut text = render::tabs(&page.visible_tabs(), page.tab());
    text.push_str(&render::stats(&page.stats(), page.user().is_some()));
    text.push_str("\nRecent polls:\n");
    let rows: Vec<Row<'_>> = page
        .home_polls()
        .into_iter()
        .map(|poll| Row {
            poll,
            card: page.card(poll.id),
        })
        .collect();
    text.push_str(&render::list(&rows, &config));

    out.write_all(text.as_bytes())?;
    flush_notices(page, out)?;
    Ok(())
}
