//! Owner-only poll administration.

use std::io::Write;

use quorum_client::draft::PollDraft;
use quorum_core::{PollId, PollStatus};

use super::{CommandError, Page, confirm_dialog, flush_notices, polls};

/// Create a poll and show it.
pub async fn create(
    page: &mut Page,
    out: &mut impl Write,
    title: String,
    description: Option<String>,
    options: Vec<String>,
) -> Result<(), CommandError> {
    if !page.open_create() {
        flush_notices(page, out)?;
        return Err(CommandError::Failed("only the owner can create polls"));
    }
    if let Some(draft) = page.draft_mut() {
        *draft = PollDraft::with_fields(title, description.unwrap_or_default(), options);
    }

    let created = page.submit_create().await;
    flush_notices(page, out)?;
    match created {
        Some(id) => {
            writeln!(out, "Created poll #{id}")?;
            if page.poll(id).is_some() {
                polls::show(page, out, id)?;
            }
            Ok(())
        }
        None => Err(CommandError::Failed("poll was not created")),
    }
}

/// Move a poll to `target` status, confirming first unless `assume_yes`.
pub async fn set_status(
    page: &mut Page,
    out: &mut impl Write,
    id: PollId,
    target: PollStatus,
    assume_yes: bool,
) -> Result<(), CommandError> {
    let current = page
        .poll(id)
        .map(|p| p.status)
        .ok_or(CommandError::PollNotFound(id))?;
    if current == target {
        writeln!(out, "Poll #{id} is already {target}")?;
        return Ok(());
    }

    if !page.request_status_toggle(id) {
        flush_notices(page, out)?;
        return Err(CommandError::Failed("status change not allowed"));
    }
    if confirm_dialog(page, out, assume_yes).await? {
        polls::show(page, out, id)?;
    }
    Ok(())
}

/// Delete a poll, confirming first unless `assume_yes`.
pub async fn delete(
    page: &mut Page,
    out: &mut impl Write,
    id: PollId,
    assume_yes: bool,
) -> Result<(), CommandError> {
    if !page.request_delete(id) {
        flush_notices(page, out)?;
        return Err(CommandError::Failed("delete not allowed"));
    }
    confirm_dialog(page, out, assume_yes).await?;
    Ok(())
}
