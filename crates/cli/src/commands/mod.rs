//! Command implementations.
//!
//! Each command drives one [`PageController`] the way a user would drive
//! the page: mount, act, then print whatever notices the action queued.

pub mod auth;
pub mod manage;
pub mod polls;

use std::io::{self, BufRead, Write};

use quorum_client::controller::{Dialog, PageController};
use quorum_client::session::{FileBackend, SessionStore};
use quorum_client::{ClientConfig, HttpGateway};
use quorum_core::PollId;
use thiserror::Error;

use crate::render;

/// Controller wired to the real endpoints and the on-disk session.
pub type Page = PageController<HttpGateway, FileBackend>;

/// Errors that end a command with a non-zero exit code.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The action failed; its notices have already been printed.
    #[error("{0}")]
    Failed(&'static str),

    /// No poll with this id was loaded.
    #[error("Poll {0} not found")]
    PollNotFound(PollId),
}

/// Build the controller and load the page.
pub async fn open(config: &ClientConfig) -> Page {
    let session = SessionStore::new(FileBackend::new(&config.session_dir));
    let mut page = PageController::new(HttpGateway::new(config.endpoints.clone()), session);
    page.mount().await;
    page
}

/// Print and discard queued notices.
pub fn flush_notices(page: &mut Page, out: &mut impl Write) -> io::Result<()> {
    let notices = page.drain_notices();
    out.write_all(render::notices(&notices).as_bytes())
}

/// Ask a question on `out` and read one trimmed line from stdin.
pub fn prompt(out: &mut impl Write, question: &str) -> io::Result<String> {
    write!(out, "{question}")?;
    out.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Resolve the open confirmation dialog, asking unless `assume_yes`.
///
/// Returns `Ok(false)` if the user declined.
pub async fn confirm_dialog(
    page: &mut Page,
    out: &mut impl Write,
    assume_yes: bool,
) -> Result<bool, CommandError> {
    let question = match page.dialog() {
        Some(Dialog::Confirm(confirm)) => confirm.prompt(),
        _ => return Ok(false),
    };

    if !assume_yes {
        let answer = prompt(out, &format!("{question} [y/N] "))?;
        if !matches!(answer.to_lowercase().as_str(), "y" | "yes") {
            page.close_dialog();
            writeln!(out, "Cancelled")?;
            return Ok(false);
        }
    }

    let ok = page.confirm().await;
    flush_notices(page, out)?;
    if ok {
        Ok(true)
    } else {
        Err(CommandError::Failed("action failed"))
    }
}
