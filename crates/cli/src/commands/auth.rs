//! Sign-in, sign-out and profile.

use std::io::Write;

use quorum_client::controller::Tab;

use super::{CommandError, Page, flush_notices, prompt};
use crate::render;

/// Two-step sign-in: request a code, then verify it.
///
/// Without `code`, the code is read from stdin after it has been sent.
pub async fn login(
    page: &mut Page,
    out: &mut impl Write,
    email: &str,
    name: Option<String>,
    code: Option<String>,
) -> Result<(), CommandError> {
    page.open_auth();
    if let Some(flow) = page.auth_flow_mut() {
        flow.email = email.to_string();
        flow.name = name.unwrap_or_default();
    }

    let sent = page.request_code().await;
    flush_notices(page, out)?;
    if !sent {
        return Err(CommandError::Failed("could not send the verification code"));
    }

    let code = match code {
        Some(code) => code,
        None => prompt(out, "Enter the 6-digit code: ")?,
    };
    if let Some(flow) = page.auth_flow_mut() {
        flow.set_code(&code);
    }

    let verified = page.verify_code().await;
    flush_notices(page, out)?;
    if !verified {
        return Err(CommandError::Failed("sign-in failed"));
    }
    whoami(page, out)
}

pub fn logout(page: &mut Page, out: &mut impl Write) -> Result<(), CommandError> {
    page.logout();
    flush_notices(page, out)?;
    Ok(())
}

/// Show the profile tab, or say nobody is signed in.
pub fn whoami(page: &mut Page, out: &mut impl Write) -> Result<(), CommandError> {
    page.set_tab(Tab::Profile);
    let visible = page.visible_tabs();
    match page.user() {
        Some(user) => {
            write!(out, "{}", render::profile(user, &page.stats(), &visible))?;
        }
        None => writeln!(out, "Not signed in")?,
    }
    flush_notices(page, out)?;
    Ok(())
}
