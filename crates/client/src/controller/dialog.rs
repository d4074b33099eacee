//! Modal dialogs owned by the page controller.

use quorum_core::{PollId, PollStatus, VerificationCode};

use crate::draft::PollDraft;

/// Which half of the sign-in dialog is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStep {
    #[default]
    Email,
    Code,
}

/// Two-step sign-in form: email (and optional name), then the code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthFlow {
    pub email: String,
    pub name: String,
    step: AuthStep,
    code: String,
    demo_code: Option<String>,
}

impl AuthFlow {
    #[must_use]
    pub const fn step(&self) -> AuthStep {
        self.step
    }

    /// Code typed so far, digits only.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Code echoed back by a demo auth service.
    #[must_use]
    pub fn demo_code(&self) -> Option<&str> {
        self.demo_code.as_deref()
    }

    /// Update the code field. Non-digits are dropped and input is capped at
    /// six digits, as the input box does while typing.
    pub fn set_code(&mut self, raw: &str) {
        self.code = VerificationCode::sanitize_input(raw);
    }

    pub(crate) fn code_sent(&mut self, demo_code: Option<String>) {
        self.step = AuthStep::Code;
        self.code.clear();
        self.demo_code = demo_code;
    }

    /// Return to the email step, keeping the email and name.
    pub fn back(&mut self) {
        self.step = AuthStep::Email;
        self.code.clear();
        self.demo_code = None;
    }
}

/// An owner action waiting for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirm {
    Delete {
        poll: PollId,
        title: String,
    },
    SetStatus {
        poll: PollId,
        title: String,
        to: PollStatus,
    },
}

impl Confirm {
    /// Question shown in the dialog.
    #[must_use]
    pub fn prompt(&self) -> String {
        match self {
            Self::Delete { title, .. } => {
                format!("Delete \"{title}\"? This cannot be undone.")
            }
            Self::SetStatus {
                title,
                to: PollStatus::Closed,
                ..
            } => format!("Close voting on \"{title}\"?"),
            Self::SetStatus {
                title,
                to: PollStatus::Active,
                ..
            } => format!("Reopen voting on \"{title}\"?"),
        }
    }

    #[must_use]
    pub const fn poll(&self) -> PollId {
        match self {
            Self::Delete { poll, .. } | Self::SetStatus { poll, .. } => *poll,
        }
    }
}

/// The open modal, if any. Only one is open at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Auth(AuthFlow),
    CreatePoll(PollDraft),
    Confirm(Confirm),
}
