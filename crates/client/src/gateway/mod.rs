//! Remote poll gateway.
//!
//! A stateless mapping between typed client calls and the three HTTP
//! endpoints (auth, polls, admin). Input is validated before anything is
//! sent; a validation failure never reaches the network.
//!
//! The gateway never retries and configures no timeout. Transport and
//! decoding failures surface as [`ClientError::Network`].

mod http;
mod wire;

pub use http::HttpGateway;

use std::future::Future;

use quorum_core::{OptionId, Poll, PollId, PollStatus, Role, User, UserId, UserVote};
use secrecy::SecretString;

use crate::draft::PollDraft;
use crate::error::ClientError;

/// Result of a successful code request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeIssued {
    /// Demo-only: the code itself, echoed back by the auth service.
    pub demo_code: Option<String>,
    /// Server message, if any.
    pub message: Option<String>,
}

/// Result of a successful code verification.
#[derive(Debug, Clone)]
pub struct Verified {
    pub token: SecretString,
    pub user: User,
}

/// Identity sent with admin calls as `X-User-Id` / `X-User-Role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
        }
    }
}

/// Operations the page controller needs from the remote service.
pub trait PollGateway: Send + Sync {
    /// Ask the auth service to issue a one-time code for `email`.
    ///
    /// # Errors
    ///
    /// `Validation` if the email does not parse, `Auth` if the service
    /// refuses, `Network` on transport failure.
    fn request_code(
        &self,
        email: &str,
        name: Option<&str>,
    ) -> impl Future<Output = Result<CodeIssued, ClientError>> + Send;

    /// Exchange a code for a token and user record.
    ///
    /// # Errors
    ///
    /// `Validation` unless the code is six digits, `Auth` if the code is
    /// wrong or expired, `Network` on transport failure.
    fn verify_code(
        &self,
        email: &str,
        code: &str,
    ) -> impl Future<Output = Result<Verified, ClientError>> + Send;

    /// Fetch every poll visible to the client.
    ///
    /// # Errors
    ///
    /// `Server` or `Network`.
    fn list_polls(&self) -> impl Future<Output = Result<Vec<Poll>, ClientError>> + Send;

    /// Fetch the polls `user` has voted on.
    ///
    /// # Errors
    ///
    /// `Server` or `Network`.
    fn list_user_votes(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<UserVote>, ClientError>> + Send;

    /// Cast a vote.
    ///
    /// # Errors
    ///
    /// `Server` if the service rejects the vote (already voted, closed),
    /// `Network` on transport failure.
    fn vote(
        &self,
        poll: PollId,
        option: OptionId,
        user: UserId,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Create a poll from a draft.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank title or fewer than two options, `Server` if
    /// the service refuses, `Network` on transport failure.
    fn create_poll(
        &self,
        draft: &PollDraft,
        actor: Actor,
    ) -> impl Future<Output = Result<PollId, ClientError>> + Send;

    /// Delete a poll. Owner only; the service enforces it.
    ///
    /// # Errors
    ///
    /// `Server` or `Network`.
    fn delete_poll(
        &self,
        poll: PollId,
        actor: Actor,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Change a poll's status. Owner only; the service enforces it.
    ///
    /// # Errors
    ///
    /// `Server` or `Network`.
    fn set_status(
        &self,
        poll: PollId,
        status: PollStatus,
        actor: Actor,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}
