//! `reqwest` implementation of [`PollGateway`].

use quorum_core::{Email, OptionId, Poll, PollId, PollStatus, UserId, UserVote, VerificationCode};
use reqwest::{Client, RequestBuilder, Response};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, warn};

use super::wire::{
    Ack, AuthAction, AuthRequest, AuthResponse, DeleteRequest, ErrorBody, StatusRequest,
    VoteHistory, VoteRequest, WirePoll,
};
use super::{Actor, CodeIssued, PollGateway, Verified};
use crate::config::Endpoints;
use crate::draft::PollDraft;
use crate::error::{ClientError, ValidationError};

const USER_ID_HEADER: &str = "X-User-Id";
const USER_ROLE_HEADER: &str = "X-User-Role";

/// HTTP gateway over the auth, poll and admin endpoints.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    endpoints: Endpoints,
}

impl HttpGateway {
    /// Create a gateway with a fresh HTTP client.
    #[must_use]
    pub fn new(endpoints: Endpoints) -> Self {
        Self::with_client(Client::new(), endpoints)
    }

    /// Create a gateway sharing an existing HTTP client.
    #[must_use]
    pub const fn with_client(client: Client, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    /// The endpoints this gateway talks to.
    #[must_use]
    pub const fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn admin(&self, builder: RequestBuilder, actor: Actor) -> RequestBuilder {
        builder
            .header(USER_ID_HEADER, actor.user_id.to_string())
            .header(USER_ROLE_HEADER, actor.role.as_str())
    }
}

/// Send a request, turning transport failures into `Network`.
async fn send(builder: RequestBuilder) -> Result<Response, ClientError> {
    builder.send().await.map_err(|e| {
        error!(error = %e, "Request failed");
        ClientError::from(e)
    })
}

/// Decode a response body.
///
/// Non-2xx answers carry `{error}`; their message is handed to `reject`.
async fn decode<T: DeserializeOwned>(
    response: Response,
    reject: fn(String) -> ClientError,
) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
        warn!(status = status.as_u16(), error = %message, "Endpoint rejected request");
        return Err(reject(message));
    }

    serde_json::from_str(&body).map_err(|e| {
        error!(status = status.as_u16(), error = %e, "Malformed response body");
        ClientError::Network(format!("malformed response: {e}"))
    })
}

/// Check a `{success, error?}` acknowledgement.
fn check_ack(ack: Ack, fallback: &str) -> Result<Ack, ClientError> {
    if ack.success {
        Ok(ack)
    } else {
        Err(ClientError::Server(
            ack.error.unwrap_or_else(|| fallback.to_string()),
        ))
    }
}

impl PollGateway for HttpGateway {
    #[instrument(skip(self, name), fields(email = %email))]
    async fn request_code(&self, email: &str, name: Option<&str>) -> Result<CodeIssued, ClientError> {
        let email = Email::parse(email).map_err(ValidationError::from)?;
        let name = name.map(str::trim).filter(|n| !n.is_empty());

        let response = send(self.client.post(self.endpoints.auth.clone()).json(&AuthRequest {
            action: AuthAction::SendCode,
            email: email.as_str(),
            name,
            code: None,
        }))
        .await?;
        let body: AuthResponse = decode(response, ClientError::Auth).await?;

        if !body.success {
            return Err(ClientError::Auth(
                body.error.unwrap_or_else(|| "Could not send the code".to_string()),
            ));
        }

        if body.code.is_some() {
            warn!("Auth service returned the verification code to the client (demo mode)");
        }
        debug!("Verification code issued");

        Ok(CodeIssued {
            demo_code: body.code,
            message: body.message,
        })
    }

    #[instrument(skip(self, code), fields(email = %email))]
    async fn verify_code(&self, email: &str, code: &str) -> Result<Verified, ClientError> {
        let email = Email::parse(email).map_err(ValidationError::from)?;
        let code = VerificationCode::parse(code).map_err(ValidationError::from)?;

        let response = send(self.client.post(self.endpoints.auth.clone()).json(&AuthRequest {
            action: AuthAction::VerifyCode,
            email: email.as_str(),
            name: None,
            code: Some(code.as_str()),
        }))
        .await?;
        let body: AuthResponse = decode(response, ClientError::Auth).await?;

        if !body.success {
            return Err(ClientError::Auth(
                body.error.unwrap_or_else(|| "Invalid code".to_string()),
            ));
        }

        let (Some(token), Some(user)) = (body.token, body.user) else {
            error!("Auth service reported success without token or user");
            return Err(ClientError::Network(
                "auth response is missing token or user".to_string(),
            ));
        };
        let user = quorum_core::User::try_from(user)?;

        debug!(user_id = %user.id, role = %user.role, "Code verified");
        Ok(Verified {
            token: SecretString::from(token),
            user,
        })
    }

    #[instrument(skip(self))]
    async fn list_polls(&self) -> Result<Vec<Poll>, ClientError> {
        let response = send(self.client.get(self.endpoints.polls.clone())).await?;
        let polls: Vec<WirePoll> = decode(response, ClientError::Server).await?;

        debug!(count = polls.len(), "Polls loaded");
        Ok(polls.into_iter().map(Poll::from).collect())
    }

    #[instrument(skip(self), fields(user_id = %user))]
    async fn list_user_votes(&self, user: UserId) -> Result<Vec<UserVote>, ClientError> {
        let request = self
            .client
            .get(self.endpoints.polls.clone())
            .query(&[("user_id", user.to_string())]);
        let history: VoteHistory = decode(send(request).await?, ClientError::Server).await?;

        let votes = history.into_votes();
        debug!(count = votes.len(), "Vote history loaded");
        Ok(votes)
    }

    #[instrument(skip(self), fields(poll_id = %poll, option_id = %option, user_id = %user))]
    async fn vote(&self, poll: PollId, option: OptionId, user: UserId) -> Result<(), ClientError> {
        let request = self.client.post(self.endpoints.polls.clone()).json(&VoteRequest {
            poll_id: poll,
            option_id: option,
            user_id: user,
        });
        let ack: Ack = decode(send(request).await?, ClientError::Server).await?;
        check_ack(ack, "Vote was not accepted")?;

        debug!("Vote recorded");
        Ok(())
    }

    #[instrument(skip(self, draft), fields(user_id = %actor.user_id))]
    async fn create_poll(&self, draft: &PollDraft, actor: Actor) -> Result<PollId, ClientError> {
        let new_poll = draft.validate()?;

        let request = self.admin(self.client.post(self.endpoints.admin.clone()), actor);
        let ack: Ack = decode(send(request.json(&new_poll)).await?, ClientError::Server).await?;
        let ack = check_ack(ack, "Poll was not created")?;

        let Some(poll_id) = ack.poll_id else {
            error!("Admin service reported success without a poll id");
            return Err(ClientError::Network(
                "create response is missing poll_id".to_string(),
            ));
        };
        debug!(poll_id = %poll_id, "Poll created");
        Ok(poll_id)
    }

    #[instrument(skip(self), fields(poll_id = %poll, user_id = %actor.user_id))]
    async fn delete_poll(&self, poll: PollId, actor: Actor) -> Result<(), ClientError> {
        let request = self.admin(self.client.delete(self.endpoints.admin.clone()), actor);
        let ack: Ack = decode(
            send(request.json(&DeleteRequest { poll_id: poll })).await?,
            ClientError::Server,
        )
        .await?;
        check_ack(ack, "Poll was not deleted")?;

        debug!("Poll deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(poll_id = %poll, status = %status, user_id = %actor.user_id))]
    async fn set_status(
        &self,
        poll: PollId,
        status: PollStatus,
        actor: Actor,
    ) -> Result<(), ClientError> {
        let request = self.admin(self.client.put(self.endpoints.admin.clone()), actor);
        let ack: Ack = decode(
            send(request.json(&StatusRequest {
                poll_id: poll,
                status,
            }))
            .await?,
            ClientError::Server,
        )
        .await?;
        check_ack(ack, "Poll status was not changed")?;

        debug!("Poll status changed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Port 9 (discard) on localhost: any request that escaped validation
    // would fail with a network error instead of a validation error.
    fn gateway() -> HttpGateway {
        let endpoints = Endpoints::parse(
            "http://127.0.0.1:9/auth",
            "http://127.0.0.1:9/polls",
            "http://127.0.0.1:9/admin",
        )
        .unwrap();
        HttpGateway::new(endpoints)
    }

    #[tokio::test]
    async fn test_request_code_rejects_bad_email_locally() {
        let err = gateway().request_code("not-an-email", None).await.unwrap_err();
        assert!(err.is_validation(), "got {err:?}");
    }

    #[tokio::test]
    async fn test_verify_code_requires_six_digits() {
        let err = gateway()
            .verify_code("voter@example.com", "12345")
            .await
            .unwrap_err();
        assert!(err.is_validation(), "got {err:?}");
    }

    #[tokio::test]
    async fn test_create_poll_validates_draft() {
        let actor = Actor {
            user_id: UserId::new(1),
            role: quorum_core::Role::Owner,
        };
        let err = gateway()
            .create_poll(&PollDraft::new(), actor)
            .await
            .unwrap_err();
        assert!(err.is_validation(), "got {err:?}");
    }

    #[test]
    fn test_failed_ack_uses_fallback() {
        let ack = Ack {
            success: false,
            poll_id: None,
            error: None,
        };
        let err = check_ack(ack, "Vote was not accepted").unwrap_err();
        assert_eq!(err.user_message(), "Vote was not accepted");
    }
}
