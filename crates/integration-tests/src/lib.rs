//! Integration test support for Quorum.
//!
//! [`FakeBackend`] serves the auth, poll and admin endpoints from memory on
//! an ephemeral localhost port, with the same request and response shapes
//! as the real service. Tests point an `HttpGateway` at it and drive a
//! `PageController` end to end.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p quorum-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use quorum_client::controller::PageController;
use quorum_client::session::{FileBackend, SessionStore};
use quorum_client::{Endpoints, HttpGateway};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Email of the seeded owner account.
pub const OWNER_EMAIL: &str = "owner@example.com";

// ============================================================================
// In-memory service state
// ============================================================================

#[derive(Debug, Clone)]
pub struct Account {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StoredOption {
    pub id: i32,
    pub text: String,
    pub votes: u32,
}

#[derive(Debug, Clone)]
pub struct StoredPoll {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_by: i32,
    pub created_at: String,
    pub options: Vec<StoredOption>,
}

/// Everything the fake service knows.
#[derive(Debug, Default)]
pub struct BackendState {
    pub accounts: Vec<Account>,
    pub polls: Vec<StoredPoll>,
    /// `(user_id, poll_id, option_id)`
    pub votes: Vec<(i32, i32, i32)>,
    /// Requests received, across all endpoints.
    pub requests: usize,
    /// When set, the poll list answers 200 with a non-JSON body.
    pub garbled_poll_list: bool,
    next_id: i32,
}

impl BackendState {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn seeded() -> Self {
        let mut state = Self {
            next_id: 100,
            ..Self::default()
        };
        state.accounts.push(Account {
            id: 1,
            email: OWNER_EMAIL.to_string(),
            name: "Owner".to_string(),
            role: "owner".to_string(),
            code: None,
        });

        let seed: [(&str, &str, &str, &[(&str, u32)]); 3] = [
            (
                "Favourite programming language?",
                "Pick the language you enjoy most",
                "2024-03-01T10:00:00Z",
                &[("TypeScript", 45), ("Python", 38), ("JavaScript", 52), ("Go", 23)],
            ),
            (
                "Best time for the team meeting",
                "Choose a slot that suits you",
                "2024-03-02 09:30:00",
                &[("Morning", 28), ("Afternoon", 42), ("Evening", 19)],
            ),
            (
                "Which feature should we build next?",
                "",
                "2024-02-20T08:00:00Z",
                &[
                    ("Export to spreadsheet", 31),
                    ("Anonymous voting", 47),
                    ("Comments", 25),
                    ("Automatic closing", 18),
                ],
            ),
        ];
        for (title, description, created_at, options) in seed {
            let id = state.next_id();
            let options = options
                .iter()
                .map(|(text, votes)| StoredOption {
                    id: 0,
                    text: (*text).to_string(),
                    votes: *votes,
                })
                .collect();
            state.polls.push(StoredPoll {
                id,
                title: title.to_string(),
                description: description.to_string(),
                status: "active".to_string(),
                created_by: 1,
                created_at: created_at.to_string(),
                options: renumber(id, options),
            });
        }
        state
    }

    fn poll_json(&self, poll: &StoredPoll) -> Value {
        let creator = self
            .accounts
            .iter()
            .find(|a| a.id == poll.created_by)
            .map(|a| a.name.clone());
        let total: u32 = poll.options.iter().map(|o| o.votes).sum();
        json!({
            "id": poll.id,
            "title": poll.title,
            "description": poll.description,
            "status": poll.status,
            "created_by": poll.created_by,
            "created_at": poll.created_at,
            "creator": creator,
            "options": poll.options.iter().map(|o| json!({
                "id": o.id,
                "option_text": o.text,
                "votes_count": o.votes,
            })).collect::<Vec<_>>(),
            "totalVotes": total,
        })
    }
}

fn renumber(poll_id: i32, options: Vec<StoredOption>) -> Vec<StoredOption> {
    options
        .into_iter()
        .zip(1..)
        .map(|(o, n)| StoredOption {
            id: poll_id * 10 + n,
            ..o
        })
        .collect()
}

type Shared = Arc<Mutex<BackendState>>;

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
    guard.requests += 1;
    guard
}

fn reply(status: StatusCode, body: Value) -> (StatusCode, Json<Value>) {
    (status, Json(body))
}

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    reply(status, json!({ "error": message }))
}

// ============================================================================
// Auth endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
struct AuthBody {
    action: Option<String>,
    email: Option<String>,
    name: Option<String>,
    code: Option<String>,
}

async fn auth(State(state): State<Shared>, Json(body): Json<AuthBody>) -> (StatusCode, Json<Value>) {
    let mut state = lock(&state);
    let email = body.email.unwrap_or_default().trim().to_lowercase();

    match body.action.as_deref() {
        Some("send_code") => {
            if !email.contains('@') {
                return error(StatusCode::BAD_REQUEST, "Valid email required");
            }
            let issued = format!("{:06}", 100_000 + state.requests);
            if let Some(account) = state.accounts.iter_mut().find(|a| a.email == email) {
                account.code = Some(issued.clone());
            } else {
                let id = state.next_id();
                let name = body
                    .name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
                state.accounts.push(Account {
                    id,
                    email: email.clone(),
                    name,
                    role: "user".to_string(),
                    code: Some(issued.clone()),
                });
            }
            reply(
                StatusCode::OK,
                json!({
                    "success": true,
                    "code": issued,
                    "message": "Code sent (demo mode: code shown)",
                }),
            )
        }
        Some("verify_code") => {
            let Some(code) = body.code.filter(|_| !email.is_empty()) else {
                return error(StatusCode::BAD_REQUEST, "Email and code required");
            };
            let Some(account) = state.accounts.iter_mut().find(|a| a.email == email) else {
                return error(StatusCode::NOT_FOUND, "User not found");
            };
            if account.code.as_deref() != Some(code.as_str()) {
                return error(StatusCode::BAD_REQUEST, "Invalid code");
            }
            account.code = None;
            reply(
                StatusCode::OK,
                json!({
                    "success": true,
                    "token": format!("user_{}_token", account.id),
                    "user": {
                        "id": account.id,
                        "name": account.name,
                        "email": account.email,
                        "role": account.role,
                        "phone": null,
                    },
                }),
            )
        }
        _ => error(StatusCode::BAD_REQUEST, "Invalid action"),
    }
}

// ============================================================================
// Poll endpoint
// ============================================================================

async fn list_polls(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::response::Response {
    use axum::response::IntoResponse;

    let state = lock(&state);
    if let Some(user_id) = params.get("user_id").and_then(|u| u.parse::<i32>().ok()) {
        let voted: Vec<i32> = state
            .votes
            .iter()
            .filter(|(u, _, _)| *u == user_id)
            .map(|(_, p, _)| *p)
            .collect();
        return Json(json!({ "voted_polls": voted })).into_response();
    }
    if state.garbled_poll_list {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }
    let polls: Vec<Value> = state.polls.iter().map(|p| state.poll_json(p)).collect();
    Json(Value::Array(polls)).into_response()
}

#[derive(Debug, Deserialize)]
struct VoteBody {
    poll_id: Option<i32>,
    option_id: Option<i32>,
    user_id: Option<i32>,
}

async fn vote(State(state): State<Shared>, Json(body): Json<VoteBody>) -> (StatusCode, Json<Value>) {
    let mut state = lock(&state);
    let (Some(poll_id), Some(option_id)) = (body.poll_id, body.option_id) else {
        return error(StatusCode::BAD_REQUEST, "poll_id and option_id are required");
    };
    let user_id = body.user_id.unwrap_or(1);

    if state.votes.iter().any(|(u, p, _)| *u == user_id && *p == poll_id) {
        return error(StatusCode::BAD_REQUEST, "User already voted in this poll");
    }
    let Some(poll) = state.polls.iter_mut().find(|p| p.id == poll_id) else {
        return error(StatusCode::NOT_FOUND, "Poll not found");
    };
    if poll.status != "active" {
        return error(StatusCode::BAD_REQUEST, "Poll is closed");
    }
    let Some(option) = poll.options.iter_mut().find(|o| o.id == option_id) else {
        return error(StatusCode::NOT_FOUND, "Option not found");
    };
    option.votes += 1;
    state.votes.push((user_id, poll_id, option_id));
    reply(StatusCode::OK, json!({ "success": true, "message": "Vote recorded" }))
}

// ============================================================================
// Admin endpoint
// ============================================================================

fn caller(headers: &HeaderMap) -> Option<(i32, String)> {
    let id = headers.get("X-User-Id")?.to_str().ok()?.parse().ok()?;
    let role = headers.get("X-User-Role")?.to_str().ok()?.to_string();
    Some((id, role))
}

#[derive(Debug, Deserialize)]
struct CreateBody {
    title: Option<String>,
    description: Option<String>,
    #[serde(default)]
    options: Vec<String>,
}

async fn create_poll(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<CreateBody>,
) -> (StatusCode, Json<Value>) {
    let mut state = lock(&state);
    let Some((user_id, role)) = caller(&headers) else {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    if role != "owner" {
        return error(StatusCode::FORBIDDEN, "Only owner can create polls");
    }
    let title = body.title.unwrap_or_default();
    if title.is_empty() || body.options.len() < 2 {
        return error(StatusCode::BAD_REQUEST, "Title and at least 2 options required");
    }

    let id = state.next_id();
    let options = body
        .options
        .into_iter()
        .map(|text| StoredOption { id: 0, text, votes: 0 })
        .collect();
    state.polls.push(StoredPoll {
        id,
        title,
        description: body.description.unwrap_or_default(),
        status: "active".to_string(),
        created_by: user_id,
        created_at: "2024-04-01T12:00:00Z".to_string(),
        options: renumber(id, options),
    });
    reply(
        StatusCode::CREATED,
        json!({ "success": true, "poll_id": id, "message": "Poll created" }),
    )
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    poll_id: Option<i32>,
    status: Option<String>,
}

async fn set_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<StatusBody>,
) -> (StatusCode, Json<Value>) {
    let mut state = lock(&state);
    let Some((_, role)) = caller(&headers) else {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    if role != "owner" {
        return error(StatusCode::FORBIDDEN, "Only owner can change poll status");
    }
    let (Some(poll_id), Some(status)) = (body.poll_id, body.status) else {
        return error(StatusCode::BAD_REQUEST, "poll_id and status required");
    };
    if status != "active" && status != "closed" {
        return error(StatusCode::BAD_REQUEST, "Invalid status. Use active or closed");
    }
    if let Some(poll) = state.polls.iter_mut().find(|p| p.id == poll_id) {
        poll.status = status;
    }
    reply(StatusCode::OK, json!({ "success": true, "message": "Status updated" }))
}

#[derive(Debug, Deserialize)]
struct DeleteBody {
    poll_id: Option<i32>,
}

async fn delete_poll(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<DeleteBody>,
) -> (StatusCode, Json<Value>) {
    let mut state = lock(&state);
    let Some((_, role)) = caller(&headers) else {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    if role != "owner" {
        return error(StatusCode::FORBIDDEN, "Only owner can delete polls");
    }
    let Some(poll_id) = body.poll_id else {
        return error(StatusCode::BAD_REQUEST, "poll_id required");
    };
    state.polls.retain(|p| p.id != poll_id);
    state.votes.retain(|(_, p, _)| *p != poll_id);
    reply(StatusCode::OK, json!({ "success": true, "message": "Poll deleted" }))
}

// ============================================================================
// Server
// ============================================================================

/// In-process fake of the poll service.
#[derive(Debug)]
pub struct FakeBackend {
    state: Shared,
    addr: SocketAddr,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Start a server seeded with three active polls and an owner account.
    ///
    /// # Errors
    ///
    /// Returns an error if no localhost port can be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state: Shared = Arc::new(Mutex::new(BackendState::seeded()));
        let app = Router::new()
            .route("/auth", post(auth))
            .route("/polls", get(list_polls).post(vote))
            .route(
                "/manage-polls",
                post(create_poll).put(set_status).delete(delete_poll),
            )
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            state,
            addr,
            server,
        })
    }

    /// Endpoint URLs for a client.
    ///
    /// # Errors
    ///
    /// Never fails for a bound localhost address; the `Result` comes from
    /// URL parsing.
    pub fn endpoints(&self) -> Result<Endpoints, quorum_client::ConfigError> {
        let base = format!("http://{}", self.addr);
        Endpoints::parse(
            &format!("{base}/auth"),
            &format!("{base}/polls"),
            &format!("{base}/manage-polls"),
        )
    }

    /// Direct access to the service state.
    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.state().requests
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Endpoints on a localhost port nothing listens on.
///
/// # Errors
///
/// Returns an error if no port can be reserved.
pub async fn unreachable_endpoints() -> std::io::Result<Endpoints> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let base = format!("http://{addr}");
    Endpoints::parse(
        &format!("{base}/auth"),
        &format!("{base}/polls"),
        &format!("{base}/manage-polls"),
    )
    .map_err(|e| std::io::Error::other(e.to_string()))
}

// ============================================================================
// Client helpers
// ============================================================================

/// Controller wired to real HTTP and an on-disk session.
pub type TestPage = PageController<HttpGateway, FileBackend>;

/// Build a controller against `endpoints` and mount it.
pub async fn mount_page(endpoints: Endpoints, session_dir: &Path) -> TestPage {
    let session = SessionStore::new(FileBackend::new(session_dir));
    let mut page = PageController::new(HttpGateway::new(endpoints), session);
    page.mount().await;
    page
}

/// Sign in through the dialog, typing the demo code the service echoes.
///
/// Returns `false` if either step fails.
pub async fn sign_in(page: &mut TestPage, email: &str) -> bool {
    page.open_auth();
    if let Some(flow) = page.auth_flow_mut() {
        flow.email = email.to_string();
    }
    if !page.request_code().await {
        return false;
    }
    let Some(code) = page
        .auth_flow()
        .and_then(|f| f.demo_code())
        .map(str::to_string)
    else {
        return false;
    };
    if let Some(flow) = page.auth_flow_mut() {
        flow.set_code(&code);
    }
    page.verify_code().await
}
