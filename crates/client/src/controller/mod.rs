//! Page controller.
//!
//! Owns every piece of page state, turns user actions into gateway calls
//! and reconciles the results. Each mutating action ends with a full reload
//! from the server rather than patching local state.
//!
//! Actions never return errors. Failures are converted to [`Notice`]s at the
//! action boundary and the controller is left idle; callers learn whether an
//! action succeeded from its boolean (or optional) result.

mod dialog;
mod tab;

pub use dialog::{AuthFlow, AuthStep, Confirm, Dialog};
pub use tab::Tab;

use std::collections::{BTreeMap, HashSet};

use quorum_core::{OptionId, Poll, PollId, User, UserVote};
use secrecy::SecretString;
use tracing::{debug, info, instrument, warn};

use crate::card::PollCard;
use crate::draft::PollDraft;
use crate::error::{ClientError, ValidationError};
use crate::gateway::{Actor, PollGateway};
use crate::notice::Notice;
use crate::session::{SessionBackend, SessionStore};
use crate::view_model::{self, PollFilter, PollListView, PollQuery, PollStats, SortBy};

/// Number of polls on the home tab.
pub const HOME_RECENT_POLLS: usize = 2;

/// An in-flight action. Controls bound to a pending action are disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Load,
    RequestCode,
    VerifyCode,
    Vote(PollId),
    CreatePoll,
    DeletePoll(PollId),
    SetStatus(PollId),
}

/// Top-level orchestrator for the poll page.
pub struct PageController<G, B> {
    gateway: G,
    session: SessionStore<B>,
    user: Option<User>,
    token: Option<SecretString>,
    polls: Vec<Poll>,
    votes: Vec<UserVote>,
    cards: BTreeMap<PollId, PollCard>,
    query: PollQuery,
    tab: Tab,
    dialog: Option<Dialog>,
    pending: HashSet<Action>,
    notices: Vec<Notice>,
}

impl<G, B> std::fmt::Debug for PageController<G, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageController")
            .field("user", &self.user.as_ref().map(|u| u.id))
            .field("polls", &self.polls.len())
            .field("votes", &self.votes.len())
            .field("tab", &self.tab)
            .field("dialog", &self.dialog)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl<G: PollGateway, B: SessionBackend> PageController<G, B> {
    /// Create a controller. Nothing is loaded until [`Self::mount`].
    pub fn new(gateway: G, session: SessionStore<B>) -> Self {
        Self {
            gateway,
            session,
            user: None,
            token: None,
            polls: Vec::new(),
            votes: Vec::new(),
            cards: BTreeMap::new(),
            query: PollQuery::default(),
            tab: Tab::default(),
            dialog: None,
            pending: HashSet::new(),
            notices: Vec::new(),
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Restore the session, then load polls and vote history.
    #[instrument(skip(self))]
    pub async fn mount(&mut self) {
        if let Some(session) = self.session.load() {
            info!(user_id = %session.user.id, "Signed in from stored session");
            self.user = Some(session.user);
            self.token = Some(session.token);
        }
        self.reload().await;
    }

    /// Reload polls and the user's vote history concurrently.
    ///
    /// The two requests fail independently: whichever succeeds is applied.
    #[instrument(skip(self))]
    pub async fn reload(&mut self) {
        self.pending.insert(Action::Load);
        let user_id = self.user.as_ref().map(|u| u.id);
        let gateway = &self.gateway;

        let (polls, votes) = tokio::join!(gateway.list_polls(), async {
            match user_id {
                Some(id) => gateway.list_user_votes(id).await,
                None => Ok(Vec::new()),
            }
        });

        match polls {
            Ok(polls) => self.polls = polls,
            Err(e) => {
                warn!(error = %e, "Failed to load polls");
                self.notices.push(Notice::from_error("Could not load polls", &e));
            }
        }
        match votes {
            Ok(votes) => self.votes = votes,
            Err(e) => {
                warn!(error = %e, "Failed to load vote history");
                self.notices
                    .push(Notice::from_error("Could not load your votes", &e));
            }
        }

        self.sync_cards();
        self.pending.remove(&Action::Load);
        debug!(polls = self.polls.len(), votes = self.votes.len(), "Page reloaded");
    }

    async fn reload_polls(&mut self) {
        match self.gateway.list_polls().await {
            Ok(polls) => self.polls = polls,
            Err(e) => {
                warn!(error = %e, "Failed to reload polls");
                self.notices.push(Notice::from_error("Could not load polls", &e));
            }
        }
        self.sync_cards();
    }

    fn sync_cards(&mut self) {
        let mut cards = BTreeMap::new();
        for poll in &self.polls {
            let voted = view_model::has_voted(&self.votes, poll.id);
            let card = match self.cards.remove(&poll.id) {
                Some(mut card) => {
                    card.sync(poll, voted);
                    card
                }
                None => PollCard::new(poll, voted),
            };
            cards.insert(poll.id, card);
        }
        self.cards = cards;
    }

    // ========================================================================
    // Read access
    // ========================================================================

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    #[must_use]
    pub fn polls(&self) -> &[Poll] {
        &self.polls
    }

    #[must_use]
    pub fn poll(&self, id: PollId) -> Option<&Poll> {
        self.polls.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn votes(&self) -> &[UserVote] {
        &self.votes
    }

    #[must_use]
    pub fn has_voted(&self, poll: PollId) -> bool {
        view_model::has_voted(&self.votes, poll)
    }

    #[must_use]
    pub fn card(&self, poll: PollId) -> Option<&PollCard> {
        self.cards.get(&poll)
    }

    #[must_use]
    pub const fn query(&self) -> &PollQuery {
        &self.query
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = search.into();
    }

    pub const fn set_filter(&mut self, filter: PollFilter) {
        self.query.filter = filter;
    }

    pub const fn set_sort(&mut self, sort: SortBy) {
        self.query.sort = sort;
    }

    /// Filtered, sorted list plus statistics for the current query.
    #[must_use]
    pub fn view(&self) -> PollListView<'_> {
        view_model::derive(&self.polls, &self.votes, &self.query, self.user.as_ref())
    }

    #[must_use]
    pub fn stats(&self) -> PollStats {
        view_model::stats(&self.polls, &self.votes)
    }

    /// Newest polls for the home tab.
    #[must_use]
    pub fn home_polls(&self) -> Vec<&Poll> {
        view_model::recent(&self.polls, HOME_RECENT_POLLS)
    }

    #[must_use]
    pub const fn tab(&self) -> Tab {
        self.tab
    }

    #[must_use]
    pub fn visible_tabs(&self) -> Vec<Tab> {
        Tab::visible(self.user.as_ref())
    }

    /// Switch tab. Returns `false` if the tab is hidden for this user.
    pub fn set_tab(&mut self, tab: Tab) -> bool {
        if !tab.is_visible_to(self.user.as_ref()) {
            return false;
        }
        self.tab = tab;
        true
    }

    #[must_use]
    pub const fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    #[must_use]
    pub fn is_pending(&self, action: Action) -> bool {
        self.pending.contains(&action)
    }

    /// Notices queued since the last drain, oldest first.
    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Take every queued notice.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Close whatever dialog is open without acting on it.
    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }

    fn fail(&mut self, title: &str, err: &ClientError) {
        if err.is_validation() {
            debug!(error = %err, "{title}");
        } else {
            warn!(error = %err, "{title}");
        }
        self.notices.push(Notice::from_error(title, err));
    }

    fn require_owner(&self) -> Result<Actor, ClientError> {
        match &self.user {
            None => Err(ValidationError::NotSignedIn.into()),
            Some(user) if !user.is_owner() => Err(ClientError::Forbidden(
                "Only the owner can manage polls".to_string(),
            )),
            Some(user) => Ok(Actor::from(user)),
        }
    }

    // ========================================================================
    // Sign-in
    // ========================================================================

    /// Open the sign-in dialog at the email step.
    pub fn open_auth(&mut self) {
        self.dialog = Some(Dialog::Auth(AuthFlow::default()));
    }

    /// The sign-in form, if that dialog is open.
    pub const fn auth_flow_mut(&mut self) -> Option<&mut AuthFlow> {
        match &mut self.dialog {
            Some(Dialog::Auth(flow)) => Some(flow),
            _ => None,
        }
    }

    #[must_use]
    pub const fn auth_flow(&self) -> Option<&AuthFlow> {
        match &self.dialog {
            Some(Dialog::Auth(flow)) => Some(flow),
            _ => None,
        }
    }

    /// Go back from the code step to the email step.
    pub fn auth_back(&mut self) {
        if let Some(flow) = self.auth_flow_mut() {
            flow.back();
        }
    }

    /// Ask for a code for the email in the sign-in form.
    #[instrument(skip(self))]
    pub async fn request_code(&mut self) -> bool {
        let Some(flow) = self.auth_flow() else {
            self.open_auth();
            return false;
        };
        let email = flow.email.clone();
        let name = flow.name.clone();

        self.pending.insert(Action::RequestCode);
        let result = self
            .gateway
            .request_code(&email, Some(name.as_str()).filter(|n| !n.trim().is_empty()))
            .await;
        self.pending.remove(&Action::RequestCode);

        match result {
            Ok(issued) => {
                let notice = match &issued.demo_code {
                    Some(code) => Notice::info("Code sent", format!("Demo code: {code}")),
                    None => Notice::info(
                        "Code sent",
                        issued
                            .message
                            .clone()
                            .unwrap_or_else(|| "Check your email".to_string()),
                    ),
                };
                if let Some(flow) = self.auth_flow_mut() {
                    flow.code_sent(issued.demo_code);
                }
                self.notices.push(notice);
                true
            }
            Err(e) => {
                self.fail("Could not send code", &e);
                false
            }
        }
    }

    /// Verify the code in the sign-in form and start a session.
    #[instrument(skip(self))]
    pub async fn verify_code(&mut self) -> bool {
        let Some(flow) = self.auth_flow() else {
            self.fail(
                "Could not sign in",
                &ValidationError::CodeNotRequested.into(),
            );
            return false;
        };
        if flow.step() != AuthStep::Code {
            self.fail(
                "Could not sign in",
                &ValidationError::CodeNotRequested.into(),
            );
            return false;
        }
        let email = flow.email.clone();
        let code = flow.code().to_string();

        self.pending.insert(Action::VerifyCode);
        let result = self.gateway.verify_code(&email, &code).await;
        self.pending.remove(&Action::VerifyCode);

        let verified = match result {
            Ok(verified) => verified,
            Err(e) => {
                self.fail("Could not sign in", &e);
                return false;
            }
        };

        if let Err(e) = self.session.save(&verified.user, &verified.token) {
            self.fail("Signed in for this session only", &e.into());
        }
        info!(user_id = %verified.user.id, role = %verified.user.role, "Signed in");
        self.notices.push(Notice::success(
            "Signed in",
            format!("Welcome, {}", verified.user.display_name()),
        ));
        self.user = Some(verified.user);
        self.token = Some(verified.token);
        self.dialog = None;

        self.reload().await;
        true
    }

    /// End the session and forget the user's votes.
    #[instrument(skip(self))]
    pub fn logout(&mut self) {
        if let Err(e) = self.session.clear() {
            self.fail("Could not clear the stored session", &e.into());
        }
        if let Some(user) = self.user.take() {
            info!(user_id = %user.id, "Signed out");
        }
        self.token = None;
        self.votes.clear();
        self.dialog = None;
        if !self.tab.is_visible_to(None) {
            self.tab = Tab::Home;
        }
        self.sync_cards();
        self.notices.push(Notice::info("Signed out", ""));
    }

    // ========================================================================
    // Voting
    // ========================================================================

    /// Choose an option on a poll card.
    pub fn select_option(&mut self, poll: PollId, option: OptionId) -> bool {
        let result = match (self.polls.iter().find(|p| p.id == poll), self.cards.get_mut(&poll)) {
            (Some(p), Some(card)) => card.select(p, option).map_err(ClientError::from),
            _ => Err(ClientError::PollNotFound(poll.as_i32())),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                self.fail("Cannot select option", &e);
                false
            }
        }
    }

    /// Submit the selected option. Requires a signed-in user; otherwise the
    /// sign-in dialog opens. Once the request has been sent, polls and vote
    /// history are reloaded whether or not the vote was accepted.
    #[instrument(skip(self), fields(poll_id = %poll))]
    pub async fn submit_vote(&mut self, poll: PollId) -> bool {
        let Some(user_id) = self.user.as_ref().map(|u| u.id) else {
            self.fail("Sign in to vote", &ValidationError::NotSignedIn.into());
            self.open_auth();
            return false;
        };
        let option = match self.cards.get_mut(&poll) {
            Some(card) => card.begin_submit().map_err(ClientError::from),
            None => Err(ClientError::PollNotFound(poll.as_i32())),
        };
        let option = match option {
            Ok(option) => option,
            Err(e) => {
                self.fail("Cannot vote", &e);
                return false;
            }
        };

        self.pending.insert(Action::Vote(poll));
        let result = self.gateway.vote(poll, option, user_id).await;
        self.pending.remove(&Action::Vote(poll));
        if let Some(card) = self.cards.get_mut(&poll) {
            card.finish();
        }

        match result {
            Ok(()) => {
                info!(option_id = %option, "Vote submitted");
                self.notices
                    .push(Notice::success("Vote counted", "Thanks for voting"));
                self.reload().await;
                true
            }
            Err(e) => {
                self.fail("Vote failed", &e);
                // The rejection may mean the local view is stale.
                self.reload().await;
                false
            }
        }
    }

    // ========================================================================
    // Administration
    // ========================================================================

    /// Open the create-poll dialog with an empty draft. Owner only.
    pub fn open_create(&mut self) -> bool {
        if let Err(e) = self.require_owner() {
            self.fail("Cannot create poll", &e);
            return false;
        }
        self.dialog = Some(Dialog::CreatePoll(PollDraft::new()));
        true
    }

    /// The draft, if the create dialog is open.
    pub const fn draft_mut(&mut self) -> Option<&mut PollDraft> {
        match &mut self.dialog {
            Some(Dialog::CreatePoll(draft)) => Some(draft),
            _ => None,
        }
    }

    /// Submit the draft. On success the dialog closes and the list reloads;
    /// on failure the dialog stays open with the draft intact.
    #[instrument(skip(self))]
    pub async fn submit_create(&mut self) -> Option<PollId> {
        let actor = match self.require_owner() {
            Ok(actor) => actor,
            Err(e) => {
                self.fail("Cannot create poll", &e);
                return None;
            }
        };
        let Some(Dialog::CreatePoll(draft)) = &self.dialog else {
            debug!("Create submitted with no draft open");
            return None;
        };

        self.pending.insert(Action::CreatePoll);
        let result = self.gateway.create_poll(draft, actor).await;
        self.pending.remove(&Action::CreatePoll);

        match result {
            Ok(id) => {
                info!(poll_id = %id, "Poll created");
                self.dialog = None;
                self.notices.push(Notice::success("Poll created", ""));
                self.reload_polls().await;
                Some(id)
            }
            Err(e) => {
                let sent = !e.is_validation();
                self.fail("Could not create poll", &e);
                if sent {
                    self.reload_polls().await;
                }
                None
            }
        }
    }

    /// Ask to delete a poll. Owner only; opens a confirmation dialog.
    pub fn request_delete(&mut self, poll: PollId) -> bool {
        let confirm = self
            .require_owner()
            .and_then(|_| self.poll_title(poll))
            .map(|title| Confirm::Delete { poll, title });
        self.open_confirm("Cannot delete poll", confirm)
    }

    /// Ask to close an active poll or reopen a closed one. Owner only; opens
    /// a confirmation dialog.
    pub fn request_status_toggle(&mut self, poll: PollId) -> bool {
        let confirm = self.require_owner().and_then(|_| {
            let p = self
                .poll(poll)
                .ok_or(ClientError::PollNotFound(poll.as_i32()))?;
            Ok(Confirm::SetStatus {
                poll,
                title: p.title.clone(),
                to: p.status.toggled(),
            })
        });
        self.open_confirm("Cannot change status", confirm)
    }

    fn poll_title(&self, poll: PollId) -> Result<String, ClientError> {
        self.poll(poll)
            .map(|p| p.title.clone())
            .ok_or(ClientError::PollNotFound(poll.as_i32()))
    }

    fn open_confirm(&mut self, title: &str, confirm: Result<Confirm, ClientError>) -> bool {
        match confirm {
            Ok(confirm) => {
                self.dialog = Some(Dialog::Confirm(confirm));
                true
            }
            Err(e) => {
                self.fail(title, &e);
                false
            }
        }
    }

    /// Carry out the pending confirmation, then reload the poll list.
    #[instrument(skip(self))]
    pub async fn confirm(&mut self) -> bool {
        let Some(Dialog::Confirm(confirm)) = self.dialog.take() else {
            return false;
        };
        let actor = match self.require_owner() {
            Ok(actor) => actor,
            Err(e) => {
                self.fail("Action not allowed", &e);
                return false;
            }
        };

        let (action, result, done, failed) = match confirm {
            Confirm::Delete { poll, .. } => {
                self.pending.insert(Action::DeletePoll(poll));
                let result = self.gateway.delete_poll(poll, actor).await;
                self.pending.remove(&Action::DeletePoll(poll));
                (poll, result, "Poll deleted", "Could not delete poll")
            }
            Confirm::SetStatus { poll, to, .. } => {
                self.pending.insert(Action::SetStatus(poll));
                let result = self.gateway.set_status(poll, to, actor).await;
                self.pending.remove(&Action::SetStatus(poll));
                let done = if to.is_active() {
                    "Voting reopened"
                } else {
                    "Voting closed"
                };
                (poll, result, done, "Could not change poll status")
            }
        };

        let ok = match result {
            Ok(()) => {
                info!(poll_id = %action, "{done}");
                self.notices.push(Notice::success(done, ""));
                true
            }
            Err(e) => {
                self.fail(failed, &e);
                false
            }
        };
        self.reload_polls().await;
        ok
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex, PoisonError};

    use quorum_core::{Email, PollOption, PollStatus, Role, UserId};
    use secrecy::ExposeSecret;

    use super::*;
    use crate::card::CardState;
    use crate::error::CONNECTION_PROBLEM;
    use crate::gateway::{CodeIssued, Verified};
    use crate::notice::NoticeLevel;
    use crate::session::{MemoryBackend, keys};

    // ========================================================================
    // In-memory gateway
    // ========================================================================

    const OWNER_EMAIL: &str = "owner@example.com";

    #[derive(Default)]
    struct FakeState {
        polls: Vec<Poll>,
        voted: Vec<(UserId, PollId)>,
        calls: usize,
        offline: bool,
        next_id: i32,
    }

    #[derive(Clone, Default)]
    struct FakeGateway {
        state: Arc<Mutex<FakeState>>,
    }

    impl FakeGateway {
        fn with_polls(polls: Vec<Poll>) -> Self {
            let gateway = Self::default();
            gateway.lock().polls = polls;
            gateway.lock().next_id = 100;
            gateway
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        fn calls(&self) -> usize {
            self.lock().calls
        }

        fn go_offline(&self) {
            self.lock().offline = true;
        }

        fn enter(&self) -> Result<std::sync::MutexGuard<'_, FakeState>, ClientError> {
            let mut state = self.lock();
            if state.offline {
                return Err(ClientError::Network("connection refused".to_string()));
            }
            state.calls += 1;
            Ok(state)
        }
    }

    fn user_for(email: &Email) -> User {
        let owner = email.as_str() == OWNER_EMAIL;
        User {
            id: UserId::new(if owner { 1 } else { 2 }),
            email: email.clone(),
            phone: None,
            name: email.local_part().to_string(),
            role: if owner { Role::Owner } else { Role::Member },
        }
    }

    impl PollGateway for FakeGateway {
        async fn request_code(
            &self,
            email: &str,
            _name: Option<&str>,
        ) -> Result<CodeIssued, ClientError> {
            Email::parse(email).map_err(ValidationError::from)?;
            drop(self.enter()?);
            Ok(CodeIssued {
                demo_code: Some("123456".to_string()),
                message: None,
            })
        }

        async fn verify_code(&self, email: &str, code: &str) -> Result<Verified, ClientError> {
            let email = Email::parse(email).map_err(ValidationError::from)?;
            quorum_core::VerificationCode::parse(code).map_err(ValidationError::from)?;
            drop(self.enter()?);
            if code != "123456" {
                return Err(ClientError::Auth("Invalid code".to_string()));
            }
            Ok(Verified {
                token: SecretString::from(format!("token-{email}")),
                user: user_for(&email),
            })
        }

        async fn list_polls(&self) -> Result<Vec<Poll>, ClientError> {
            Ok(self.enter()?.polls.clone())
        }

        async fn list_user_votes(&self, user: UserId) -> Result<Vec<UserVote>, ClientError> {
            let state = self.enter()?;
            Ok(state
                .voted
                .iter()
                .filter(|(u, _)| *u == user)
                .map(|(_, p)| UserVote::on_poll(*p))
                .collect())
        }

        async fn vote(
            &self,
            poll: PollId,
            option: OptionId,
            user: UserId,
        ) -> Result<(), ClientError> {
            let mut state = self.enter()?;
            if state.voted.contains(&(user, poll)) {
                return Err(ClientError::Server(
                    "User already voted in this poll".to_string(),
                ));
            }
            let target = state
                .polls
                .iter_mut()
                .find(|p| p.id == poll)
                .and_then(|p| p.options.iter_mut().find(|o| o.id == option))
                .ok_or_else(|| ClientError::Server("Option not found".to_string()))?;
            target.vote_count += 1;
            state.voted.push((user, poll));
            Ok(())
        }

        async fn create_poll(&self, draft: &PollDraft, actor: Actor) -> Result<PollId, ClientError> {
            let new_poll = draft.validate()?;
            let mut state = self.enter()?;
            if !actor.role.is_owner() {
                return Err(ClientError::Server("Forbidden".to_string()));
            }
            state.next_id += 1;
            let id = state.next_id;
            state.polls.push(Poll {
                id: PollId::new(id),
                title: new_poll.title,
                description: new_poll.description,
                status: PollStatus::Active,
                options: new_poll
                    .options
                    .into_iter()
                    .zip(1..)
                    .map(|(text, n)| PollOption {
                        id: OptionId::new(id * 10 + n),
                        text,
                        vote_count: 0,
                    })
                    .collect(),
                created_by: Some(actor.user_id),
                created_at: None,
                creator_name: None,
            });
            Ok(PollId::new(id))
        }

        async fn delete_poll(&self, poll: PollId, _actor: Actor) -> Result<(), ClientError> {
            self.enter()?.polls.retain(|p| p.id != poll);
            Ok(())
        }

        async fn set_status(
            &self,
            poll: PollId,
            status: PollStatus,
            _actor: Actor,
        ) -> Result<(), ClientError> {
            let mut state = self.enter()?;
            let p = state
                .polls
                .iter_mut()
                .find(|p| p.id == poll)
                .ok_or_else(|| ClientError::Server("Poll not found".to_string()))?;
            p.status = status;
            Ok(())
        }
    }

    fn sample_poll(id: i32, status: PollStatus) -> Poll {
        Poll {
            id: PollId::new(id),
            title: format!("Poll {id}"),
            description: String::new(),
            status,
            options: (1..=3)
                .map(|n| PollOption {
                    id: OptionId::new(id * 10 + n),
                    text: format!("Choice {n}"),
                    vote_count: 0,
                })
                .collect(),
            created_by: Some(UserId::new(1)),
            created_at: None,
            creator_name: Some("owner".to_string()),
        }
    }

    type Controller = PageController<FakeGateway, MemoryBackend>;

    async fn mounted(polls: Vec<Poll>) -> (Controller, FakeGateway, MemoryBackend) {
        let gateway = FakeGateway::with_polls(polls);
        let backend = MemoryBackend::new();
        let mut controller =
            PageController::new(gateway.clone(), SessionStore::new(backend.clone()));
        controller.mount().await;
        (controller, gateway, backend)
    }

    async fn sign_in(controller: &mut Controller, email: &str) {
        controller.open_auth();
        controller.auth_flow_mut().unwrap().email = email.to_string();
        assert!(controller.request_code().await);
        controller.auth_flow_mut().unwrap().set_code("123456");
        assert!(controller.verify_code().await);
        controller.drain_notices();
    }

    // ========================================================================
    // Session and sign-in
    // ========================================================================

    #[tokio::test]
    async fn test_mount_signed_out() {
        let (controller, _, _) = mounted(vec![sample_poll(1, PollStatus::Active)]).await;
        assert!(controller.user().is_none());
        assert_eq!(controller.polls().len(), 1);
        assert_eq!(
            controller.visible_tabs(),
            vec![Tab::Home, Tab::Polls, Tab::Results]
        );
    }

    #[tokio::test]
    async fn test_sign_in_persists_session_and_shows_demo_code() {
        let (mut controller, _, backend) = mounted(vec![]).await;
        controller.open_auth();
        controller.auth_flow_mut().unwrap().email = "Owner@Example.com".to_string();
        assert!(controller.request_code().await);

        assert_eq!(controller.auth_flow().unwrap().step(), AuthStep::Code);
        let notices = controller.drain_notices();
        assert_eq!(notices.first().unwrap().level, NoticeLevel::Info);
        assert!(notices.first().unwrap().message.contains("123456"));

        controller.auth_flow_mut().unwrap().set_code("123456");
        assert!(controller.verify_code().await);

        assert!(controller.dialog().is_none());
        assert!(controller.user().unwrap().is_owner());
        assert!(controller.visible_tabs().contains(&Tab::Admin));
        assert!(backend.read(keys::USER).unwrap().is_some());
        assert_eq!(
            backend.read(keys::AUTH_TOKEN).unwrap().as_deref(),
            Some("token-owner@example.com")
        );
    }

    #[tokio::test]
    async fn test_invalid_email_sends_nothing() {
        let (mut controller, gateway, _) = mounted(vec![]).await;
        let before = gateway.calls();

        controller.open_auth();
        controller.auth_flow_mut().unwrap().email = "not-an-email".to_string();
        assert!(!controller.request_code().await);

        assert_eq!(gateway.calls(), before);
        assert_eq!(controller.auth_flow().unwrap().step(), AuthStep::Email);
        assert!(controller.drain_notices().first().unwrap().is_error());
        assert!(!controller.is_pending(Action::RequestCode));
    }

    #[tokio::test]
    async fn test_wrong_code_keeps_dialog_open() {
        let (mut controller, _, backend) = mounted(vec![]).await;
        controller.open_auth();
        controller.auth_flow_mut().unwrap().email = OWNER_EMAIL.to_string();
        assert!(controller.request_code().await);
        controller.auth_flow_mut().unwrap().set_code("000000");

        assert!(!controller.verify_code().await);
        assert!(controller.user().is_none());
        assert!(controller.auth_flow().is_some());
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_verify_before_request_is_rejected() {
        let (mut controller, gateway, _) = mounted(vec![]).await;
        let before = gateway.calls();
        controller.open_auth();
        assert!(!controller.verify_code().await);
        assert_eq!(gateway.calls(), before);
    }

    #[tokio::test]
    async fn test_mount_restores_stored_session() {
        let backend = MemoryBackend::new();
        let store = SessionStore::new(backend.clone());
        let owner = user_for(&Email::parse(OWNER_EMAIL).unwrap());
        store.save(&owner, &SecretString::from("stored")).unwrap();

        let gateway = FakeGateway::with_polls(vec![]);
        let mut controller = PageController::new(gateway, store);
        controller.mount().await;

        assert_eq!(controller.user(), Some(&owner));
        assert_eq!(controller.token().unwrap().expose_secret(), "stored");
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_hides_owner_tabs() {
        let (mut controller, _, backend) = mounted(vec![]).await;
        sign_in(&mut controller, OWNER_EMAIL).await;
        assert!(controller.set_tab(Tab::Admin));

        controller.logout();
        assert!(backend.is_empty());
        assert!(controller.user().is_none());
        assert_eq!(controller.tab(), Tab::Home);
        assert!(!controller.visible_tabs().contains(&Tab::Admin));
        assert!(!controller.set_tab(Tab::Profile));

        controller.mount().await;
        assert!(controller.user().is_none());
    }

    // ========================================================================
    // Voting
    // ========================================================================

    #[tokio::test]
    async fn test_vote_reloads_and_marks_card_voted() {
        let (mut controller, _, _) = mounted(vec![sample_poll(1, PollStatus::Active)]).await;
        sign_in(&mut controller, "voter@example.com").await;
        let poll = PollId::new(1);

        assert!(controller.select_option(poll, OptionId::new(12)));
        assert!(controller.submit_vote(poll).await);

        assert_eq!(controller.card(poll).unwrap().state(), CardState::Voted);
        assert!(controller.has_voted(poll));
        assert_eq!(controller.poll(poll).unwrap().total_votes(), 1);
        assert_eq!(controller.stats().my_votes, 1);
        assert!(!controller.is_pending(Action::Vote(poll)));
        assert!(!controller.select_option(poll, OptionId::new(11)));
    }

    #[tokio::test]
    async fn test_vote_without_selection_sends_nothing() {
        let (mut controller, gateway, _) = mounted(vec![sample_poll(1, PollStatus::Active)]).await;
        sign_in(&mut controller, "voter@example.com").await;
        let before = gateway.calls();

        assert!(!controller.submit_vote(PollId::new(1)).await);
        assert_eq!(gateway.calls(), before);
        assert!(controller.drain_notices().first().unwrap().is_error());
    }

    #[tokio::test]
    async fn test_vote_signed_out_opens_sign_in() {
        let (mut controller, _, _) = mounted(vec![sample_poll(1, PollStatus::Active)]).await;
        assert!(controller.select_option(PollId::new(1), OptionId::new(11)));
        assert!(!controller.submit_vote(PollId::new(1)).await);
        assert!(controller.auth_flow().is_some());
    }

    #[tokio::test]
    async fn test_failed_vote_returns_card_to_idle() {
        let (mut controller, gateway, _) = mounted(vec![sample_poll(1, PollStatus::Active)]).await;
        sign_in(&mut controller, "voter@example.com").await;
        let poll = PollId::new(1);
        assert!(controller.select_option(poll, OptionId::new(11)));

        gateway.go_offline();
        assert!(!controller.submit_vote(poll).await);

        let card = controller.card(poll).unwrap();
        assert_eq!(card.state(), CardState::Idle);
        let notice = controller.drain_notices().into_iter().next().unwrap();
        assert_eq!(notice.message, CONNECTION_PROBLEM);
    }

    #[tokio::test]
    async fn test_rejected_vote_reloads_stale_card() {
        let (mut stale, gateway, _) = mounted(vec![sample_poll(1, PollStatus::Active)]).await;
        sign_in(&mut stale, "voter@example.com").await;
        let poll = PollId::new(1);

        // Another page for the same user votes first.
        gateway
            .vote(poll, OptionId::new(12), UserId::new(2))
            .await
            .unwrap();

        assert!(stale.select_option(poll, OptionId::new(11)));
        assert!(!stale.submit_vote(poll).await);

        assert_eq!(stale.card(poll).unwrap().state(), CardState::Voted);
        assert!(stale.has_voted(poll));
        assert_eq!(stale.poll(poll).unwrap().total_votes(), 1);
        let notice = stale.drain_notices().into_iter().next().unwrap();
        assert_eq!(notice.message, "User already voted in this poll");
    }

    #[tokio::test]
    async fn test_closed_poll_is_not_selectable() {
        let (mut controller, _, _) = mounted(vec![sample_poll(1, PollStatus::Closed)]).await;
        assert!(!controller.select_option(PollId::new(1), OptionId::new(11)));
        assert_eq!(
            controller.card(PollId::new(1)).unwrap().badge(),
            "Voting closed"
        );
    }

    #[tokio::test]
    async fn test_reload_failures_are_independent() {
        let (mut controller, gateway, _) = mounted(vec![sample_poll(1, PollStatus::Active)]).await;
        gateway.go_offline();
        controller.reload().await;

        assert_eq!(controller.polls().len(), 1);
        assert!(controller.drain_notices().iter().all(Notice::is_error));
        assert!(!controller.is_pending(Action::Load));
    }

    // ========================================================================
    // Administration
    // ========================================================================

    #[tokio::test]
    async fn test_owner_closes_poll_after_confirmation() {
        let (mut controller, gateway, _) = mounted(vec![sample_poll(1, PollStatus::Active)]).await;
        sign_in(&mut controller, OWNER_EMAIL).await;
        let poll = PollId::new(1);
        let before = gateway.calls();

        assert!(controller.request_status_toggle(poll));
        assert_eq!(gateway.calls(), before);
        assert!(matches!(
            controller.dialog(),
            Some(Dialog::Confirm(Confirm::SetStatus {
                to: PollStatus::Closed,
                ..
            }))
        ));

        assert!(controller.confirm().await);
        assert_eq!(controller.poll(poll).unwrap().status, PollStatus::Closed);
        assert_eq!(controller.card(poll).unwrap().state(), CardState::Closed);
        assert!(!controller.select_option(poll, OptionId::new(11)));
    }

    #[tokio::test]
    async fn test_cancelled_delete_sends_nothing() {
        let (mut controller, gateway, _) = mounted(vec![sample_poll(1, PollStatus::Active)]).await;
        sign_in(&mut controller, OWNER_EMAIL).await;
        let before = gateway.calls();

        assert!(controller.request_delete(PollId::new(1)));
        controller.close_dialog();
        assert!(!controller.confirm().await);

        assert_eq!(gateway.calls(), before);
        assert_eq!(controller.polls().len(), 1);
    }

    #[tokio::test]
    async fn test_owner_deletes_poll() {
        let (mut controller, _, _) = mounted(vec![
            sample_poll(1, PollStatus::Active),
            sample_poll(2, PollStatus::Active),
        ])
        .await;
        sign_in(&mut controller, OWNER_EMAIL).await;

        assert!(controller.request_delete(PollId::new(1)));
        assert!(controller.confirm().await);
        assert!(controller.poll(PollId::new(1)).is_none());
        assert!(controller.card(PollId::new(1)).is_none());
    }

    #[tokio::test]
    async fn test_member_cannot_manage_polls() {
        let (mut controller, gateway, _) = mounted(vec![sample_poll(1, PollStatus::Active)]).await;
        sign_in(&mut controller, "voter@example.com").await;
        let before = gateway.calls();

        assert!(!controller.request_delete(PollId::new(1)));
        assert!(!controller.request_status_toggle(PollId::new(1)));
        assert!(!controller.open_create());
        assert!(controller.dialog().is_none());
        assert_eq!(gateway.calls(), before);
        assert!(controller.drain_notices().iter().all(Notice::is_error));
    }

    #[tokio::test]
    async fn test_create_poll_reloads_list() {
        let (mut controller, _, _) = mounted(vec![]).await;
        sign_in(&mut controller, OWNER_EMAIL).await;

        assert!(controller.open_create());
        let draft = controller.draft_mut().unwrap();
        draft.title = "Lunch?".to_string();
        draft.update_option(0, "Pizza");
        draft.update_option(1, "Sushi");

        let id = controller.submit_create().await.unwrap();
        assert!(controller.dialog().is_none());
        assert_eq!(controller.poll(id).unwrap().options.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_draft_keeps_dialog_open() {
        let (mut controller, gateway, _) = mounted(vec![]).await;
        sign_in(&mut controller, OWNER_EMAIL).await;
        let before = gateway.calls();

        assert!(controller.open_create());
        controller.draft_mut().unwrap().title = "Lonely".to_string();
        controller.draft_mut().unwrap().update_option(0, "Only option");

        assert!(controller.submit_create().await.is_none());
        assert!(controller.draft_mut().is_some());
        assert_eq!(gateway.calls(), before);
    }
}
