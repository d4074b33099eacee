//! Quorum client library.
//!
//! Everything between the remote poll service and a front end:
//!
//! - [`session`] - Persisted sign-in (user record and auth token)
//! - [`gateway`] - Typed calls to the auth, poll and admin endpoints
//! - [`view_model`] - Search, filter, sort and statistics over loaded polls
//! - [`card`] - Per-poll voting state machine and result percentages
//! - [`controller`] - Page state, dialogs, tabs and action orchestration
//!
//! # Example
//!
//! ```no_run
//! use quorum_client::config::ClientConfig;
//! use quorum_client::controller::PageController;
//! use quorum_client::gateway::HttpGateway;
//! use quorum_client::session::{FileBackend, SessionStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let session = SessionStore::new(FileBackend::new(&config.session_dir));
//! let mut page = PageController::new(HttpGateway::new(config.endpoints), session);
//! page.mount().await;
//! for poll in page.view().polls {
//!     println!("{} ({} votes)", poll.title, poll.total_votes());
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod card;
pub mod config;
pub mod controller;
pub mod draft;
pub mod error;
pub mod gateway;
pub mod layout;
pub mod notice;
pub mod session;
pub mod view_model;

pub use config::{ClientConfig, ConfigError, Endpoints, LogFormat};
pub use controller::PageController;
pub use error::{ClientError, ValidationError};
pub use gateway::{HttpGateway, PollGateway};
pub use notice::Notice;
