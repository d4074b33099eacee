//! Core types for Quorum.
//!
//! This module provides type-safe wrappers for the polling domain.

pub mod code;
pub mod email;
pub mod id;
pub mod poll;
pub mod status;
pub mod user;

pub use code::{CodeError, VerificationCode};
pub use email::{Email, EmailError};
pub use id::*;
pub use poll::{Poll, PollOption, UserVote};
pub use status::*;
pub use user::User;
