//! Quorum Core - Shared types library.
//!
//! This crate provides the domain types used across all Quorum components:
//! - `client` - Session store, remote gateway, view-model and page controller
//! - `cli` - Command-line front end for browsing, voting and poll administration
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients, no persisted state. This keeps it lightweight and allows it to be
//! used anywhere, including by test fakes of the remote service.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, verification codes, statuses, polls and users

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
