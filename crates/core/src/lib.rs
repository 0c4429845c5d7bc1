//! Mattress Locator Core - Shared domain library.
//!
//! This crate provides the types and logic used by the `site` crate:
//! store records and form drafts, the store search filter, the in-memory
//! store directory, and the admin gate.
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients. Persistence and identity live in the hosted backend, which the
//! site crate talks to.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, store records and drafts
//! - [`search`] - Case-insensitive store search
//! - [`directory`] - In-memory projection of the backend store list
//! - [`gate`] - Access levels and admin policy

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod directory;
pub mod gate;
pub mod search;
pub mod types;

pub use directory::StoreDirectory;
pub use gate::{AccessLevel, AdminPolicy, Identity};
pub use search::{SearchMode, SearchOutcome, search_stores};
pub use types::*;
