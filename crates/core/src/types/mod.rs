//! Core types for the store locator.
//!
//! This module provides type-safe wrappers for identifiers and emails, and
//! the store record and form types shared by the site.

pub mod email;
pub mod id;
pub mod store;

pub use email::{Email, EmailError};
pub use id::*;
pub use store::{DraftError, NewStore, RequiredField, StoreDraft, StoreFields, StoreRecord};
