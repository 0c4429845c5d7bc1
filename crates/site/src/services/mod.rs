//! Business logic services for the site.
//!
//! # Services
//!
//! - `directory` - In-memory store list kept in step with the backend table
//! - `auth_events` - Broadcast of session lifecycle changes

pub mod auth_events;
pub mod directory;

pub use auth_events::{AuthEvent, AuthEvents};
pub use directory::DirectoryService;
