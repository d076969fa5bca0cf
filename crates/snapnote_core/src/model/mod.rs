//! Domain model for the notes screen and its backend collaborators.
//!
//! # Responsibility
//! - Define the note record shape shared with the record store.
//! - Define identity, draft and media-attachment value types.
//!
//! # Invariants
//! - Every note is owned by exactly one `UserId`.
//! - Drafts live in memory only and are never persisted.

pub mod draft;
pub mod media;
pub mod note;
pub mod user;
