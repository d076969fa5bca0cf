//! Identity model issued by the identity service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of an authenticated user. Used as the owner key of notes.
pub type UserId = Uuid;

/// Authenticated user as seen by the notes screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
}

/// Active session returned by sign-in and sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    /// Opaque bearer token. Never logged.
    pub access_token: String,
    /// Unix epoch milliseconds.
    pub issued_at_ms: i64,
}
