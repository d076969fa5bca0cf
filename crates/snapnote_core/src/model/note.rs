//! Note domain model.
//!
//! # Responsibility
//! - Define the persisted note record and its insert payload.
//!
//! # Invariants
//! - `id` is assigned by the record store and grows monotonically, so
//!   "newest first" is the same as "id descending".
//! - Notes are never mutated in place; there is no edit path.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

/// Store-assigned note identifier.
pub type NoteId = i64;

/// One persisted note as returned by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub body: String,
    /// Object-store path of the attachment, if any.
    pub media: Option<String>,
    /// Serialized as `user_id` to match the backend column name.
    #[serde(rename = "user_id")]
    pub owner_id: UserId,
}

/// Insert payload for a new note. The store assigns `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    pub title: String,
    pub body: String,
    pub media: Option<String>,
    #[serde(rename = "user_id")]
    pub owner_id: UserId,
}

impl NewNote {
    /// Materializes the stored record once the store has assigned an id.
    pub fn into_note(self, id: NoteId) -> Note {
        Note {
            id,
            title: self.title,
            body: self.body,
            media: self.media,
            owner_id: self.owner_id,
        }
    }
}
