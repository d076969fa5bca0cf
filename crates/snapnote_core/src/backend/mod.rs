//! Backend capability contracts.
//!
//! # Responsibility
//! - Define the fixed capability surface of the identity service, the note
//!   record store and the media object store.
//! - Carry backend failures as one error envelope whose message is shown to
//!   users verbatim.
//!
//! # Invariants
//! - Implementations never panic; every failure is a `BackendError`.
//! - `RecordStore::list` returns rows ordered by id descending.
//!
//! # See also
//! - `backend::sqlite` for the embedded implementation.

use crate::model::note::{NewNote, Note, NoteId};
use crate::model::user::{Session, User, UserId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite;

pub type BackendResult<T> = Result<T, BackendError>;

/// Capability that produced a `BackendError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendService {
    Identity,
    Records,
    Objects,
}

impl BackendService {
    /// Stable label used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Records => "records",
            Self::Objects => "objects",
        }
    }
}

/// Failure reported by a backend capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    pub service: BackendService,
    /// Machine-readable code, e.g. `invalid_credentials`.
    pub code: String,
    /// Human-readable message, surfaced to users unchanged.
    pub message: String,
}

impl BackendError {
    pub fn new(
        service: BackendService,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            service,
            code: code.into(),
            message: message.into(),
        }
    }
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for BackendError {}

/// Email/password identity provider.
pub trait IdentityService {
    fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session>;
    fn sign_up(&self, email: &str, password: &str) -> BackendResult<Session>;
    fn sign_out(&self) -> BackendResult<()>;
    /// Returns the signed-in user, or `None` without an active session.
    fn current_user(&self) -> BackendResult<Option<User>>;
}

/// Binary blob storage addressed by path.
pub trait ObjectStore {
    /// Stores `bytes` under `path` and returns the stored path.
    ///
    /// With `upsert = false` an existing object is an error.
    fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        upsert: bool,
    ) -> BackendResult<String>;
    /// Returns the public locator for `path`. Does not check existence.
    fn public_url(&self, path: &str) -> String;
    /// Deletes the object at `path`. Missing objects are not an error.
    fn remove(&self, path: &str) -> BackendResult<()>;
}

/// Owner-scoped note table.
pub trait RecordStore {
    /// Lists all notes of `owner_id`, newest (highest id) first.
    fn list(&self, owner_id: UserId) -> BackendResult<Vec<Note>>;
    /// Inserts one note and returns the assigned id.
    fn insert(&self, note: &NewNote) -> BackendResult<NoteId>;
    /// Deletes one note by id.
    fn delete(&self, note_id: NoteId) -> BackendResult<()>;
}

impl<T: IdentityService + ?Sized> IdentityService for &T {
    fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session> {
        (**self).sign_in(email, password)
    }

    fn sign_up(&self, email: &str, password: &str) -> BackendResult<Session> {
        (**self).sign_up(email, password)
    }

    fn sign_out(&self) -> BackendResult<()> {
        (**self).sign_out()
    }

    fn current_user(&self) -> BackendResult<Option<User>> {
        (**self).current_user()
    }
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        upsert: bool,
    ) -> BackendResult<String> {
        (**self).upload(path, bytes, content_type, upsert)
    }

    fn public_url(&self, path: &str) -> String {
        (**self).public_url(path)
    }

    fn remove(&self, path: &str) -> BackendResult<()> {
        (**self).remove(path)
    }
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn list(&self, owner_id: UserId) -> BackendResult<Vec<Note>> {
        (**self).list(owner_id)
    }

    fn insert(&self, note: &NewNote) -> BackendResult<NoteId> {
        (**self).insert(note)
    }

    fn delete(&self, note_id: NoteId) -> BackendResult<()> {
        (**self).delete(note_id)
    }
}
