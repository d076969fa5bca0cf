//! Core domain logic for SnapNote.
//! This crate owns the note lifecycle rules; UI shells only render its state.

pub mod backend;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;

pub use backend::sqlite::{SqliteIdentityService, SqliteObjectStore, SqliteRecordStore};
pub use backend::{
    BackendError, BackendResult, BackendService, IdentityService, ObjectStore, RecordStore,
};
pub use config::{BackendConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::draft::{DraftState, NoteDraft};
pub use model::media::{content_type_for, LocalMediaFile, MediaSource};
pub use model::note::{NewNote, Note, NoteId};
pub use model::user::{Session, User, UserId};
pub use service::auth_service::{AuthError, AuthService, MISSING_CREDENTIALS_MESSAGE};
pub use service::note_controller::{
    ControllerError, Flow, NoteController, NotesScreenState, EMPTY_NOTE_MESSAGE,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
