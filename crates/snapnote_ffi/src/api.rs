//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose auth and notes-screen actions to Dart via FRB.
//! - Keep notes-screen state between calls; Dart only renders envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - At most one notes action runs at a time; a concurrent call is rejected
//!   with `status=busy`, never queued.
//! - Envelope `message` strings are shown to the user verbatim.

use log::{info, warn};
use snapnote_core::db::open_db;
use snapnote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AuthService, BackendConfig, ControllerError, DraftState, Flow, LocalMediaFile, NoteController,
    NotesScreenState, SqliteIdentityService, SqliteObjectStore, SqliteRecordStore,
};
use std::sync::{Mutex, OnceLock, TryLockError};

pub const STATUS_OK: &str = "ok";
pub const STATUS_UNAUTHENTICATED: &str = "unauthenticated";
pub const STATUS_VALIDATION: &str = "validation";
pub const STATUS_MEDIA_READ: &str = "media_read";
pub const STATUS_BACKEND: &str = "backend";
pub const STATUS_BUSY: &str = "busy";
pub const STATUS_INTERNAL: &str = "internal";

const BUSY_MESSAGE: &str = "Another action is still in progress.";

static BACKEND_CONFIG: OnceLock<BackendConfig> = OnceLock::new();
static SCREEN_STATE: Mutex<Option<NotesScreenState>> = Mutex::new(None);

type SqliteController<'c> =
    NoteController<SqliteIdentityService<'c>, SqliteObjectStore<'c>, SqliteRecordStore<'c>>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Result of a sign-in or sign-up attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub ok: bool,
    /// Signed-in user id on success.
    pub user_id: Option<String>,
    pub message: String,
}

impl AuthResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            user_id: None,
            message: message.into(),
        }
    }
}

/// One note row as rendered by the notes screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: i64,
    pub title: String,
    pub body: String,
    /// Stored object path of the attachment.
    pub media_path: Option<String>,
    /// Public URL of the attachment, ready for an image/video widget.
    pub media_url: Option<String>,
}

/// Notes-screen envelope returned by every `notes_*` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesResponse {
    pub ok: bool,
    /// One of `ok|unauthenticated|validation|media_read|backend|busy|internal`.
    pub status: String,
    pub message: String,
    /// Cached note list after the action, newest first.
    pub items: Vec<NoteItem>,
    pub composing: bool,
    pub draft_title: String,
    pub draft_body: String,
    pub pending_media_path: Option<String>,
}

impl NotesResponse {
    fn rejected(status: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            status: status.to_string(),
            message: message.into(),
            items: Vec::new(),
            composing: false,
            draft_title: String::new(),
            draft_body: String::new(),
            pending_media_path: None,
        }
    }
}

/// Signs in with email and password.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; validation and backend messages are returned verbatim.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_sign_in(email: String, password: String) -> AuthResponse {
    with_auth_service(|auth| auth.sign_in(&email, &password), "Signed in.")
}

/// Registers a new account and signs it in.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_sign_up(email: String, password: String) -> AuthResponse {
    with_auth_service(|auth| auth.sign_up(&email, &password), "Account created.")
}

/// Resolves the current user and reloads their notes.
///
/// `status=unauthenticated` means Dart must route to the login screen.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_load() -> NotesResponse {
    run_notes_action("notes_load", |controller| {
        let outcome = controller
            .load_current_user_and_notes()
            .map(|flow| flow.map(|_| ()));
        respond(controller, outcome, "Notes loaded.")
    })
}

/// Opens the composer.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_open_composer() -> NotesResponse {
    run_notes_action("notes_open_composer", |controller| {
        controller.open_composer();
        respond(controller, Ok(Flow::Ready(())), "")
    })
}

/// Closes the composer and discards the draft, removing any pending upload.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_cancel_composer() -> NotesResponse {
    run_notes_action("notes_cancel_composer", |controller| {
        controller.cancel_draft();
        respond(controller, Ok(Flow::Ready(())), "")
    })
}

/// Mirrors the composer text fields into the draft.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_set_draft(title: String, body: String) -> NotesResponse {
    run_notes_action("notes_set_draft", |controller| {
        controller.set_title(title);
        controller.set_body(body);
        respond(controller, Ok(Flow::Ready(())), "")
    })
}

/// Uploads a picked gallery file as the draft attachment.
///
/// Input semantics:
/// - `uri`: local file path or `file://` URI handed over by the picker.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_pick_media(uri: String) -> NotesResponse {
    run_notes_action("notes_pick_media", |controller| {
        let outcome = controller
            .pick_and_upload_media(&LocalMediaFile::new(uri))
            .map(|flow| flow.map(|_| ()));
        respond(controller, outcome, "Media attached.")
    })
}

/// Saves the draft as a new note.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_create() -> NotesResponse {
    run_notes_action("notes_create", |controller| {
        let outcome = controller.create_note().map(|flow| flow.map(|_| ()));
        respond(controller, outcome, "Note created.")
    })
}

/// Deletes one note by id.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_delete(note_id: i64) -> NotesResponse {
    run_notes_action("notes_delete", |controller| {
        let outcome = controller.delete_note(note_id).map(|flow| flow.map(|_| ()));
        respond(controller, outcome, "Note deleted.")
    })
}

/// Signs out and clears the notes screen.
///
/// On success the envelope carries `status=unauthenticated` so Dart leaves
/// the notes screen through the same path as an expired session.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_logout() -> NotesResponse {
    run_notes_action("notes_logout", |controller| {
        let outcome = controller.logout().map(|()| Flow::Unauthenticated);
        respond(controller, outcome, "Signed out.")
    })
}

fn backend_config() -> &'static BackendConfig {
    BACKEND_CONFIG.get_or_init(|| match BackendConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            warn!("event=config_resolve module=ffi status=fallback error={err}");
            BackendConfig::default()
        }
    })
}

fn with_auth_service(
    f: impl FnOnce(
        &AuthService<SqliteIdentityService<'_>>,
    ) -> Result<snapnote_core::Session, snapnote_core::AuthError>,
    success_message: &str,
) -> AuthResponse {
    let config = backend_config();
    let conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => return AuthResponse::failure(format!("auth DB open failed: {err}")),
    };
    let identity = match SqliteIdentityService::try_new(&conn) {
        Ok(identity) => identity,
        Err(err) => return AuthResponse::failure(format!("auth init failed: {err}")),
    };

    match f(&AuthService::new(identity)) {
        Ok(session) => AuthResponse {
            ok: true,
            user_id: Some(session.user.id.to_string()),
            message: success_message.to_string(),
        },
        Err(err) => AuthResponse::failure(err.to_string()),
    }
}

/// Runs one notes action against the shared screen state.
///
/// The controller is rebuilt per call over a fresh connection; only the
/// screen state survives between calls.
fn run_notes_action(
    action: &str,
    f: impl for<'c> FnOnce(&mut SqliteController<'c>) -> NotesResponse,
) -> NotesResponse {
    let mut slot = match SCREEN_STATE.try_lock() {
        Ok(guard) => guard,
        Err(TryLockError::WouldBlock) => {
            warn!("event={action} module=ffi status=busy");
            return NotesResponse::rejected(STATUS_BUSY, BUSY_MESSAGE);
        }
        Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
    };

    let config = backend_config();
    let conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) => {
            return NotesResponse::rejected(STATUS_INTERNAL, format!("{action} failed: {err}"))
        }
    };
    let services = SqliteIdentityService::try_new(&conn).and_then(|identity| {
        let objects = SqliteObjectStore::try_new(
            &conn,
            config.media_bucket.as_str(),
            config.public_base_url.as_str(),
        )?;
        let records = SqliteRecordStore::try_new(&conn)?;
        Ok((identity, objects, records))
    });
    let (identity, objects, records) = match services {
        Ok(services) => services,
        Err(err) => {
            return NotesResponse::rejected(STATUS_INTERNAL, format!("{action} failed: {err}"))
        }
    };

    let mut controller =
        NoteController::with_state(identity, objects, records, slot.take().unwrap_or_default());
    let response = f(&mut controller);
    *slot = Some(controller.into_state());
    info!(
        "event={action} module=ffi status={} item_count={}",
        response.status,
        response.items.len()
    );
    response
}

fn respond(
    controller: &SqliteController<'_>,
    outcome: Result<Flow<()>, ControllerError>,
    success_message: &str,
) -> NotesResponse {
    let (ok, status, message) = match outcome {
        Ok(Flow::Ready(())) => (true, STATUS_OK, success_message.to_string()),
        Ok(Flow::Unauthenticated) => (true, STATUS_UNAUTHENTICATED, success_message.to_string()),
        Err(err) => (false, error_status(&err), err.to_string()),
    };

    let items = controller
        .notes()
        .iter()
        .map(|note| NoteItem {
            id: note.id,
            title: note.title.clone(),
            body: note.body.clone(),
            media_path: note.media.clone(),
            media_url: controller.media_url(note),
        })
        .collect();
    let draft = controller.draft();

    NotesResponse {
        ok,
        status: status.to_string(),
        message,
        items,
        composing: controller.draft_state() == DraftState::Composing,
        draft_title: draft.title.clone(),
        draft_body: draft.body.clone(),
        pending_media_path: draft.pending_media_path.clone(),
    }
}

fn error_status(err: &ControllerError) -> &'static str {
    match err {
        ControllerError::Validation(_) => STATUS_VALIDATION,
        ControllerError::MediaRead(_) => STATUS_MEDIA_READ,
        ControllerError::Backend(_) => STATUS_BACKEND,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        auth_sign_in, auth_sign_up, core_version, init_logging, notes_cancel_composer,
        notes_create, notes_delete, notes_load, notes_logout, notes_open_composer,
        notes_pick_media, notes_set_draft, ping, SCREEN_STATE, STATUS_BUSY, STATUS_OK,
        STATUS_UNAUTHENTICATED, STATUS_VALIDATION,
    };
    use snapnote_core::db::open_db;
    use snapnote_core::MISSING_CREDENTIALS_MESSAGE;
    use std::sync::Mutex;
    use std::time::{SystemTime, UNIX_EPOCH};

    // Notes actions share one process-wide screen state.
    static NOTES_TESTS: Mutex<()> = Mutex::new(());

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn auth_requires_email_and_password() {
        let response = auth_sign_in("  ".to_string(), "secret1".to_string());
        assert!(!response.ok);
        assert_eq!(response.user_id, None);
        assert_eq!(response.message, MISSING_CREDENTIALS_MESSAGE);
    }

    #[test]
    fn notes_action_is_rejected_while_another_is_running() {
        let _serial = NOTES_TESTS.lock().unwrap_or_else(|err| err.into_inner());
        let _running = SCREEN_STATE.lock().unwrap_or_else(|err| err.into_inner());

        let response = notes_load();
        assert!(!response.ok);
        assert_eq!(response.status, STATUS_BUSY);
    }

    #[test]
    fn notes_flow_runs_end_to_end() {
        let _serial = NOTES_TESTS.lock().unwrap_or_else(|err| err.into_inner());
        let email = format!("{}@example.com", unique_token("ffi-notes"));

        let signed_up = auth_sign_up(email.clone(), "hunter22".to_string());
        assert!(signed_up.ok, "{}", signed_up.message);
        let signed_in = auth_sign_in(email, "hunter22".to_string());
        assert_eq!(signed_in.user_id, signed_up.user_id);

        let loaded = notes_load();
        assert_eq!(loaded.status, STATUS_OK, "{}", loaded.message);
        assert!(loaded.items.is_empty());

        assert!(notes_open_composer().composing);
        let empty = notes_create();
        assert_eq!(empty.status, STATUS_VALIDATION);
        assert_eq!(empty.message, "Please add a title, body, or media.");

        let dir = tempfile::tempdir().expect("tempdir");
        let picked = dir.path().join("clip.mp4");
        std::fs::write(&picked, b"fake mp4").expect("write picked file");
        let attached = notes_pick_media(picked.display().to_string());
        assert_eq!(attached.status, STATUS_OK, "{}", attached.message);
        let media_path = attached
            .pending_media_path
            .clone()
            .expect("upload should set pending media");

        notes_set_draft("Trip".to_string(), "day one".to_string());
        let created = notes_create();
        assert_eq!(created.status, STATUS_OK, "{}", created.message);
        assert!(!created.composing);
        assert_eq!(created.items.len(), 1);
        let item = &created.items[0];
        assert_eq!(item.title, "Trip");
        assert_eq!(item.media_path.as_deref(), Some(media_path.as_str()));
        assert!(item
            .media_url
            .as_deref()
            .is_some_and(|url| url.ends_with(&media_path)));

        let conn: rusqlite::Connection = open_db(&super::backend_config().db_path).expect("open db");
        let content_type: String = conn
            .query_row(
                "SELECT content_type FROM storage_objects WHERE path = ?1;",
                [media_path.as_str()],
                |row| row.get(0),
            )
            .expect("query uploaded object");
        assert_eq!(content_type, "video/mp4");

        notes_open_composer();
        notes_set_draft("scratch".to_string(), String::new());
        let cancelled = notes_cancel_composer();
        assert!(cancelled.draft_title.is_empty());

        let deleted = notes_delete(item.id);
        assert_eq!(deleted.status, STATUS_OK, "{}", deleted.message);
        assert!(deleted.items.is_empty());

        notes_open_composer();
        notes_set_draft("left behind".to_string(), String::new());
        let other_email = format!("{}@example.com", unique_token("ffi-other"));
        let other = auth_sign_up(other_email, "hunter22".to_string());
        assert!(other.ok, "{}", other.message);
        let switched = notes_load();
        assert_eq!(switched.status, STATUS_OK, "{}", switched.message);
        assert!(switched.draft_title.is_empty());
        assert!(!switched.composing);
        assert_eq!(notes_create().status, STATUS_VALIDATION);

        let logged_out = notes_logout();
        assert!(logged_out.ok);
        assert_eq!(logged_out.status, STATUS_UNAUTHENTICATED);
        assert_eq!(notes_load().status, STATUS_UNAUTHENTICATED);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
