//! Note lifecycle controller for the notes screen.
//!
//! # Responsibility
//! - Orchestrate identity, record and object storage calls for
//!   load/create/delete/upload/logout actions.
//! - Own the transient screen state: current user, cached note list, draft
//!   and composer flag.
//!
//! # Invariants
//! - Every cached note is owned by the cached current user.
//! - The draft belongs to the cached current user; it is discarded when
//!   the session ends or switches to another user.
//! - The cached list keeps the record store's order (id descending).
//! - A failed action leaves the cached list and draft as they were.
//! - Mutating actions take `&mut self`, so one controller never runs two
//!   actions at once.
//! - No action retries, times out or rolls back a remote call.

use crate::backend::{BackendError, IdentityService, ObjectStore, RecordStore};
use crate::clock::now_epoch_ms;
use crate::model::draft::{DraftState, NoteDraft};
use crate::model::media::{content_type_for, media_object_path, MediaSource};
use crate::model::note::{NewNote, Note, NoteId};
use crate::model::user::User;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation message for a submit with nothing to save.
pub const EMPTY_NOTE_MESSAGE: &str = "Please add a title, body, or media.";
/// Prefix of every media read failure message.
pub const MEDIA_READ_MESSAGE: &str = "Could not read media file";

/// User-facing failure of one controller action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// Input rejected before any remote call.
    Validation(&'static str),
    /// Picked file could not be read.
    MediaRead(String),
    /// Remote call failed; the message is shown verbatim.
    Backend(BackendError),
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::MediaRead(details) => write!(f, "{MEDIA_READ_MESSAGE}: {details}"),
            Self::Backend(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BackendError> for ControllerError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

/// Control-flow outcome of an action that needs a signed-in user.
///
/// `Unauthenticated` is not an error: the caller must leave the notes screen
/// and route to login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow<T> {
    Ready(T),
    Unauthenticated,
}

impl<T> Flow<T> {
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }

    /// Returns the ready value, or `None` when unauthenticated.
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Unauthenticated => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Flow<U> {
        match self {
            Self::Ready(value) => Flow::Ready(f(value)),
            Self::Unauthenticated => Flow::Unauthenticated,
        }
    }
}

/// Transient notes-screen state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesScreenState {
    pub current_user: Option<User>,
    pub notes: Vec<Note>,
    pub draft: NoteDraft,
    pub draft_state: DraftState,
}

/// Controller over injected backend capabilities.
pub struct NoteController<I, O, R> {
    identity: I,
    objects: O,
    records: R,
    state: NotesScreenState,
}

impl<I, O, R> NoteController<I, O, R>
where
    I: IdentityService,
    O: ObjectStore,
    R: RecordStore,
{
    /// Creates a controller with empty screen state.
    pub fn new(identity: I, objects: O, records: R) -> Self {
        Self::with_state(identity, objects, records, NotesScreenState::default())
    }

    /// Creates a controller resuming previously captured screen state.
    pub fn with_state(identity: I, objects: O, records: R, state: NotesScreenState) -> Self {
        Self {
            identity,
            objects,
            records,
            state,
        }
    }

    /// Releases the screen state so it can outlive the backend handles.
    pub fn into_state(self) -> NotesScreenState {
        self.state
    }

    pub fn state(&self) -> &NotesScreenState {
        &self.state
    }

    pub fn notes(&self) -> &[Note] {
        &self.state.notes
    }

    pub fn current_user(&self) -> Option<&User> {
        self.state.current_user.as_ref()
    }

    pub fn draft(&self) -> &NoteDraft {
        &self.state.draft
    }

    pub fn draft_state(&self) -> DraftState {
        self.state.draft_state
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.state.draft.title = title.into();
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.state.draft.body = body.into();
    }

    pub fn open_composer(&mut self) {
        self.state.draft_state = DraftState::Composing;
    }

    /// Discards the draft and closes the composer.
    ///
    /// An already uploaded attachment would be unreferenced after this, so
    /// it is removed from the object store on a best-effort basis.
    pub fn cancel_draft(&mut self) {
        if let Some(path) = self.state.draft.pending_media_path.take() {
            self.remove_orphan(&path);
        }
        self.state.draft.clear();
        self.state.draft_state = DraftState::Idle;
    }

    /// Opens the composer when idle, cancels the draft when composing.
    pub fn toggle_composer(&mut self) {
        match self.state.draft_state {
            DraftState::Idle => self.open_composer(),
            DraftState::Composing => self.cancel_draft(),
        }
    }

    /// Public locator for a note attachment.
    pub fn media_url(&self, note: &Note) -> Option<String> {
        note.media
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(|path| self.objects.public_url(path))
    }

    /// Resolves the current user and replaces the cached list with their notes.
    ///
    /// # Errors
    /// - Identity or record store failures. The previous list is kept.
    pub fn load_current_user_and_notes(&mut self) -> Result<Flow<&[Note]>, ControllerError> {
        let Some(user) = self.fetch_current_user()? else {
            return Ok(Flow::Unauthenticated);
        };

        let notes = match self.records.list(user.id) {
            Ok(notes) => notes,
            Err(err) => {
                error!(
                    "event=notes_load module=controller status=error error_code={} service={}",
                    err.code,
                    err.service.as_str()
                );
                return Err(err.into());
            }
        };

        info!(
            "event=notes_load module=controller status=ok count={}",
            notes.len()
        );
        self.state.notes = notes;
        Ok(Flow::Ready(self.state.notes.as_slice()))
    }

    /// Uploads one picked file and records it as the draft attachment.
    ///
    /// Returns the stored object path.
    ///
    /// # Errors
    /// - `MediaRead` when the file cannot be read or is empty.
    /// - `Backend` when the identity lookup or upload fails.
    /// In both cases the draft attachment is left as it was.
    pub fn pick_and_upload_media(
        &mut self,
        source: &impl MediaSource,
    ) -> Result<Flow<String>, ControllerError> {
        let Some(user) = self.fetch_current_user()? else {
            return Ok(Flow::Unauthenticated);
        };

        let file_name = source.file_name();
        if file_name.is_empty() {
            return Err(ControllerError::MediaRead(
                "picked file has no name".to_string(),
            ));
        }
        let content_type = content_type_for(file_name);
        let bytes = match source.read_bytes() {
            Ok(bytes) if bytes.is_empty() => {
                return Err(ControllerError::MediaRead("file is empty".to_string()));
            }
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("event=media_upload module=controller status=error error_code=read_failed");
                return Err(ControllerError::MediaRead(err.to_string()));
            }
        };

        let path = media_object_path(user.id, now_epoch_ms(), file_name);
        let stored_path = match self.objects.upload(&path, &bytes, content_type, true) {
            Ok(stored_path) => stored_path,
            Err(err) => {
                error!(
                    "event=media_upload module=controller status=error error_code={} size_bytes={}",
                    err.code,
                    bytes.len()
                );
                return Err(err.into());
            }
        };

        info!(
            "event=media_upload module=controller status=ok content_type={} size_bytes={}",
            content_type,
            bytes.len()
        );
        let replaced = self
            .state
            .draft
            .pending_media_path
            .replace(stored_path.clone());
        if let Some(previous) = replaced.filter(|previous| previous != &stored_path) {
            self.remove_orphan(&previous);
        }

        Ok(Flow::Ready(stored_path))
    }

    /// Inserts the draft as a new note and resynchronizes the list.
    ///
    /// # Errors
    /// - `Validation` when title, body and media are all empty; no remote
    ///   call is made.
    /// - `Backend` when the insert fails; the draft is kept for retry.
    pub fn create_note(&mut self) -> Result<Flow<&[Note]>, ControllerError> {
        if self.state.draft.is_empty() {
            return Err(ControllerError::Validation(EMPTY_NOTE_MESSAGE));
        }

        let Some(user) = self.fetch_current_user()? else {
            return Ok(Flow::Unauthenticated);
        };
        // A user switch discards the previous user's draft.
        if self.state.draft.is_empty() {
            return Err(ControllerError::Validation(EMPTY_NOTE_MESSAGE));
        }

        let draft = &self.state.draft;
        let new_note = NewNote {
            title: draft.title.clone(),
            body: draft.body.clone(),
            media: draft
                .pending_media_path
                .clone()
                .filter(|path| !path.is_empty()),
            owner_id: user.id,
        };

        let note_id = match self.records.insert(&new_note) {
            Ok(note_id) => note_id,
            Err(err) => {
                error!(
                    "event=note_create module=controller status=error error_code={} has_media={}",
                    err.code,
                    new_note.media.is_some()
                );
                return Err(err.into());
            }
        };

        info!(
            "event=note_create module=controller status=ok note_id={note_id} has_media={}",
            new_note.media.is_some()
        );
        self.state.draft.clear();
        self.state.draft_state = DraftState::Idle;
        self.load_current_user_and_notes()
    }

    /// Deletes one note and resynchronizes the list.
    ///
    /// # Errors
    /// - `Backend` when the delete fails; the cached list is unchanged.
    pub fn delete_note(&mut self, note_id: NoteId) -> Result<Flow<&[Note]>, ControllerError> {
        if let Err(err) = self.records.delete(note_id) {
            error!(
                "event=note_delete module=controller status=error error_code={} note_id={note_id}",
                err.code
            );
            return Err(err.into());
        }

        info!("event=note_delete module=controller status=ok note_id={note_id}");
        self.load_current_user_and_notes()
    }

    /// Signs out and drops all screen state.
    ///
    /// `Ok(())` means the caller must leave the notes screen.
    ///
    /// # Errors
    /// - `Backend` when sign-out fails; the session and state are kept.
    pub fn logout(&mut self) -> Result<(), ControllerError> {
        if let Err(err) = self.identity.sign_out() {
            error!(
                "event=logout module=controller status=error error_code={}",
                err.code
            );
            return Err(err.into());
        }

        if let Some(path) = self.state.draft.pending_media_path.take() {
            self.remove_orphan(&path);
        }
        self.state = NotesScreenState::default();
        info!("event=logout module=controller status=ok");
        Ok(())
    }

    fn fetch_current_user(&mut self) -> Result<Option<User>, ControllerError> {
        let user = match self.identity.current_user() {
            Ok(user) => user,
            Err(err) => {
                error!(
                    "event=current_user module=controller status=error error_code={}",
                    err.code
                );
                return Err(err.into());
            }
        };

        match user {
            Some(user) => {
                let switched = self
                    .state
                    .current_user
                    .as_ref()
                    .is_some_and(|cached| cached.id != user.id);
                if switched {
                    info!("event=current_user module=controller status=switched");
                    self.state.notes.clear();
                    self.cancel_draft();
                }
                self.state.current_user = Some(user.clone());
                Ok(Some(user))
            }
            None => {
                info!("event=current_user module=controller status=unauthenticated");
                self.state.current_user = None;
                self.state.notes.clear();
                self.cancel_draft();
                Ok(None)
            }
        }
    }

    fn remove_orphan(&self, path: &str) {
        if let Err(err) = self.objects.remove(path) {
            warn!(
                "event=media_orphan_remove module=controller status=error error_code={}",
                err.code
            );
        }
    }
}
