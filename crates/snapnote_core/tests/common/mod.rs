#![allow(dead_code)]

use snapnote_core::{
    BackendError, BackendResult, BackendService, IdentityService, MediaSource, NewNote, Note,
    NoteId, ObjectStore, RecordStore, Session, User, UserId,
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io;
use uuid::Uuid;

pub const PUBLIC_BASE: &str = "https://cdn.test/notes-media";

pub fn user(email: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
    }
}

pub fn note(id: NoteId, owner_id: UserId, title: &str) -> Note {
    Note {
        id,
        title: title.to_string(),
        body: String::new(),
        media: None,
        owner_id,
    }
}

pub fn failure(service: BackendService, message: &str) -> BackendError {
    BackendError::new(service, "fake_failure", message)
}

#[derive(Default)]
pub struct FakeIdentity {
    pub user: RefCell<Option<User>>,
    pub current_user_error: RefCell<Option<BackendError>>,
    pub sign_out_error: RefCell<Option<BackendError>>,
    pub sign_out_calls: Cell<usize>,
}

impl FakeIdentity {
    pub fn signed_in(user: User) -> Self {
        Self {
            user: RefCell::new(Some(user)),
            ..Self::default()
        }
    }
}

impl IdentityService for FakeIdentity {
    fn sign_in(&self, email: &str, _password: &str) -> BackendResult<Session> {
        let user = user(email);
        *self.user.borrow_mut() = Some(user.clone());
        Ok(Session {
            user,
            access_token: "token".to_string(),
            issued_at_ms: 1,
        })
    }

    fn sign_up(&self, email: &str, password: &str) -> BackendResult<Session> {
        self.sign_in(email, password)
    }

    fn sign_out(&self) -> BackendResult<()> {
        self.sign_out_calls.set(self.sign_out_calls.get() + 1);
        if let Some(err) = self.sign_out_error.borrow().clone() {
            return Err(err);
        }
        *self.user.borrow_mut() = None;
        Ok(())
    }

    fn current_user(&self) -> BackendResult<Option<User>> {
        if let Some(err) = self.current_user_error.borrow().clone() {
            return Err(err);
        }
        Ok(self.user.borrow().clone())
    }
}

/// Record store emulating an auto-increment table.
pub struct FakeRecords {
    pub rows: RefCell<Vec<Note>>,
    pub next_id: Cell<NoteId>,
    pub list_error: RefCell<Option<BackendError>>,
    pub insert_error: RefCell<Option<BackendError>>,
    pub delete_error: RefCell<Option<BackendError>>,
    pub calls: Cell<usize>,
}

impl Default for FakeRecords {
    fn default() -> Self {
        Self {
            rows: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            list_error: RefCell::new(None),
            insert_error: RefCell::new(None),
            delete_error: RefCell::new(None),
            calls: Cell::new(0),
        }
    }
}

impl FakeRecords {
    pub fn seeded(rows: Vec<Note>) -> Self {
        let next_id = rows.iter().map(|row| row.id).max().unwrap_or(0) + 1;
        let store = Self::default();
        *store.rows.borrow_mut() = rows;
        store.next_id.set(next_id);
        store
    }

    fn record_call(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl RecordStore for FakeRecords {
    fn list(&self, owner_id: UserId) -> BackendResult<Vec<Note>> {
        self.record_call();
        if let Some(err) = self.list_error.borrow().clone() {
            return Err(err);
        }
        let mut notes: Vec<Note> = self
            .rows
            .borrow()
            .iter()
            .filter(|row| row.owner_id == owner_id)
            .cloned()
            .collect();
        notes.sort_by(|left, right| right.id.cmp(&left.id));
        Ok(notes)
    }

    fn insert(&self, note: &NewNote) -> BackendResult<NoteId> {
        self.record_call();
        if let Some(err) = self.insert_error.borrow().clone() {
            return Err(err);
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.rows.borrow_mut().push(note.clone().into_note(id));
        Ok(id)
    }

    fn delete(&self, note_id: NoteId) -> BackendResult<()> {
        self.record_call();
        if let Some(err) = self.delete_error.borrow().clone() {
            return Err(err);
        }
        self.rows.borrow_mut().retain(|row| row.id != note_id);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCall {
    pub path: String,
    pub content_type: String,
    pub size: usize,
    pub upsert: bool,
}

#[derive(Default)]
pub struct FakeObjects {
    pub objects: RefCell<BTreeMap<String, Vec<u8>>>,
    pub uploads: RefCell<Vec<UploadCall>>,
    pub removed: RefCell<Vec<String>>,
    pub upload_error: RefCell<Option<BackendError>>,
}

impl ObjectStore for FakeObjects {
    fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        upsert: bool,
    ) -> BackendResult<String> {
        if let Some(err) = self.upload_error.borrow().clone() {
            return Err(err);
        }
        self.uploads.borrow_mut().push(UploadCall {
            path: path.to_string(),
            content_type: content_type.to_string(),
            size: bytes.len(),
            upsert,
        });
        self.objects
            .borrow_mut()
            .insert(path.to_string(), bytes.to_vec());
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{PUBLIC_BASE}/{path}")
    }

    fn remove(&self, path: &str) -> BackendResult<()> {
        self.removed.borrow_mut().push(path.to_string());
        self.objects.borrow_mut().remove(path);
        Ok(())
    }
}

/// Picked file with canned content; `None` simulates a read failure.
pub struct FakeMedia {
    pub uri: String,
    pub bytes: Option<Vec<u8>>,
}

impl FakeMedia {
    pub fn new(uri: &str, bytes: &[u8]) -> Self {
        Self {
            uri: uri.to_string(),
            bytes: Some(bytes.to_vec()),
        }
    }

    pub fn unreadable(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
            bytes: None,
        }
    }
}

impl MediaSource for FakeMedia {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        self.bytes
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"))
    }
}
