//! Note table over the local `notes` table.
//!
//! # Invariants
//! - `list` filters by owner and orders by `id DESC`, with no limit.
//! - Writes only touch rows owned by the active session user.

use super::{active_owner, db_error, ensure_ready, parse_user_id};
use crate::backend::{BackendError, BackendResult, BackendService, RecordStore};
use crate::model::note::{NewNote, Note, NoteId};
use crate::model::user::UserId;
use log::debug;
use rusqlite::{params, Connection, Row};

const SERVICE: BackendService = BackendService::Records;

/// SQLite-backed note record store.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Constructs the store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> BackendResult<Self> {
        ensure_ready(conn, SERVICE)?;
        Ok(Self { conn })
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn list(&self, owner_id: UserId) -> BackendResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, title, body, media, user_id
                 FROM notes
                 WHERE user_id = ?1
                 ORDER BY id DESC;",
            )
            .map_err(|err| db_error(SERVICE, err))?;

        let mut rows = stmt
            .query([owner_id.to_string()])
            .map_err(|err| db_error(SERVICE, err))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next().map_err(|err| db_error(SERVICE, err))? {
            notes.push(parse_note_row(row)?);
        }

        Ok(notes)
    }

    fn insert(&self, note: &NewNote) -> BackendResult<NoteId> {
        if active_owner(self.conn, SERVICE)? != Some(note.owner_id) {
            return Err(BackendError::new(
                SERVICE,
                "42501",
                "new row violates row-level security policy for table \"notes\"",
            ));
        }

        self.conn
            .execute(
                "INSERT INTO notes (title, body, media, user_id) VALUES (?1, ?2, ?3, ?4);",
                params![
                    note.title.as_str(),
                    note.body.as_str(),
                    note.media.as_deref(),
                    note.owner_id.to_string(),
                ],
            )
            .map_err(|err| db_error(SERVICE, err))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn delete(&self, note_id: NoteId) -> BackendResult<()> {
        let Some(owner_id) = active_owner(self.conn, SERVICE)? else {
            debug!("event=note_delete module=records status=skipped reason=no_session note_id={note_id}");
            return Ok(());
        };

        let changed = self
            .conn
            .execute(
                "DELETE FROM notes WHERE id = ?1 AND user_id = ?2;",
                params![note_id, owner_id.to_string()],
            )
            .map_err(|err| db_error(SERVICE, err))?;
        debug!("event=note_delete module=records status=ok note_id={note_id} changed={changed}");
        Ok(())
    }
}

fn parse_note_row(row: &Row<'_>) -> BackendResult<Note> {
    let columns = || -> rusqlite::Result<(NoteId, String, String, Option<String>, String)> {
        Ok((
            row.get("id")?,
            row.get("title")?,
            row.get("body")?,
            row.get("media")?,
            row.get("user_id")?,
        ))
    };
    let (id, title, body, media, owner_text) = columns().map_err(|err| db_error(SERVICE, err))?;

    Ok(Note {
        id,
        title,
        body,
        media,
        owner_id: parse_user_id(&owner_text, SERVICE)?,
    })
}
