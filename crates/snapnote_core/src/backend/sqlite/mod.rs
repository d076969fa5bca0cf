//! Embedded SQLite implementation of the backend capabilities.
//!
//! # Responsibility
//! - Provide identity, record and object storage on one local connection.
//! - Mirror hosted-backend semantics the notes screen relies on: owner
//!   scoped queries, id-descending order, row ownership checks on writes.
//!
//! # Invariants
//! - Services are constructed only over connections opened via `db::open_db*`.
//! - At most one session is active per database (`auth_session.slot = 1`).

use crate::backend::{BackendError, BackendResult, BackendService};
use crate::db::migrations::ensure_latest;
use crate::model::user::UserId;
use rusqlite::{Connection, OptionalExtension};
use std::fmt::Display;
use uuid::Uuid;

mod identity;
mod objects;
mod records;

pub use identity::SqliteIdentityService;
pub use objects::{SqliteObjectStore, StoredObject};
pub use records::SqliteRecordStore;

fn db_error(service: BackendService, err: impl Display) -> BackendError {
    BackendError::new(service, "db_error", err.to_string())
}

fn ensure_ready(conn: &Connection, service: BackendService) -> BackendResult<()> {
    ensure_latest(conn).map_err(|err| db_error(service, err))
}

/// Owner id of the active session, if any.
fn active_owner(conn: &Connection, service: BackendService) -> BackendResult<Option<UserId>> {
    let raw = conn
        .query_row(
            "SELECT user_id FROM auth_session WHERE slot = 1;",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|err| db_error(service, err))?;

    raw.map(|value| parse_user_id(&value, service)).transpose()
}

fn parse_user_id(value: &str, service: BackendService) -> BackendResult<UserId> {
    Uuid::parse_str(value).map_err(|_| {
        BackendError::new(
            service,
            "invalid_data",
            format!("invalid persisted user id `{value}`"),
        )
    })
}
