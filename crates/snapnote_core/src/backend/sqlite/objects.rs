//! Media blobs over the local `storage_objects` table.

use super::{db_error, ensure_ready};
use crate::backend::{BackendError, BackendResult, BackendService, ObjectStore};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};

const SERVICE: BackendService = BackendService::Objects;

/// One stored blob with its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// SQLite-backed object store scoped to one bucket.
pub struct SqliteObjectStore<'conn> {
    conn: &'conn Connection,
    bucket: String,
    public_base_url: String,
}

impl<'conn> SqliteObjectStore<'conn> {
    /// Constructs the store from a migrated connection.
    pub fn try_new(
        conn: &'conn Connection,
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> BackendResult<Self> {
        ensure_ready(conn, SERVICE)?;
        Ok(Self {
            conn,
            bucket: bucket.into(),
            public_base_url: public_base_url.into(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Reads one object back, or `None` when absent.
    pub fn get(&self, path: &str) -> BackendResult<Option<StoredObject>> {
        self.conn
            .query_row(
                "SELECT content_type, bytes FROM storage_objects WHERE bucket = ?1 AND path = ?2;",
                params![self.bucket.as_str(), path],
                |row| {
                    Ok(StoredObject {
                        content_type: row.get(0)?,
                        bytes: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(|err| db_error(SERVICE, err))
    }

    fn exists(&self, path: &str) -> BackendResult<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM storage_objects WHERE bucket = ?1 AND path = ?2);",
                params![self.bucket.as_str(), path],
                |row| row.get(0),
            )
            .map_err(|err| db_error(SERVICE, err))
    }
}

impl ObjectStore for SqliteObjectStore<'_> {
    fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        upsert: bool,
    ) -> BackendResult<String> {
        if path.is_empty() || path.starts_with('/') {
            return Err(BackendError::new(
                SERVICE,
                "InvalidKey",
                format!("Invalid key: {path}"),
            ));
        }
        if !upsert && self.exists(path)? {
            return Err(BackendError::new(
                SERVICE,
                "Duplicate",
                "The resource already exists",
            ));
        }

        self.conn
            .execute(
                "INSERT INTO storage_objects (bucket, path, content_type, bytes)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(bucket, path) DO UPDATE SET
                    content_type = excluded.content_type,
                    bytes = excluded.bytes,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![self.bucket.as_str(), path, content_type, bytes],
            )
            .map_err(|err| db_error(SERVICE, err))?;

        info!(
            "event=object_upload module=objects status=ok bucket={} size_bytes={} content_type={}",
            self.bucket,
            bytes.len(),
            content_type
        );
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.public_base_url.trim_end_matches('/'),
            self.bucket,
            path
        )
    }

    fn remove(&self, path: &str) -> BackendResult<()> {
        let changed = self
            .conn
            .execute(
                "DELETE FROM storage_objects WHERE bucket = ?1 AND path = ?2;",
                params![self.bucket.as_str(), path],
            )
            .map_err(|err| db_error(SERVICE, err))?;
        debug!(
            "event=object_remove module=objects status=ok bucket={} changed={changed}",
            self.bucket
        );
        Ok(())
    }
}
