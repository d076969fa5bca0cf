//! Email/password identity over the local `users` table.
//!
//! # Invariants
//! - Passwords are stored only as argon2 PHC strings.
//! - Sign-up and sign-in both replace the single active session.

use super::{db_error, ensure_ready, parse_user_id};
use crate::backend::{BackendError, BackendResult, BackendService, IdentityService};
use crate::clock::now_epoch_ms;
use crate::model::user::{Session, User};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

const SERVICE: BackendService = BackendService::Identity;
const MIN_PASSWORD_CHARS: usize = 6;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// SQLite-backed identity service.
pub struct SqliteIdentityService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteIdentityService<'conn> {
    /// Constructs the service from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> BackendResult<Self> {
        ensure_ready(conn, SERVICE)?;
        Ok(Self { conn })
    }

    fn open_session(&self, user: User) -> BackendResult<Session> {
        let session = Session {
            user,
            access_token: Uuid::new_v4().simple().to_string(),
            issued_at_ms: now_epoch_ms(),
        };
        self.conn
            .execute(
                "INSERT INTO auth_session (slot, user_id, access_token, issued_at)
                 VALUES (1, ?1, ?2, ?3)
                 ON CONFLICT(slot) DO UPDATE SET
                    user_id = excluded.user_id,
                    access_token = excluded.access_token,
                    issued_at = excluded.issued_at;",
                params![
                    session.user.id.to_string(),
                    session.access_token.as_str(),
                    session.issued_at_ms,
                ],
            )
            .map_err(|err| db_error(SERVICE, err))?;
        Ok(session)
    }
}

impl IdentityService for SqliteIdentityService<'_> {
    fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session> {
        let row = self
            .conn
            .query_row(
                "SELECT id, email, password_hash FROM users WHERE email = ?1;",
                [email.trim()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(|err| db_error(SERVICE, err))?;

        let Some((id, stored_email, password_hash)) = row else {
            info!("event=sign_in module=identity status=rejected reason=unknown_user");
            return Err(invalid_credentials());
        };
        if !password_matches(&password_hash, password) {
            info!("event=sign_in module=identity status=rejected reason=password_mismatch");
            return Err(invalid_credentials());
        }

        let user = User {
            id: parse_user_id(&id, SERVICE)?,
            email: stored_email,
        };
        let session = self.open_session(user)?;
        info!(
            "event=sign_in module=identity status=ok user_id={}",
            session.user.id
        );
        Ok(session)
    }

    fn sign_up(&self, email: &str, password: &str) -> BackendResult<Session> {
        let email = email.trim();
        if !EMAIL_RE.is_match(email) {
            return Err(BackendError::new(
                SERVICE,
                "email_address_invalid",
                "Unable to validate email address: invalid format",
            ));
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(BackendError::new(
                SERVICE,
                "weak_password",
                format!("Password should be at least {MIN_PASSWORD_CHARS} characters."),
            ));
        }

        let exists: bool = self
            .conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1);",
                [email],
                |row| row.get(0),
            )
            .map_err(|err| db_error(SERVICE, err))?;
        if exists {
            return Err(BackendError::new(
                SERVICE,
                "user_already_exists",
                "User already registered",
            ));
        }

        let password_hash = hash_password(password)?;
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        self.conn
            .execute(
                "INSERT INTO users (id, email, password_hash) VALUES (?1, ?2, ?3);",
                params![user.id.to_string(), user.email.as_str(), password_hash],
            )
            .map_err(|err| db_error(SERVICE, err))?;

        let session = self.open_session(user)?;
        info!(
            "event=sign_up module=identity status=ok user_id={}",
            session.user.id
        );
        Ok(session)
    }

    fn sign_out(&self) -> BackendResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM auth_session WHERE slot = 1;", [])
            .map_err(|err| db_error(SERVICE, err))?;
        info!("event=sign_out module=identity status=ok had_session={}", changed > 0);
        Ok(())
    }

    fn current_user(&self) -> BackendResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                "SELECT u.id, u.email
                 FROM auth_session s
                 JOIN users u ON u.id = s.user_id
                 WHERE s.slot = 1;",
                [],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .map_err(|err| db_error(SERVICE, err))?;

        row.map(|(id, email)| {
            Ok(User {
                id: parse_user_id(&id, SERVICE)?,
                email,
            })
        })
        .transpose()
    }
}

fn invalid_credentials() -> BackendError {
    BackendError::new(SERVICE, "invalid_credentials", "Invalid login credentials")
}

fn hash_password(password: &str) -> BackendResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| BackendError::new(SERVICE, "hash_failed", err.to_string()))
}

fn password_matches(stored_hash: &str, password: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            warn!("event=sign_in module=identity status=error error_code=corrupt_hash error={err}");
            false
        }
    }
}
