//! Login and registration use-cases.
//!
//! # Invariants
//! - Empty email or password is rejected before any identity call.
//! - Identity failures are returned unchanged.

use crate::backend::{BackendError, IdentityService};
use crate::model::user::Session;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MISSING_CREDENTIALS_MESSAGE: &str = "Please enter both email and password.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    Validation(&'static str),
    Backend(BackendError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::Backend(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
            Self::Validation(_) => None,
        }
    }
}

impl From<BackendError> for AuthError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

/// Front door for the login and registration screens.
pub struct AuthService<I: IdentityService> {
    identity: I,
}

impl<I: IdentityService> AuthService<I> {
    pub fn new(identity: I) -> Self {
        Self { identity }
    }

    /// Signs in with email and password.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        ensure_credentials(email, password)?;
        self.identity.sign_in(email, password).map_err(|err| {
            warn!("event=auth_sign_in module=auth status=error error_code={}", err.code);
            err.into()
        })
    }

    /// Registers a new account. The returned session is already active.
    pub fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        ensure_credentials(email, password)?;
        let session = self.identity.sign_up(email, password).map_err(|err| {
            warn!("event=auth_sign_up module=auth status=error error_code={}", err.code);
            AuthError::from(err)
        })?;
        info!(
            "event=auth_sign_up module=auth status=ok user_id={}",
            session.user.id
        );
        Ok(session)
    }
}

fn ensure_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::Validation(MISSING_CREDENTIALS_MESSAGE));
    }
    Ok(())
}
