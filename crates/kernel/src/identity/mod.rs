//! Owner identity: sign-up, sign-in, and lookup.
//!
//! The authenticated owner is never ambient state. Routes resolve it from the
//! session into an [`OwnerId`] and pass it explicitly to every service call.

pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::User;

pub use memory::MemoryIdentityProvider;
pub use postgres::PgIdentityProvider;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Identifier of an authenticated menu owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub Uuid);

impl OwnerId {
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for OwnerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Public view of an owner account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for Owner {
    fn from(user: User) -> Self {
        Self {
            id: OwnerId(user.id),
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Identity errors.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

/// Trim and lowercase an email address, rejecting obviously malformed input.
pub fn normalize_email(email: &str) -> Result<String, IdentityError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(IdentityError::InvalidEmail),
    }
}

/// Validate sign-up input and build the user record to store.
pub(crate) fn new_user(email: &str, password: &str) -> Result<User, IdentityError> {
    let email = normalize_email(email)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(IdentityError::WeakPassword);
    }
    Ok(User::new(email, password)?)
}

/// Account backend.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account. Fails with [`IdentityError::EmailTaken`] on duplicates.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Owner, IdentityError>;

    /// Check credentials. Returns `None` for an unknown email or wrong password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Option<Owner>, IdentityError>;

    /// Look up an owner by id, e.g. to restore a session.
    async fn find_owner(&self, id: OwnerId) -> Result<Option<Owner>, IdentityError>;
}
