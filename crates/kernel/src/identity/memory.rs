//! In-process owner accounts.

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{IdentityError, IdentityProvider, Owner, OwnerId, new_user, normalize_email};
use crate::models::User;

/// Identity provider holding accounts in memory.
#[derive(Debug, Default)]
pub struct MemoryIdentityProvider {
    users: RwLock<Vec<User>>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Owner, IdentityError> {
        let user = new_user(email, password)?;

        let mut users = self.users.write();
        if users.iter().any(|u| u.email == user.email) {
            return Err(IdentityError::EmailTaken);
        }
        users.push(user.clone());
        Ok(user.into())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Option<Owner>, IdentityError> {
        let Ok(email) = normalize_email(email) else {
            return Ok(None);
        };

        let users = self.users.read();
        Ok(users
            .iter()
            .find(|u| u.email == email && u.verify_password(password))
            .cloned()
            .map(Owner::from))
    }

    async fn find_owner(&self, id: OwnerId) -> Result<Option<Owner>, IdentityError> {
        let users = self.users.read();
        Ok(users
            .iter()
            .find(|u| u.id == id.as_uuid())
            .cloned()
            .map(Owner::from))
    }
}
