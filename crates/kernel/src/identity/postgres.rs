//! Owner accounts stored in the `users` table.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use super::{IdentityError, IdentityProvider, Owner, OwnerId, new_user, normalize_email};
use crate::models::User;

/// Identity provider backed by PostgreSQL.
#[derive(Clone)]
pub struct PgIdentityProvider {
    pool: PgPool,
}

impl PgIdentityProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, IdentityError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, pass, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl IdentityProvider for PgIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Owner, IdentityError> {
        let user = new_user(email, password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, pass, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, pass, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.pass)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => IdentityError::EmailTaken,
            _ => IdentityError::Database(e),
        })?;

        info!(owner_id = %user.id, "owner account created");
        Ok(user.into())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Option<Owner>, IdentityError> {
        let Ok(email) = normalize_email(email) else {
            return Ok(None);
        };

        let user = self.find_by_email(&email).await?;
        Ok(user
            .filter(|u| u.verify_password(password))
            .map(Owner::from))
    }

    async fn find_owner(&self, id: OwnerId) -> Result<Option<Owner>, IdentityError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, pass, created_at FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user.map(Owner::from))
    }
}
