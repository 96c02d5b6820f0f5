/// Postgres credential store
///
/// sqlx-backed implementation over the `users` table. The refresh hash is
/// replaced with a single UPDATE so concurrent rotations can never leave a
/// partially written value; whichever write lands last wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::AuthError;
use crate::principal::{Principal, Role};
use crate::store::CredentialStore;

pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type PrincipalRow = (String, String, String, String, Option<String>, DateTime<Utc>);

fn row_to_principal(row: PrincipalRow) -> Result<Principal, AuthError> {
    let (username, email, password_hash, role, refresh_hash, created_at) = row;
    let role = role
        .parse::<Role>()
        .map_err(|e| AuthError::Store(format!("corrupt role column: {}", e)))?;

    Ok(Principal {
        username,
        email,
        password_hash,
        role,
        refresh_hash,
        created_at,
    })
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn insert(&self, principal: &Principal) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, role, refresh_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&principal.username)
        .bind(&principal.email)
        .bind(&principal.password_hash)
        .bind(principal.role.as_str())
        .bind(&principal.refresh_hash)
        .bind(principal.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, identifier: &str) -> Result<Option<Principal>, AuthError> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT username, email, password_hash, role, refresh_hash, created_at
            FROM users
            WHERE username = $1 OR email = $1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_principal).transpose()
    }

    async fn get_refresh_hash(&self, username: &str) -> Result<Option<String>, AuthError> {
        let row = sqlx::query_as::<_, (Option<String>,)>(
            "SELECT refresh_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(|(hash,)| hash))
    }

    async fn set_refresh_hash(&self, username: &str, hash: &str) -> Result<bool, AuthError> {
        let result = sqlx::query("UPDATE users SET refresh_hash = $2 WHERE username = $1")
            .bind(username)
            .bind(hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_role(&self, username: &str, role: Role) -> Result<bool, AuthError> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE username = $1")
            .bind(username)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, username: &str) -> Result<bool, AuthError> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
