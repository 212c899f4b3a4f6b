use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    /// Current refresh token; NULL when the user has no active session.
    pub refresh_token: Option<String>,
    pub created_at: OffsetDateTime,
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, refresh_token, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, refresh_token, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Insert a new user. Duplicate emails surface as a unique-constraint
    /// violation from the database, not from a racy pre-check.
    pub async fn create(db: &PgPool, email: &str, password_hash: &str) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, refresh_token, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    /// Overwrite the stored refresh token, superseding any prior session.
    pub async fn set_refresh_token(db: &PgPool, id: Uuid, token: &str) -> sqlx::Result<()> {
        sqlx::query(r#"UPDATE users SET refresh_token = $1 WHERE id = $2"#)
            .bind(token)
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn clear_refresh_token(db: &PgPool, id: Uuid) -> sqlx::Result<()> {
        sqlx::query(r#"UPDATE users SET refresh_token = NULL WHERE id = $1"#)
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Returns the number of rows touched so callers can tell an unknown email
    /// apart from a successful invalidation.
    pub async fn clear_refresh_token_by_email(db: &PgPool, email: &str) -> sqlx::Result<u64> {
        let result = sqlx::query(r#"UPDATE users SET refresh_token = NULL WHERE email = $1"#)
            .bind(email)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}
