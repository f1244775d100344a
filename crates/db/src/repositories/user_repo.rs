//! Repository for the `users` table.

use natours_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, PublicUserRow, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, email, photo, role, password_hash, password_changed_at, version, created_at";

/// Columns safe to hand out.
const PUBLIC_COLUMNS: &str = "id, name, email, photo, role";

/// Provides user lookups for population.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, photo, role, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.photo)
            .bind(&input.role)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Public columns of every user in `ids`. Missing ids are skipped.
    pub async fn find_public_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<PublicUserRow>, sqlx::Error> {
        let query = format!("SELECT {PUBLIC_COLUMNS} FROM users WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, PublicUserRow>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}
