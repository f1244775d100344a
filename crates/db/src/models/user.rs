//! User row model.

use natours_core::populate::PublicUser;
use natours_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Carries the password hash and revision marker; only [`PublicUser`] leaves
/// this crate.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub role: String,
    pub password_hash: String,
    pub password_changed_at: Option<Timestamp>,
    pub version: i32,
    pub created_at: Timestamp,
}

/// The public columns of a user.
#[derive(Debug, Clone, FromRow)]
pub struct PublicUserRow {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub role: String,
}

impl From<PublicUserRow> for PublicUser {
    fn from(row: PublicUserRow) -> Self {
        PublicUser {
            id: row.id,
            name: row.name,
            email: row.email,
            photo: row.photo,
            role: row.role,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub role: String,
    pub password_hash: String,
}
