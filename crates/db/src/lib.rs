//! Persistence for tours: store traits, the Postgres and in-memory stores,
//! and the tour model that runs the save and read pipelines over them.

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod memory;
pub mod model;
pub mod models;
pub mod pg;
pub mod repositories;
pub mod sql;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use model::TourModel;
pub use pg::PgStore;
pub use store::{ReviewStore, TourStore, UserStore};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Run a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
