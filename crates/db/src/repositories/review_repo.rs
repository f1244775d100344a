//! Repository for the `reviews` table.

use natours_core::types::DbId;
use sqlx::PgPool;

use crate::models::review::{CreateReview, Review};

const COLUMNS: &str = "id, review, rating, tour_id, user_id, created_at";

/// Provides review reads for population.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a new review, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateReview) -> Result<Review, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviews (review, rating, tour_id, user_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(&input.review)
            .bind(input.rating)
            .bind(input.tour_id)
            .bind(input.user_id)
            .fetch_one(pool)
            .await
    }

    /// Reviews of every tour in `tour_ids`, oldest first.
    pub async fn list_by_tour_ids(
        pool: &PgPool,
        tour_ids: &[DbId],
    ) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reviews WHERE tour_id = ANY($1) ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(tour_ids)
            .fetch_all(pool)
            .await
    }
}
