//! Review row model.

use natours_core::populate::ReviewSummary;
use natours_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full row from the `reviews` table.
#[derive(Debug, Clone, FromRow)]
pub struct Review {
    pub id: DbId,
    pub review: String,
    pub rating: f64,
    pub tour_id: DbId,
    pub user_id: DbId,
    pub created_at: Timestamp,
}

impl From<&Review> for ReviewSummary {
    fn from(row: &Review) -> Self {
        ReviewSummary {
            id: row.id,
            review: row.review.clone(),
            rating: row.rating,
            user: row.user_id,
            tour: row.tour_id,
        }
    }
}

/// DTO for creating a new review.
#[derive(Debug, Clone)]
pub struct CreateReview {
    pub review: String,
    pub rating: f64,
    pub tour_id: DbId,
    pub user_id: DbId,
}
