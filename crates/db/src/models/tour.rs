//! Tour row model.

use natours_core::tour::{Difficulty, TourRecord};
use natours_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use crate::error::StoreError;

/// Full row from the `tours` table.
#[derive(Debug, Clone, FromRow)]
pub struct TourRow {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub duration: i32,
    pub max_group_size: i32,
    pub difficulty: String,
    pub ratings_average: f64,
    pub ratings_quantity: i32,
    pub price: f64,
    pub price_discount: Option<f64>,
    pub summary: String,
    pub description: Option<String>,
    pub image_cover: String,
    pub images: Vec<String>,
    pub created_at: Timestamp,
    pub start_dates: Vec<Timestamp>,
    pub secret_tour: bool,
    pub guides: Vec<DbId>,
}

impl TryFrom<TourRow> for TourRecord {
    type Error = StoreError;

    fn try_from(row: TourRow) -> Result<Self, Self::Error> {
        let difficulty = Difficulty::parse(&row.difficulty).ok_or_else(|| {
            StoreError::Corrupt(format!(
                "tour {} has unknown difficulty '{}'",
                row.id, row.difficulty
            ))
        })?;

        Ok(TourRecord {
            id: row.id,
            name: row.name,
            slug: row.slug,
            duration: row.duration,
            max_group_size: row.max_group_size,
            difficulty,
            ratings_average: row.ratings_average,
            ratings_quantity: row.ratings_quantity,
            price: row.price,
            price_discount: row.price_discount,
            summary: row.summary,
            description: row.description,
            image_cover: row.image_cover,
            images: row.images,
            created_at: row.created_at,
            start_dates: row.start_dates,
            secret_tour: row.secret_tour,
            guides: row.guides,
        })
    }
}
