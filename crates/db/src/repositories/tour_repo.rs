//! Repository for the `tours` table.

use natours_core::query::{TourFilter, TourQuery};
use natours_core::tour::NewTour;
use natours_core::types::DbId;
use sqlx::PgPool;

use crate::models::tour::TourRow;
use crate::sql::{self, TOUR_COLUMNS};

/// Provides reads and writes for tours.
pub struct TourRepo;

impl TourRepo {
    /// Insert a new tour, returning the created row.
    pub async fn create(pool: &PgPool, slug: &str, tour: &NewTour) -> Result<TourRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO tours (name, slug, duration, max_group_size, difficulty, \
                                ratings_average, ratings_quantity, price, price_discount, \
                                summary, description, image_cover, images, created_at, \
                                start_dates, secret_tour, guides)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
             RETURNING {TOUR_COLUMNS}"
        );
        sqlx::query_as::<_, TourRow>(&query)
            .bind(&tour.name)
            .bind(slug)
            .bind(tour.duration)
            .bind(tour.max_group_size)
            .bind(tour.difficulty.as_str())
            .bind(tour.ratings_average)
            .bind(tour.ratings_quantity)
            .bind(tour.price)
            .bind(tour.price_discount)
            .bind(&tour.summary)
            .bind(&tour.description)
            .bind(&tour.image_cover)
            .bind(&tour.images)
            .bind(tour.created_at)
            .bind(&tour.start_dates)
            .bind(tour.secret_tour)
            .bind(&tour.guides)
            .fetch_one(pool)
            .await
    }

    /// Overwrite every stored field of tour `id`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn replace(
        pool: &PgPool,
        id: DbId,
        slug: &str,
        tour: &NewTour,
    ) -> Result<Option<TourRow>, sqlx::Error> {
        let query = format!(
            "UPDATE tours SET
                name = $2, slug = $3, duration = $4, max_group_size = $5, difficulty = $6,
                ratings_average = $7, ratings_quantity = $8, price = $9, price_discount = $10,
                summary = $11, description = $12, image_cover = $13, images = $14,
                created_at = $15, start_dates = $16, secret_tour = $17, guides = $18
             WHERE id = $1
             RETURNING {TOUR_COLUMNS}"
        );
        sqlx::query_as::<_, TourRow>(&query)
            .bind(id)
            .bind(&tour.name)
            .bind(slug)
            .bind(tour.duration)
            .bind(tour.max_group_size)
            .bind(tour.difficulty.as_str())
            .bind(tour.ratings_average)
            .bind(tour.ratings_quantity)
            .bind(tour.price)
            .bind(tour.price_discount)
            .bind(&tour.summary)
            .bind(&tour.description)
            .bind(&tour.image_cover)
            .bind(&tour.images)
            .bind(tour.created_at)
            .bind(&tour.start_dates)
            .bind(tour.secret_tour)
            .bind(&tour.guides)
            .fetch_optional(pool)
            .await
    }

    /// Find a tour by internal ID, regardless of visibility.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TourRow>, sqlx::Error> {
        let query = format!("SELECT {TOUR_COLUMNS} FROM tours WHERE id = $1");
        sqlx::query_as::<_, TourRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tours for a query. The caller applies visibility beforehand.
    pub async fn list(pool: &PgPool, query: &TourQuery) -> Result<Vec<TourRow>, sqlx::Error> {
        let mut qb = sql::select_tours(query);
        qb.build_query_as::<TourRow>()
            .fetch_all(pool)
            .await
    }

    /// All tours matching `filter`, by ascending id.
    pub async fn list_matching(
        pool: &PgPool,
        filter: &TourFilter,
    ) -> Result<Vec<TourRow>, sqlx::Error> {
        let mut qb = sql::select_matching(filter);
        qb.build_query_as::<TourRow>()
            .fetch_all(pool)
            .await
    }

    pub async fn find_one(
        pool: &PgPool,
        filter: &TourFilter,
    ) -> Result<Option<TourRow>, sqlx::Error> {
        let mut qb = sql::select_one(filter);
        qb.build_query_as::<TourRow>()
            .fetch_optional(pool)
            .await
    }

    /// Whether a tour other than `except` already uses `name`.
    pub async fn name_taken(
        pool: &PgPool,
        name: &str,
        except: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM tours WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2)
             )",
        )
        .bind(name)
        .bind(except)
        .fetch_one(pool)
        .await
    }
}
