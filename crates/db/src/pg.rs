//! Store traits over Postgres, delegating to the repositories.

use async_trait::async_trait;
use natours_core::populate::{PublicUser, ReviewSummary};
use natours_core::query::{evaluate_pipeline, GroupRow, Pipeline, TourFilter, TourQuery};
use natours_core::tour::{NewTour, TourRecord};
use natours_core::types::DbId;

use crate::error::StoreError;
use crate::models::tour::TourRow;
use crate::repositories::{ReviewRepo, TourRepo, UserRepo};
use crate::store::{ReviewStore, TourStore, UserStore};
use crate::DbPool;

/// Postgres-backed implementation of every store trait.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn into_records(rows: Vec<TourRow>) -> Result<Vec<TourRecord>, StoreError> {
    rows.into_iter().map(TourRecord::try_from).collect()
}

#[async_trait]
impl TourStore for PgStore {
    async fn insert(&self, slug: &str, tour: &NewTour) -> Result<TourRecord, StoreError> {
        let row = TourRepo::create(&self.pool, slug, tour)
            .await
            .map_err(|e| StoreError::from_write(e, &tour.name))?;
        row.try_into()
    }

    async fn replace(
        &self,
        id: DbId,
        slug: &str,
        tour: &NewTour,
    ) -> Result<Option<TourRecord>, StoreError> {
        TourRepo::replace(&self.pool, id, slug, tour)
            .await
            .map_err(|e| StoreError::from_write(e, &tour.name))?
            .map(TourRecord::try_from)
            .transpose()
    }

    async fn find(&self, query: &TourQuery) -> Result<Vec<TourRecord>, StoreError> {
        into_records(TourRepo::list(&self.pool, query).await?)
    }

    async fn find_one(&self, filter: &TourFilter) -> Result<Option<TourRecord>, StoreError> {
        TourRepo::find_one(&self.pool, filter)
            .await?
            .map(TourRecord::try_from)
            .transpose()
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<TourRecord>, StoreError> {
        TourRepo::find_by_id(&self.pool, id)
            .await?
            .map(TourRecord::try_from)
            .transpose()
    }

    async fn name_taken(&self, name: &str, except: Option<DbId>) -> Result<bool, StoreError> {
        Ok(TourRepo::name_taken(&self.pool, name, except).await?)
    }

    async fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<GroupRow>, StoreError> {
        // Leading matches run in SQL; the full pipeline is then evaluated
        // over the narrowed rows.
        let rows = TourRepo::list_matching(&self.pool, &pipeline.leading_filter()).await?;
        let records = into_records(rows)?;
        Ok(evaluate_pipeline(pipeline, &records)?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_public_by_ids(&self, ids: &[DbId]) -> Result<Vec<PublicUser>, StoreError> {
        let rows = UserRepo::find_public_by_ids(&self.pool, ids).await?;
        Ok(rows.into_iter().map(PublicUser::from).collect())
    }
}

#[async_trait]
impl ReviewStore for PgStore {
    async fn find_by_tour_ids(&self, tour_ids: &[DbId]) -> Result<Vec<ReviewSummary>, StoreError> {
        let rows = ReviewRepo::list_by_tour_ids(&self.pool, tour_ids).await?;
        Ok(rows.iter().map(ReviewSummary::from).collect())
    }
}
