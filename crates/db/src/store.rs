//! The document-store seams the tour model is built on.
//!
//! Each trait is object safe and shared as `Arc<dyn _>`, so the model can
//! run over Postgres in production and over [`crate::MemoryStore`] in tests.

use async_trait::async_trait;
use natours_core::populate::{PublicUser, ReviewSummary};
use natours_core::query::{GroupRow, Pipeline, TourFilter, TourQuery};
use natours_core::tour::{NewTour, TourRecord};
use natours_core::types::DbId;

use crate::error::StoreError;

#[async_trait]
pub trait TourStore: Send + Sync {
    /// Persist a new tour under `slug`.
    async fn insert(&self, slug: &str, tour: &NewTour) -> Result<TourRecord, StoreError>;

    /// Overwrite the stored tour `id`. Returns `None` if it does not exist.
    async fn replace(
        &self,
        id: DbId,
        slug: &str,
        tour: &NewTour,
    ) -> Result<Option<TourRecord>, StoreError>;

    /// Tours matching `query.filter`, ordered and paged as the query says.
    async fn find(&self, query: &TourQuery) -> Result<Vec<TourRecord>, StoreError>;

    /// The first tour matching `filter`, by ascending id.
    async fn find_one(&self, filter: &TourFilter) -> Result<Option<TourRecord>, StoreError>;

    /// Unfiltered lookup by identity.
    async fn find_by_id(&self, id: DbId) -> Result<Option<TourRecord>, StoreError>;

    /// Whether `name` belongs to a tour other than `except`.
    async fn name_taken(&self, name: &str, except: Option<DbId>) -> Result<bool, StoreError>;

    /// Evaluate an aggregation pipeline as given. Guarding is the caller's job.
    async fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<GroupRow>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Public projections of the users in `ids`. Unknown ids are skipped.
    async fn find_public_by_ids(&self, ids: &[DbId]) -> Result<Vec<PublicUser>, StoreError>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Reviews of any tour in `tour_ids`, oldest first.
    async fn find_by_tour_ids(&self, tour_ids: &[DbId]) -> Result<Vec<ReviewSummary>, StoreError>;
}
