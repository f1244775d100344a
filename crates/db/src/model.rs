//! The tour model: ordered save and read pipelines over injected stores.
//!
//! Saving runs validate, uniqueness, normalize, slug and persist in that
//! order. Reading narrows the filter to public tours unless told otherwise,
//! fetches, then populates relations.

use std::sync::Arc;

use chrono::Utc;
use natours_core::error::CoreError;
use natours_core::populate::{
    guide_ids, populate, PopulateSpec, PopulatedTour, UnresolvedReference,
};
use natours_core::query::{
    guard_pipeline, tour_stats_pipeline, GroupRow, Pipeline, Projection, TourFilter, TourQuery,
    Visibility,
};
use natours_core::tour::{
    collect_violations, derive_slug, validate, TourDraft, TourRecord, ValidationErrors, Violation,
};
use natours_core::types::DbId;
use serde_json::{Map, Value};

use crate::store::{ReviewStore, TourStore, UserStore};

/// Read results together with the references that could not be resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Populated<T> {
    pub value: T,
    pub unresolved: Vec<UnresolvedReference>,
}

pub struct TourModel {
    tours: Arc<dyn TourStore>,
    users: Arc<dyn UserStore>,
    reviews: Arc<dyn ReviewStore>,
}

impl TourModel {
    pub fn new(
        tours: Arc<dyn TourStore>,
        users: Arc<dyn UserStore>,
        reviews: Arc<dyn ReviewStore>,
    ) -> Self {
        Self {
            tours,
            users,
            reviews,
        }
    }

    /// Build a model whose three stores are the same object.
    pub fn with_store<S>(store: Arc<S>) -> Self
    where
        S: TourStore + UserStore + ReviewStore + 'static,
    {
        Self::new(store.clone(), store.clone(), store)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Validate a candidate document and persist it as a new tour.
    pub async fn create(&self, document: &Map<String, Value>) -> Result<TourRecord, CoreError> {
        self.save(None, TourDraft::from_document(document)).await
    }

    /// Merge `patch` onto tour `id`, revalidate the whole result and persist it.
    pub async fn update(
        &self,
        id: DbId,
        patch: &Map<String, Value>,
    ) -> Result<TourRecord, CoreError> {
        let stored = self
            .tours
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id.to_string()))?;

        let mut draft = TourDraft::from_record(&stored);
        draft.apply_document(patch);
        self.save(Some(id), draft).await
    }

    async fn save(&self, id: Option<DbId>, draft: TourDraft) -> Result<TourRecord, CoreError> {
        let mut violations = collect_violations(&draft);

        if let Some(name) = draft.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            if self.tours.name_taken(name, id).await? {
                violations.push(Violation::DuplicateKey {
                    field: "name",
                    value: name.to_string(),
                });
            }
        }

        if !violations.is_empty() {
            tracing::debug!(count = violations.len(), "Tour candidate rejected");
            return Err(ValidationErrors(violations).into());
        }

        let tour = validate(&draft, Utc::now())?;
        let slug = derive_slug(&tour.name);

        let record = match id {
            None => self.tours.insert(&slug, &tour).await?,
            Some(id) => self
                .tours
                .replace(id, &slug, &tour)
                .await?
                .ok_or_else(|| not_found(id.to_string()))?,
        };

        tracing::info!(tour_id = record.id, slug = %record.slug, "Tour saved");
        Ok(record)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn find(
        &self,
        query: TourQuery,
        visibility: Visibility,
        spec: PopulateSpec,
    ) -> Result<Populated<Vec<PopulatedTour>>, CoreError> {
        let query = TourQuery {
            filter: query.filter.visible(visibility),
            ..query
        };
        let records = self.tours.find(&query).await?;
        self.populate(records, query.projection, spec).await
    }

    pub async fn find_one(
        &self,
        filter: TourFilter,
        visibility: Visibility,
        spec: PopulateSpec,
    ) -> Result<Populated<Option<PopulatedTour>>, CoreError> {
        let filter = filter.visible(visibility);
        let records: Vec<TourRecord> = self.tours.find_one(&filter).await?.into_iter().collect();
        let Populated { value, unresolved } =
            self.populate(records, Projection::default(), spec).await?;
        Ok(Populated {
            value: value.into_iter().next(),
            unresolved,
        })
    }

    /// The public tour with `slug`, with guides and reviews populated.
    pub async fn find_by_slug(&self, slug: &str) -> Result<PopulatedTour, CoreError> {
        self.find_one(
            TourFilter::by_slug(slug),
            Visibility::PublicOnly,
            PopulateSpec::GUIDES_AND_REVIEWS,
        )
        .await?
        .value
        .ok_or_else(|| not_found(slug.to_string()))
    }

    /// Run a pipeline with secret tours excluded.
    pub async fn aggregate(&self, pipeline: Pipeline) -> Result<Vec<GroupRow>, CoreError> {
        let pipeline = guard_pipeline(pipeline);
        Ok(self.tours.aggregate(&pipeline).await?)
    }

    /// Per-difficulty statistics over well-rated tours.
    pub async fn tour_stats(&self) -> Result<Vec<GroupRow>, CoreError> {
        self.aggregate(tour_stats_pipeline()).await
    }

    pub async fn ping(&self) -> Result<(), CoreError> {
        Ok(self.tours.ping().await?)
    }

    async fn populate(
        &self,
        records: Vec<TourRecord>,
        projection: Projection,
        spec: PopulateSpec,
    ) -> Result<Populated<Vec<PopulatedTour>>, CoreError> {
        let ids = guide_ids(&records);
        let users = if spec.guides && !ids.is_empty() {
            self.users.find_public_by_ids(&ids).await?
        } else {
            Vec::new()
        };

        let reviews = if spec.reviews && !records.is_empty() {
            let tour_ids: Vec<DbId> = records.iter().map(|t| t.id).collect();
            self.reviews.find_by_tour_ids(&tour_ids).await?
        } else {
            Vec::new()
        };

        let (value, unresolved) = populate(records, projection, spec, &users, &reviews);
        for reference in &unresolved {
            tracing::warn!(
                path = reference.path,
                id = reference.id,
                "Dropping unresolved tour reference"
            );
        }

        Ok(Populated { value, unresolved })
    }
}

fn not_found(key: String) -> CoreError {
    CoreError::NotFound {
        entity: "Tour",
        key,
    }
}
