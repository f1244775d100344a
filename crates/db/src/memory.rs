//! In-process store used by tests and local runs without Postgres.

use std::collections::BTreeMap;

use async_trait::async_trait;
use natours_core::populate::{PublicUser, ReviewSummary};
use natours_core::query::{evaluate_pipeline, GroupRow, Pipeline, TourFilter, TourQuery};
use natours_core::tour::{NewTour, TourRecord};
use natours_core::types::DbId;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::{ReviewStore, TourStore, UserStore};

#[derive(Default)]
struct State {
    tours: BTreeMap<DbId, TourRecord>,
    users: BTreeMap<DbId, PublicUser>,
    reviews: Vec<ReviewSummary>,
    next_tour_id: DbId,
}

impl State {
    fn name_taken(&self, name: &str, except: Option<DbId>) -> bool {
        self.tours
            .values()
            .any(|t| t.name == name && Some(t.id) != except)
    }
}

/// Implements every store trait over maps behind a [`RwLock`].
///
/// Name uniqueness is checked under the write lock, so concurrent inserts of
/// the same name cannot both succeed.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user for guide population.
    pub async fn add_user(&self, user: PublicUser) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// Seed a review for review population.
    pub async fn add_review(&self, review: ReviewSummary) {
        self.state.write().await.reviews.push(review);
    }

    pub async fn tour_count(&self) -> usize {
        self.state.read().await.tours.len()
    }
}

#[async_trait]
impl TourStore for MemoryStore {
    async fn insert(&self, slug: &str, tour: &NewTour) -> Result<TourRecord, StoreError> {
        let mut state = self.state.write().await;
        if state.name_taken(&tour.name, None) {
            return Err(StoreError::DuplicateKey {
                name: tour.name.clone(),
            });
        }
        state.next_tour_id += 1;
        let record = tour.clone().into_record(state.next_tour_id, slug.to_string());
        state.tours.insert(record.id, record.clone());
        Ok(record)
    }

    async fn replace(
        &self,
        id: DbId,
        slug: &str,
        tour: &NewTour,
    ) -> Result<Option<TourRecord>, StoreError> {
        let mut state = self.state.write().await;
        if !state.tours.contains_key(&id) {
            return Ok(None);
        }
        if state.name_taken(&tour.name, Some(id)) {
            return Err(StoreError::DuplicateKey {
                name: tour.name.clone(),
            });
        }
        let record = tour.clone().into_record(id, slug.to_string());
        state.tours.insert(id, record.clone());
        Ok(Some(record))
    }

    async fn find(&self, query: &TourQuery) -> Result<Vec<TourRecord>, StoreError> {
        let state = self.state.read().await;
        let mut tours: Vec<TourRecord> = state
            .tours
            .values()
            .filter(|t| query.filter.matches(t))
            .cloned()
            .collect();
        tours.sort_by(|a, b| query.compare(a, b));
        if !query.paged {
            return Ok(tours);
        }
        // Both are clamped to non-negative values.
        let offset = query.clamped_offset() as usize;
        let limit = query.clamped_limit() as usize;
        Ok(tours.into_iter().skip(offset).take(limit).collect())
    }

    async fn find_one(&self, filter: &TourFilter) -> Result<Option<TourRecord>, StoreError> {
        let state = self.state.read().await;
        Ok(state.tours.values().find(|t| filter.matches(t)).cloned())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<TourRecord>, StoreError> {
        Ok(self.state.read().await.tours.get(&id).cloned())
    }

    async fn name_taken(&self, name: &str, except: Option<DbId>) -> Result<bool, StoreError> {
        Ok(self.state.read().await.name_taken(name, except))
    }

    async fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<GroupRow>, StoreError> {
        let state = self.state.read().await;
        let tours: Vec<TourRecord> = state.tours.values().cloned().collect();
        Ok(evaluate_pipeline(pipeline, &tours)?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_public_by_ids(&self, ids: &[DbId]) -> Result<Vec<PublicUser>, StoreError> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn find_by_tour_ids(&self, tour_ids: &[DbId]) -> Result<Vec<ReviewSummary>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .reviews
            .iter()
            .filter(|r| tour_ids.contains(&r.tour))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;
    use natours_core::query::{CompareOp, FilterValue, TourField, Visibility};
    use natours_core::tour::Difficulty;

    use super::*;

    fn new_tour(name: &str, price: f64, secret: bool) -> NewTour {
        NewTour {
            name: name.into(),
            duration: 5,
            max_group_size: 25,
            difficulty: Difficulty::Easy,
            ratings_average: 4.7,
            ratings_quantity: 37,
            price,
            price_discount: None,
            summary: "Breathtaking hike through the Canadian Banff National Park".into(),
            description: None,
            image_cover: "tour-1-cover.jpg".into(),
            images: vec![],
            created_at: Utc::now(),
            start_dates: vec![],
            secret_tour: secret,
            guides: vec![],
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let a = store
            .insert("the-forest-hiker", &new_tour("The Forest Hiker", 397.0, false))
            .await
            .unwrap();
        let b = store
            .insert("the-sea-explorer", &new_tour("The Sea Explorer", 497.0, false))
            .await
            .unwrap();
        assert!(b.id > a.id);
        assert_eq!(a.slug, "the-forest-hiker");
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected() {
        let store = MemoryStore::new();
        store
            .insert("the-forest-hiker", &new_tour("The Forest Hiker", 397.0, false))
            .await
            .unwrap();
        let err = store
            .insert("the-forest-hiker", &new_tour("The Forest Hiker", 500.0, false))
            .await
            .unwrap_err();
        assert_matches!(err, StoreError::DuplicateKey { name } if name == "The Forest Hiker");
        assert_eq!(store.tour_count().await, 1);
    }

    #[tokio::test]
    async fn replace_may_keep_its_own_name() {
        let store = MemoryStore::new();
        let tour = new_tour("The Forest Hiker", 397.0, false);
        let created = store.insert("the-forest-hiker", &tour).await.unwrap();
        let updated = store
            .replace(created.id, "the-forest-hiker", &new_tour("The Forest Hiker", 450.0, false))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.price, 450.0);
        assert!(store.replace(999, "x", &tour).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_filters_sorts_and_pages() {
        let store = MemoryStore::new();
        for (name, price) in [
            ("The Forest Hiker", 397.0),
            ("The Sea Explorer", 497.0),
            ("The Snow Adventurer", 997.0),
        ] {
            store.insert("slug", &new_tour(name, price, false)).await.unwrap();
        }
        let query = TourQuery {
            sort: vec![natours_core::query::SortKey {
                field: TourField::Price,
                descending: true,
            }],
            limit: Some(2),
            ..TourQuery::with_filter(TourFilter::new().and(
                TourField::Price,
                CompareOp::Gt,
                FilterValue::Number(400.0),
            ))
        };
        let names: Vec<_> = store
            .find(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["The Snow Adventurer", "The Sea Explorer"]);
    }

    #[tokio::test]
    async fn unpaged_find_ignores_limit() {
        let store = MemoryStore::new();
        for (name, price) in [
            ("The Forest Hiker", 397.0),
            ("The Sea Explorer", 497.0),
            ("The Snow Adventurer", 997.0),
        ] {
            store.insert("slug", &new_tour(name, price, false)).await.unwrap();
        }
        let query = TourQuery {
            limit: Some(1),
            ..TourQuery::all(TourFilter::new())
        };
        assert_eq!(store.find(&query).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn find_one_honours_the_filter_it_is_given() {
        let store = MemoryStore::new();
        store
            .insert("the-secret-tour", &new_tour("The Secret Tour", 100.0, true))
            .await
            .unwrap();
        let visible = TourFilter::by_slug("the-secret-tour").visible(Visibility::PublicOnly);
        assert!(store.find_one(&visible).await.unwrap().is_none());
        let all = TourFilter::by_slug("the-secret-tour");
        assert!(store.find_one(&all).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn users_are_returned_for_known_ids_only() {
        let store = MemoryStore::new();
        store
            .add_user(PublicUser {
                id: 1,
                name: "Leo Gillespie".into(),
                email: "leo@example.com".into(),
                photo: None,
                role: "lead-guide".into(),
            })
            .await;
        let users = store.find_public_by_ids(&[1, 2]).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Leo Gillespie");
    }
}
