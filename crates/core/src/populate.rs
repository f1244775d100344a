//! Relation population for tours read from the store.
//!
//! The store hands back bare references (`guides` user ids) and the reverse
//! relation (`reviews`) lives in its own collection. This module merges the
//! resolved records into the read model. Dangling references are dropped and
//! reported, never fatal.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::query::filter::Projection;
use crate::tour::{Difficulty, TourRecord};
use crate::types::{DbId, Timestamp};

/// Which relations to resolve on a read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulateSpec {
    pub guides: bool,
    pub reviews: bool,
}

impl PopulateSpec {
    pub const NONE: Self = Self {
        guides: false,
        reviews: false,
    };
    pub const GUIDES: Self = Self {
        guides: true,
        reviews: false,
    };
    pub const GUIDES_AND_REVIEWS: Self = Self {
        guides: true,
        reviews: true,
    };
}

/// Public projection of a user: no password data, no internal revision marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicUser {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub role: String,
}

/// A review projected to `review`, `rating` and `user`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSummary {
    pub id: DbId,
    pub review: String,
    pub rating: f64,
    pub user: DbId,
    #[serde(skip)]
    pub tour: DbId,
}

/// A reference that could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub path: &'static str,
    pub id: DbId,
}

/// Guides as stored (ids) or as resolved users.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Guides {
    Ids(Vec<DbId>),
    Users(Vec<PublicUser>),
}

/// The read model of a tour, with virtual fields and populated relations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulatedTour {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub duration: i32,
    pub duration_weeks: f64,
    pub max_group_size: i32,
    pub difficulty: Difficulty,
    pub ratings_average: f64,
    pub ratings_quantity: i32,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_discount: Option<f64>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image_cover: String,
    pub images: Vec<String>,
    pub start_dates: Vec<Timestamp>,
    pub secret_tour: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    pub guides: Guides,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<ReviewSummary>>,
}

impl PopulatedTour {
    /// Build the unpopulated read model of a record.
    pub fn from_record(record: TourRecord, projection: Projection) -> Self {
        Self {
            duration_weeks: record.duration_weeks(),
            id: record.id,
            name: record.name,
            slug: record.slug,
            duration: record.duration,
            max_group_size: record.max_group_size,
            difficulty: record.difficulty,
            ratings_average: record.ratings_average,
            ratings_quantity: record.ratings_quantity,
            price: record.price,
            price_discount: record.price_discount,
            summary: record.summary,
            description: record.description,
            image_cover: record.image_cover,
            images: record.images,
            start_dates: record.start_dates,
            secret_tour: record.secret_tour,
            created_at: projection.include_created_at.then_some(record.created_at),
            guides: Guides::Ids(record.guides),
            reviews: None,
        }
    }
}

/// Distinct guide ids referenced by `tours`, in ascending order.
pub fn guide_ids(tours: &[TourRecord]) -> Vec<DbId> {
    tours
        .iter()
        .flat_map(|t| t.guides.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Merge resolved users and reviews into the read models of `tours`.
///
/// Guides keep the order of the stored references; ids with no matching
/// user are dropped and returned as [`UnresolvedReference`]s. Reviews are
/// attached to the tour they point at.
pub fn populate(
    tours: Vec<TourRecord>,
    projection: Projection,
    spec: PopulateSpec,
    users: &[PublicUser],
    reviews: &[ReviewSummary],
) -> (Vec<PopulatedTour>, Vec<UnresolvedReference>) {
    let users_by_id: HashMap<DbId, &PublicUser> = users.iter().map(|u| (u.id, u)).collect();
    let mut reviews_by_tour: HashMap<DbId, Vec<ReviewSummary>> = HashMap::new();
    if spec.reviews {
        for review in reviews {
            reviews_by_tour
                .entry(review.tour)
                .or_default()
                .push(review.clone());
        }
    }

    let mut unresolved = Vec::new();
    let populated = tours
        .into_iter()
        .map(|record| {
            let tour_id = record.id;
            let mut tour = PopulatedTour::from_record(record, projection);

            if spec.guides {
                if let Guides::Ids(ids) = &tour.guides {
                    let mut resolved = Vec::with_capacity(ids.len());
                    for id in ids {
                        match users_by_id.get(id) {
                            Some(user) => resolved.push((*user).clone()),
                            None => unresolved.push(UnresolvedReference {
                                path: "guides",
                                id: *id,
                            }),
                        }
                    }
                    tour.guides = Guides::Users(resolved);
                }
            }

            if spec.reviews {
                tour.reviews = Some(reviews_by_tour.remove(&tour_id).unwrap_or_default());
            }

            tour
        })
        .collect();

    (populated, unresolved)
}
