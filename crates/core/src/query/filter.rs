//! Tour read filters and the secret-tour visibility rule.

use std::cmp::Ordering;

use crate::tour::TourRecord;
use crate::types::{DbId, Timestamp};

/// Default page size for tour listing.
pub const DEFAULT_LIMIT: i64 = 100;

/// Maximum page size for tour listing.
pub const MAX_LIMIT: i64 = 500;

// ---------------------------------------------------------------------------
// Fields and values
// ---------------------------------------------------------------------------

/// Scalar tour fields that can appear in a filter or a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TourField {
    Id,
    Name,
    Slug,
    Difficulty,
    Duration,
    MaxGroupSize,
    Price,
    PriceDiscount,
    RatingsAverage,
    RatingsQuantity,
    SecretTour,
    CreatedAt,
}

impl TourField {
    /// Column name in the `tours` table.
    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Slug => "slug",
            Self::Difficulty => "difficulty",
            Self::Duration => "duration",
            Self::MaxGroupSize => "max_group_size",
            Self::Price => "price",
            Self::PriceDiscount => "price_discount",
            Self::RatingsAverage => "ratings_average",
            Self::RatingsQuantity => "ratings_quantity",
            Self::SecretTour => "secret_tour",
            Self::CreatedAt => "created_at",
        }
    }

    /// Read this field from a record. `None` means the field is absent.
    pub fn value_of(self, tour: &TourRecord) -> Option<FilterValue> {
        let value = match self {
            Self::Id => FilterValue::Integer(tour.id),
            Self::Name => FilterValue::Text(tour.name.clone()),
            Self::Slug => FilterValue::Text(tour.slug.clone()),
            Self::Difficulty => FilterValue::Text(tour.difficulty.as_str().to_string()),
            Self::Duration => FilterValue::Integer(i64::from(tour.duration)),
            Self::MaxGroupSize => FilterValue::Integer(i64::from(tour.max_group_size)),
            Self::Price => FilterValue::Number(tour.price),
            Self::PriceDiscount => FilterValue::Number(tour.price_discount?),
            Self::RatingsAverage => FilterValue::Number(tour.ratings_average),
            Self::RatingsQuantity => FilterValue::Integer(i64::from(tour.ratings_quantity)),
            Self::SecretTour => FilterValue::Bool(tour.secret_tour),
            Self::CreatedAt => FilterValue::Timestamp(tour.created_at),
        };
        Some(value)
    }
}

/// A literal compared against a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    Timestamp(Timestamp),
}

impl FilterValue {
    /// Order two values of compatible kinds. Integers and numbers compare
    /// numerically; any other mix is unordered.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Number(b)) => (*a as f64).partial_cmp(b),
            (Self::Number(a), Self::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

// ---------------------------------------------------------------------------
// Conditions and filters
// ---------------------------------------------------------------------------

/// `field <op> value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: TourField,
    pub op: CompareOp,
    pub value: FilterValue,
}

impl Condition {
    pub fn new(field: TourField, op: CompareOp, value: FilterValue) -> Self {
        Self { field, op, value }
    }

    /// `secret_tour != true`: the exclusion added by the visibility rule.
    pub fn not_secret() -> Self {
        Self::new(TourField::SecretTour, CompareOp::Ne, FilterValue::Bool(true))
    }

    /// Evaluate against a record. `Ne` also matches an absent field;
    /// every other operator requires the field to be present.
    pub fn matches(&self, tour: &TourRecord) -> bool {
        let actual = self.field.value_of(tour);
        let ordering = || actual.as_ref().and_then(|a| a.compare(&self.value));
        match self.op {
            CompareOp::Eq => ordering() == Some(Ordering::Equal),
            CompareOp::Ne => ordering() != Some(Ordering::Equal),
            CompareOp::Gt => ordering() == Some(Ordering::Greater),
            CompareOp::Gte => matches!(ordering(), Some(Ordering::Greater | Ordering::Equal)),
            CompareOp::Lt => ordering() == Some(Ordering::Less),
            CompareOp::Lte => matches!(ordering(), Some(Ordering::Less | Ordering::Equal)),
        }
    }
}

/// Whether reads hide secret tours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Hide tours flagged `secret_tour`.
    #[default]
    PublicOnly,
    /// Explicit opt-in to unfiltered access.
    IncludeSecret,
}

/// A conjunction of conditions. The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TourFilter {
    conditions: Vec<Condition>,
}

impl TourFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: DbId) -> Self {
        Self::new().and(TourField::Id, CompareOp::Eq, FilterValue::Integer(id))
    }

    pub fn by_slug(slug: &str) -> Self {
        Self::new().and(
            TourField::Slug,
            CompareOp::Eq,
            FilterValue::Text(slug.to_string()),
        )
    }

    /// Add a condition.
    pub fn and(mut self, field: TourField, op: CompareOp, value: FilterValue) -> Self {
        self.conditions.push(Condition::new(field, op, value));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, tour: &TourRecord) -> bool {
        self.conditions.iter().all(|c| c.matches(tour))
    }

    /// Whether the filter already carries the secret-tour exclusion.
    pub fn excludes_secret(&self) -> bool {
        self.conditions.contains(&Condition::not_secret())
    }

    /// Narrow the filter according to `visibility`. Applying it to an
    /// already narrowed filter returns the filter unchanged.
    pub fn visible(mut self, visibility: Visibility) -> Self {
        if visibility == Visibility::PublicOnly && !self.excludes_secret() {
            self.conditions.push(Condition::not_secret());
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Full read query
// ---------------------------------------------------------------------------

/// Optional fields included in read results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Projection {
    /// `created_at` is hidden unless asked for.
    pub include_created_at: bool,
}

/// One sort key; ties fall back to ascending id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: TourField,
    pub descending: bool,
}

/// A listing query: filter, projection, order and page.
#[derive(Debug, Clone, PartialEq)]
pub struct TourQuery {
    pub filter: TourFilter,
    pub projection: Projection,
    pub sort: Vec<SortKey>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// When false, `limit` and `offset` are ignored and every match is returned.
    pub paged: bool,
}

impl Default for TourQuery {
    fn default() -> Self {
        Self {
            filter: TourFilter::default(),
            projection: Projection::default(),
            sort: vec![SortKey {
                field: TourField::CreatedAt,
                descending: true,
            }],
            limit: None,
            offset: None,
            paged: true,
        }
    }
}

impl TourQuery {
    pub fn with_filter(filter: TourFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Every tour matching `filter`, unpaged.
    pub fn all(filter: TourFilter) -> Self {
        Self {
            paged: false,
            ..Self::with_filter(filter)
        }
    }

    /// Page size clamped to `1..=MAX_LIMIT`.
    pub fn clamped_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn clamped_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// Order two records by the sort keys, then by id.
    pub fn compare(&self, a: &TourRecord, b: &TourRecord) -> Ordering {
        for key in &self.sort {
            let ordering = match (key.field.value_of(a), key.field.value_of(b)) {
                (Some(x), Some(y)) => x.compare(&y).unwrap_or(Ordering::Equal),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ordering = if key.descending {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        a.id.cmp(&b.id)
    }
}
