//! Rule validation and normalization for tour candidates.
//!
//! Rules are evaluated independently and every violation is collected, so a
//! caller can report all problems with a candidate at once. Uniqueness of the
//! name needs the store and is appended by the save pipeline in `natours-db`.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::tour::schema::{
    Difficulty, NewTour, TourDraft, DEFAULT_RATINGS_AVERAGE, DEFAULT_RATINGS_QUANTITY,
    NAME_MAX_LEN, NAME_MIN_LEN, RATING_MAX, RATING_MIN,
};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// The limit a value fell outside of.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", content = "limit", rename_all = "snake_case")]
pub enum Bound {
    MinLength(usize),
    MaxLength(usize),
    Min(f64),
    Max(f64),
}

/// A single violated rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    MissingField {
        field: &'static str,
    },
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },
    OutOfRange {
        field: &'static str,
        bound: Bound,
        value: Value,
    },
    InvalidEnum {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },
    InvalidDiscount {
        discount: f64,
        price: f64,
    },
    DuplicateKey {
        field: &'static str,
        value: String,
    },
}

impl Violation {
    /// The field the violation is reported against.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field }
            | Self::InvalidType { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::InvalidEnum { field, .. }
            | Self::DuplicateKey { field, .. } => field,
            Self::InvalidDiscount { .. } => "price_discount",
        }
    }
}

fn field_label(field: &str) -> &str {
    match field {
        "name" => "name",
        "duration" => "duration",
        "max_group_size" => "group size",
        "difficulty" => "difficulty",
        "price" => "price",
        "summary" => "summary",
        "image_cover" => "cover image",
        other => other,
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "A tour must have a {}", field_label(field)),
            Self::InvalidType { field, expected } => write!(f, "{field} must be {expected}"),
            Self::OutOfRange { field, bound, .. } => match bound {
                Bound::MinLength(n) => {
                    write!(f, "A tour {field} must have at least {n} characters")
                }
                Bound::MaxLength(n) => {
                    write!(f, "A tour {field} must have at most {n} characters")
                }
                Bound::Min(n) => write!(f, "{field} must be at least {n:.1}"),
                Bound::Max(n) => write!(f, "{field} must be at most {n:.1}"),
            },
            Self::InvalidEnum { field, value, allowed } => write!(
                f,
                "{field} '{value}' is not one of: {}",
                allowed.join(", ")
            ),
            Self::InvalidDiscount { discount, price } => write!(
                f,
                "Discount ({discount}) must be below the tour price ({price})"
            ),
            Self::DuplicateKey { field, value } => {
                write!(f, "A tour with {field} '{value}' already exists")
            }
        }
    }
}

/// Every violation found for one candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, thiserror::Error)]
#[error("Tour validation failed: {}", join_messages(.0))]
pub struct ValidationErrors(pub Vec<Violation>);

impl ValidationErrors {
    pub fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.0
    }
}

fn join_messages(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Apply every field rule and the cross-field discount check.
pub fn collect_violations(draft: &TourDraft) -> Vec<Violation> {
    let mut violations = draft.type_violations.clone();

    let name = trimmed(&draft.name);
    let summary = trimmed(&draft.summary);
    let image_cover = trimmed(&draft.image_cover);
    let difficulty = trimmed(&draft.difficulty);

    // Presence.
    let presence = [
        ("name", name.is_some()),
        ("duration", draft.duration.is_some()),
        ("max_group_size", draft.max_group_size.is_some()),
        ("difficulty", difficulty.is_some()),
        ("price", draft.price.is_some()),
        ("summary", summary.is_some()),
        ("image_cover", image_cover.is_some()),
    ];
    for (field, present) in presence {
        if !present && !draft.is_mistyped(field) {
            violations.push(Violation::MissingField { field });
        }
    }

    // Length of the trimmed name, in characters.
    if let Some(name) = name {
        let len = name.chars().count();
        if len < NAME_MIN_LEN {
            violations.push(Violation::OutOfRange {
                field: "name",
                bound: Bound::MinLength(NAME_MIN_LEN),
                value: Value::String(name.to_string()),
            });
        } else if len > NAME_MAX_LEN {
            violations.push(Violation::OutOfRange {
                field: "name",
                bound: Bound::MaxLength(NAME_MAX_LEN),
                value: Value::String(name.to_string()),
            });
        }
    }

    // Rating range is checked on the raw value, before rounding.
    if let Some(rating) = draft.ratings_average {
        let bound = if rating < RATING_MIN {
            Some(Bound::Min(RATING_MIN))
        } else if rating > RATING_MAX {
            Some(Bound::Max(RATING_MAX))
        } else {
            None
        };
        if let Some(bound) = bound {
            violations.push(Violation::OutOfRange {
                field: "ratings_average",
                bound,
                value: Value::from(rating),
            });
        }
    }

    if let Some(difficulty) = difficulty {
        if Difficulty::parse(difficulty).is_none() {
            violations.push(Violation::InvalidEnum {
                field: "difficulty",
                value: difficulty.to_string(),
                allowed: Difficulty::ALLOWED,
            });
        }
    }

    // The discount is compared with the price of this same candidate.
    if let (Some(discount), Some(price)) = (draft.price_discount, draft.price) {
        if discount >= price {
            violations.push(Violation::InvalidDiscount { discount, price });
        }
    }

    violations
}

/// Round a rating to one decimal place.
pub fn round_rating(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Validate a candidate and, when it passes, build the normalized record:
/// strings trimmed, defaults applied, rating rounded, `created_at` stamped
/// with `now` unless the candidate already carries one.
pub fn validate(draft: &TourDraft, now: Timestamp) -> Result<NewTour, ValidationErrors> {
    let violations = collect_violations(draft);
    if !violations.is_empty() {
        return Err(ValidationErrors(violations));
    }

    let difficulty = trimmed(&draft.difficulty)
        .and_then(Difficulty::parse)
        .ok_or_else(|| missing("difficulty"))?;

    Ok(NewTour {
        name: required_text(&draft.name, "name")?,
        duration: draft.duration.ok_or_else(|| missing("duration"))?,
        max_group_size: draft
            .max_group_size
            .ok_or_else(|| missing("max_group_size"))?,
        difficulty,
        ratings_average: round_rating(draft.ratings_average.unwrap_or(DEFAULT_RATINGS_AVERAGE)),
        ratings_quantity: draft.ratings_quantity.unwrap_or(DEFAULT_RATINGS_QUANTITY),
        price: draft.price.ok_or_else(|| missing("price"))?,
        price_discount: draft.price_discount,
        summary: required_text(&draft.summary, "summary")?,
        description: trimmed(&draft.description).map(str::to_string),
        image_cover: required_text(&draft.image_cover, "image_cover")?,
        images: draft.images.clone().unwrap_or_default(),
        created_at: draft.created_at.unwrap_or(now),
        start_dates: draft.start_dates.clone().unwrap_or_default(),
        secret_tour: draft.secret_tour.unwrap_or(false),
        guides: draft.guides.clone().unwrap_or_default(),
    })
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn missing(field: &'static str) -> ValidationErrors {
    ValidationErrors(vec![Violation::MissingField { field }])
}

fn required_text(value: &Option<String>, field: &'static str) -> Result<String, ValidationErrors> {
    trimmed(value).map(str::to_string).ok_or_else(|| missing(field))
}
