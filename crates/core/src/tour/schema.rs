//! Tour record types and the lenient document reader used for candidates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::tour::validation::Violation;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Schema constants
// ---------------------------------------------------------------------------

pub const NAME_MIN_LEN: usize = 10;
pub const NAME_MAX_LEN: usize = 40;

pub const RATING_MIN: f64 = 1.0;
pub const RATING_MAX: f64 = 5.0;

pub const DEFAULT_RATINGS_AVERAGE: f64 = 4.5;
pub const DEFAULT_RATINGS_QUANTITY: i32 = 0;

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// How demanding a tour is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Difficult,
}

impl Difficulty {
    /// Wire names of every variant, in declaration order.
    pub const ALLOWED: &'static [&'static str] = &["easy", "medium", "difficult"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Difficult => "difficult",
        }
    }

    /// Parse a wire name. Matching is exact: `"Easy"` is not accepted.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "difficult" => Some(Self::Difficult),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Stored record
// ---------------------------------------------------------------------------

/// A persisted tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourRecord {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub duration: i32,
    pub max_group_size: i32,
    pub difficulty: Difficulty,
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

impl TourRecord {
    /// Virtual field: tour length in weeks.
    pub fn duration_weeks(&self) -> f64 {
        f64::from(self.duration) / 7.0
    }
}

/// A validated, normalized tour that has not been persisted yet.
///
/// There is no slug here: the slug is derived from `name` by the save
/// pipeline right before the record is handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTour {
    pub name: String,
    pub duration: i32,
    pub max_group_size: i32,
    pub difficulty: Difficulty,
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

impl NewTour {
    /// Attach the store identity and derived slug.
    pub fn into_record(self, id: DbId, slug: String) -> TourRecord {
        TourRecord {
            id,
            name: self.name,
            slug,
            duration: self.duration,
            max_group_size: self.max_group_size,
            difficulty: self.difficulty,
            ratings_average: self.ratings_average,
            ratings_quantity: self.ratings_quantity,
            price: self.price,
            price_discount: self.price_discount,
            summary: self.summary,
            description: self.description,
            image_cover: self.image_cover,
            images: self.images,
            created_at: self.created_at,
            start_dates: self.start_dates,
            secret_tour: self.secret_tour,
            guides: self.guides,
        }
    }
}

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// A candidate tour, possibly partial, as submitted by a caller.
///
/// Every field is optional so that absence can be reported as a violation
/// instead of failing deserialization. Fields whose JSON value had the wrong
/// type are left empty and remembered in `type_violations`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TourDraft {
    pub name: Option<String>,
    pub duration: Option<i32>,
    pub max_group_size: Option<i32>,
    pub difficulty: Option<String>,
    pub ratings_average: Option<f64>,
    pub ratings_quantity: Option<i32>,
    pub price: Option<f64>,
    pub price_discount: Option<f64>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub image_cover: Option<String>,
    pub images: Option<Vec<String>>,
    pub created_at: Option<Timestamp>,
    pub start_dates: Option<Vec<Timestamp>>,
    pub secret_tour: Option<bool>,
    pub guides: Option<Vec<DbId>>,
    pub(crate) type_violations: Vec<Violation>,
}

impl TourDraft {
    /// Read a candidate from a JSON object.
    ///
    /// Unknown keys are ignored, and so is `slug`: it is always derived.
    pub fn from_document(document: &Map<String, Value>) -> Self {
        let mut draft = Self::default();
        draft.apply_document(document);
        draft
    }

    /// Start from a stored record, e.g. as the base of an update.
    pub fn from_record(record: &TourRecord) -> Self {
        Self {
            name: Some(record.name.clone()),
            duration: Some(record.duration),
            max_group_size: Some(record.max_group_size),
            difficulty: Some(record.difficulty.as_str().to_string()),
            ratings_average: Some(record.ratings_average),
            ratings_quantity: Some(record.ratings_quantity),
            price: Some(record.price),
            price_discount: record.price_discount,
            summary: Some(record.summary.clone()),
            description: record.description.clone(),
            image_cover: Some(record.image_cover.clone()),
            images: Some(record.images.clone()),
            created_at: Some(record.created_at),
            start_dates: Some(record.start_dates.clone()),
            secret_tour: Some(record.secret_tour),
            guides: Some(record.guides.clone()),
            type_violations: Vec::new(),
        }
    }

    /// Overwrite every field present in `document`. A JSON `null` clears the
    /// field.
    pub fn apply_document(&mut self, document: &Map<String, Value>) {
        let mut reader = FieldReader {
            document,
            violations: &mut self.type_violations,
        };

        reader.string("name", &mut self.name);
        reader.integer("duration", &mut self.duration);
        reader.integer("max_group_size", &mut self.max_group_size);
        reader.string("difficulty", &mut self.difficulty);
        reader.number("ratings_average", &mut self.ratings_average);
        reader.integer("ratings_quantity", &mut self.ratings_quantity);
        reader.number("price", &mut self.price);
        reader.number("price_discount", &mut self.price_discount);
        reader.string("summary", &mut self.summary);
        reader.string("description", &mut self.description);
        reader.string("image_cover", &mut self.image_cover);
        reader.strings("images", &mut self.images);
        reader.timestamps("start_dates", &mut self.start_dates);
        reader.boolean("secret_tour", &mut self.secret_tour);
        reader.ids("guides", &mut self.guides);
    }

    /// Whether `field` held a value of the wrong JSON type.
    pub fn is_mistyped(&self, field: &str) -> bool {
        self.type_violations.iter().any(|v| v.field() == field)
    }
}

/// Reads typed fields out of a JSON object, recording type mismatches.
struct FieldReader<'a> {
    document: &'a Map<String, Value>,
    violations: &'a mut Vec<Violation>,
}

impl FieldReader<'_> {
    fn read<T>(
        &mut self,
        field: &'static str,
        expected: &'static str,
        slot: &mut Option<T>,
        convert: impl FnOnce(&Value) -> Option<T>,
    ) {
        let Some(value) = self.document.get(field) else {
            return;
        };
        // A later document replaces any mismatch recorded for this field.
        self.violations.retain(|v| v.field() != field);
        if value.is_null() {
            *slot = None;
            return;
        }
        match convert(value) {
            Some(converted) => *slot = Some(converted),
            None => {
                *slot = None;
                self.violations
                    .push(Violation::InvalidType { field, expected });
            }
        }
    }

    fn string(&mut self, field: &'static str, slot: &mut Option<String>) {
        self.read(field, "string", slot, |v| v.as_str().map(str::to_string));
    }

    fn number(&mut self, field: &'static str, slot: &mut Option<f64>) {
        self.read(field, "number", slot, Value::as_f64);
    }

    /// Any JSON number with no fractional part, so `5` and `5.0` both read as 5.
    fn integer(&mut self, field: &'static str, slot: &mut Option<i32>) {
        self.read(field, "integer", slot, |v| match v.as_i64() {
            Some(n) => i32::try_from(n).ok(),
            None => v
                .as_f64()
                .filter(|n| n.fract() == 0.0)
                .filter(|n| (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(n))
                .map(|n| n as i32),
        });
    }

    fn boolean(&mut self, field: &'static str, slot: &mut Option<bool>) {
        self.read(field, "boolean", slot, Value::as_bool);
    }

    fn strings(&mut self, field: &'static str, slot: &mut Option<Vec<String>>) {
        self.read(field, "array of strings", slot, |v| {
            v.as_array()?
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect()
        });
    }

    fn timestamps(&mut self, field: &'static str, slot: &mut Option<Vec<Timestamp>>) {
        self.read(field, "array of RFC 3339 timestamps", slot, |v| {
            v.as_array()?
                .iter()
                .map(|item| {
                    let raw = item.as_str()?;
                    chrono::DateTime::parse_from_rfc3339(raw)
                        .ok()
                        .map(|dt| dt.with_timezone(&chrono::Utc))
                })
                .collect()
        });
    }

    fn ids(&mut self, field: &'static str, slot: &mut Option<Vec<DbId>>) {
        self.read(field, "array of ids", slot, |v| {
            v.as_array()?.iter().map(Value::as_i64).collect()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    #[test]
    fn difficulty_parse_is_exact() {
        assert_eq!(Difficulty::parse("easy"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::parse("difficult"), Some(Difficulty::Difficult));
        assert_eq!(Difficulty::parse("Easy"), None);
        assert_eq!(Difficulty::parse("hard"), None);
    }

    #[test]
    fn reads_typed_fields() {
        let draft = TourDraft::from_document(&doc(json!({
            "name": "The Forest Hiker",
            "duration": 5,
            "price": 397.5,
            "secret_tour": true,
            "images": ["a.jpg", "b.jpg"],
            "guides": [3, 4],
            "start_dates": ["2021-04-25T09:00:00Z"],
        })));

        assert_eq!(draft.name.as_deref(), Some("The Forest Hiker"));
        assert_eq!(draft.duration, Some(5));
        assert_eq!(draft.price, Some(397.5));
        assert_eq!(draft.secret_tour, Some(true));
        assert_eq!(draft.images.as_ref().map(Vec::len), Some(2));
        assert_eq!(draft.guides, Some(vec![3, 4]));
        assert_eq!(draft.start_dates.as_ref().map(Vec::len), Some(1));
        assert!(draft.type_violations.is_empty());
    }

    #[test]
    fn wrong_types_are_recorded() {
        let draft = TourDraft::from_document(&doc(json!({
            "duration": "five",
            "price": 10.5,
            "max_group_size": 2.5,
            "images": ["ok.jpg", 3],
        })));

        assert_eq!(draft.duration, None);
        assert_eq!(draft.max_group_size, None);
        assert!(draft.is_mistyped("duration"));
        assert!(draft.is_mistyped("max_group_size"));
        assert!(draft.is_mistyped("images"));
        assert!(!draft.is_mistyped("price"));
    }

    #[test]
    fn whole_floats_read_as_integers() {
        let draft = TourDraft::from_document(&doc(json!({
            "name": "The Forest Hiker",
            "duration": 5.0,
            "max_group_size": 25.0,
            "difficulty": "easy",
            "ratings_quantity": 0.0,
            "price": 397,
            "summary": "Breathtaking hike through the Canadian Banff National Park",
            "image_cover": "tour-1-cover.jpg",
        })));

        assert_eq!(draft.duration, Some(5));
        assert_eq!(draft.max_group_size, Some(25));
        assert_eq!(draft.ratings_quantity, Some(0));
        assert!(crate::tour::validation::collect_violations(&draft).is_empty());
    }

    #[test]
    fn out_of_range_integers_are_mistyped() {
        let draft = TourDraft::from_document(&doc(json!({
            "duration": 3.0e10,
            "max_group_size": 4_000_000_000_i64,
        })));
        assert!(draft.is_mistyped("duration"));
        assert!(draft.is_mistyped("max_group_size"));
    }

    #[test]
    fn slug_input_is_ignored() {
        let draft = TourDraft::from_document(&doc(json!({ "slug": "custom-slug" })));
        assert_eq!(draft, TourDraft::default());
    }

    #[test]
    fn patch_overwrites_and_null_clears() {
        let record = TourRecord {
            id: 1,
            name: "The Sea Explorer".into(),
            slug: "the-sea-explorer".into(),
            duration: 7,
            max_group_size: 15,
            difficulty: Difficulty::Medium,
            ratings_average: 4.8,
            ratings_quantity: 23,
            price: 497.0,
            price_discount: Some(50.0),
            summary: "Exploring the jaw-dropping US east coast".into(),
            description: None,
            image_cover: "tour-2-cover.jpg".into(),
            images: vec![],
            created_at: chrono::Utc::now(),
            start_dates: vec![],
            secret_tour: false,
            guides: vec![],
        };

        let mut draft = TourDraft::from_record(&record);
        draft.apply_document(&doc(json!({ "price": 600, "price_discount": null })));

        assert_eq!(draft.price, Some(600.0));
        assert_eq!(draft.price_discount, None);
        assert_eq!(draft.name.as_deref(), Some("The Sea Explorer"));
        assert_eq!(draft.created_at, Some(record.created_at));
    }

    #[test]
    fn duration_weeks_is_fractional() {
        let record = TourRecord {
            id: 1,
            name: "The Snow Adventurer".into(),
            slug: "the-snow-adventurer".into(),
            duration: 4,
            max_group_size: 10,
            difficulty: Difficulty::Difficult,
            ratings_average: 4.5,
            ratings_quantity: 0,
            price: 997.0,
            price_discount: None,
            summary: "Exciting adventure in the snow".into(),
            description: None,
            image_cover: "tour-3-cover.jpg".into(),
            images: vec![],
            created_at: chrono::Utc::now(),
            start_dates: vec![],
            secret_tour: false,
            guides: vec![],
        };
        assert!((record.duration_weeks() - 4.0 / 7.0).abs() < f64::EPSILON);
    }
}
