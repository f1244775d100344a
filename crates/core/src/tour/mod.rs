//! The tour record: schema types, rule validation, and slug derivation.

pub mod schema;
pub mod slug;
pub mod validation;

pub use schema::{Difficulty, NewTour, TourDraft, TourRecord};
pub use slug::derive_slug;
pub use validation::{collect_violations, round_rating, validate, ValidationErrors, Violation};
