//! Domain logic for the Natours tour catalogue.
//!
//! Everything in this crate is pure: schema validation, slug derivation,
//! read-filter and aggregation rewriting, and relation merging. Storage and
//! HTTP live in `natours-db` and `natours-api`.

pub mod error;
pub mod populate;
pub mod query;
pub mod tour;
pub mod types;
