//! Row structs for the `tours`, `users` and `reviews` tables.
//!
//! Rows are mapped into the `natours-core` records before they leave the
//! crate; nothing here is serialized directly.

pub mod review;
pub mod tour;
pub mod user;
