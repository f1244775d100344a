//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument and return raw rows.

pub mod review_repo;
pub mod tour_repo;
pub mod user_repo;

pub use review_repo::ReviewRepo;
pub use tour_repo::TourRepo;
pub use user_repo::UserRepo;
