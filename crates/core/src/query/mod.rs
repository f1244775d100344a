//! Read-side query model: filters with the visibility rule, and aggregation
//! pipelines with the secret-tour guard.

pub mod filter;
pub mod pipeline;

pub use filter::{
    CompareOp, Condition, FilterValue, Projection, SortKey, TourField, TourFilter, TourQuery,
    Visibility,
};
pub use pipeline::{
    guard_pipeline, evaluate_pipeline, tour_stats_pipeline, Accumulator, GroupKey, GroupRow,
    GroupSort, GroupSpec, NumericField, Pipeline, Stage,
};
