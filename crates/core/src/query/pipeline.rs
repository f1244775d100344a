//! Aggregation pipelines over tours and the secret-tour guard.
//!
//! A pipeline is a run of `Match` stages, exactly one `Group`, then any
//! number of `Sort` and `Limit` stages over the grouped rows.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::CoreError;
use crate::query::filter::{CompareOp, Condition, FilterValue, TourField, TourFilter};
use crate::tour::TourRecord;

/// Numeric tour fields that can be accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Price,
    RatingsAverage,
    RatingsQuantity,
    Duration,
    MaxGroupSize,
}

impl NumericField {
    fn value_of(self, tour: &TourRecord) -> f64 {
        match self {
            Self::Price => tour.price,
            Self::RatingsAverage => tour.ratings_average,
            Self::RatingsQuantity => f64::from(tour.ratings_quantity),
            Self::Duration => f64::from(tour.duration),
            Self::MaxGroupSize => f64::from(tour.max_group_size),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accumulator {
    Count,
    Sum(NumericField),
    Avg(NumericField),
    Min(NumericField),
    Max(NumericField),
}

/// What tours are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// A single group holding every matched tour.
    All,
    Difficulty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupSpec {
    pub by: GroupKey,
    /// Output metric name and how it is computed.
    pub accumulators: Vec<(String, Accumulator)>,
}

/// Order grouped rows by one of their metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSort {
    pub metric: String,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(TourFilter),
    Group(GroupSpec),
    Sort(GroupSort),
    Limit(usize),
}

/// An ordered list of stages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// The conjunction of the leading `Match` stages, which a store can push
    /// down into its own query before evaluating the rest.
    pub fn leading_filter(&self) -> TourFilter {
        let mut filter = TourFilter::new();
        for stage in &self.stages {
            let Stage::Match(m) = stage else { break };
            for c in m.conditions() {
                filter = filter.and(c.field, c.op, c.value.clone());
            }
        }
        filter
    }

    fn starts_with_exclusion(&self) -> bool {
        matches!(
            self.stages.first(),
            Some(Stage::Match(f)) if f.conditions() == [Condition::not_secret()]
        )
    }
}

/// One output row of a grouped pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    /// Group key: the difficulty name, or `null` for [`GroupKey::All`].
    pub key: Value,
    #[serde(flatten)]
    pub metrics: BTreeMap<String, f64>,
}

/// Prepend a stage excluding secret tours, unless the pipeline already
/// starts with exactly that stage. Guarding twice equals guarding once.
pub fn guard_pipeline(pipeline: Pipeline) -> Pipeline {
    if pipeline.starts_with_exclusion() {
        return pipeline;
    }
    let mut stages = Vec::with_capacity(pipeline.stages.len() + 1);
    stages.push(Stage::Match(TourFilter::new().and(
        TourField::SecretTour,
        CompareOp::Ne,
        FilterValue::Bool(true),
    )));
    stages.extend(pipeline.stages);
    Pipeline { stages }
}

/// Run a pipeline over a set of tours.
pub fn evaluate_pipeline(
    pipeline: &Pipeline,
    tours: &[TourRecord],
) -> Result<Vec<GroupRow>, CoreError> {
    let mut matched: Vec<&TourRecord> = tours.iter().collect();
    let mut rows: Option<Vec<GroupRow>> = None;

    for stage in &pipeline.stages {
        match stage {
            Stage::Match(filter) => {
                if rows.is_some() {
                    return Err(CoreError::Validation(
                        "match stages must precede the group stage".into(),
                    ));
                }
                matched.retain(|t| filter.matches(t));
            }
            Stage::Group(spec) => {
                if rows.is_some() {
                    return Err(CoreError::Validation(
                        "a pipeline may contain only one group stage".into(),
                    ));
                }
                rows = Some(group(spec, &matched));
            }
            Stage::Sort(sort) => sort_rows(grouped(&mut rows)?, sort)?,
            Stage::Limit(n) => grouped(&mut rows)?.truncate(*n),
        }
    }

    rows.ok_or_else(|| CoreError::Validation("pipeline has no group stage".into()))
}

fn grouped(rows: &mut Option<Vec<GroupRow>>) -> Result<&mut Vec<GroupRow>, CoreError> {
    rows.as_mut().ok_or_else(|| {
        CoreError::Validation("sort and limit stages must follow the group stage".into())
    })
}

fn group(spec: &GroupSpec, tours: &[&TourRecord]) -> Vec<GroupRow> {
    let mut buckets: BTreeMap<Option<&'static str>, Vec<&TourRecord>> = BTreeMap::new();
    for tour in tours {
        let key = match spec.by {
            GroupKey::All => None,
            GroupKey::Difficulty => Some(tour.difficulty.as_str()),
        };
        buckets.entry(key).or_default().push(*tour);
    }

    buckets
        .into_iter()
        .map(|(key, members)| GroupRow {
            key: key.map_or(Value::Null, |k| Value::String(k.to_string())),
            metrics: spec
                .accumulators
                .iter()
                .map(|(name, acc)| (name.clone(), accumulate(*acc, &members)))
                .collect(),
        })
        .collect()
}

fn accumulate(acc: Accumulator, members: &[&TourRecord]) -> f64 {
    let values = |field: NumericField| members.iter().map(move |t| field.value_of(t));
    match acc {
        Accumulator::Count => members.len() as f64,
        Accumulator::Sum(f) => values(f).sum(),
        Accumulator::Avg(f) => values(f).sum::<f64>() / members.len() as f64,
        Accumulator::Min(f) => values(f).fold(f64::INFINITY, f64::min),
        Accumulator::Max(f) => values(f).fold(f64::NEG_INFINITY, f64::max),
    }
}

fn sort_rows(rows: &mut [GroupRow], sort: &GroupSort) -> Result<(), CoreError> {
    if rows.iter().any(|r| !r.metrics.contains_key(&sort.metric)) {
        return Err(CoreError::Validation(format!(
            "unknown sort metric '{}'",
            sort.metric
        )));
    }
    rows.sort_by(|a, b| {
        let ordering = a.metrics[&sort.metric].total_cmp(&b.metrics[&sort.metric]);
        if sort.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
    Ok(())
}

/// Per-difficulty statistics over well-rated tours, cheapest first.
pub fn tour_stats_pipeline() -> Pipeline {
    Pipeline::new()
        .stage(Stage::Match(TourFilter::new().and(
            TourField::RatingsAverage,
            CompareOp::Gte,
            FilterValue::Number(4.5),
        )))
        .stage(Stage::Group(GroupSpec {
            by: GroupKey::Difficulty,
            accumulators: vec![
                ("num_tours".into(), Accumulator::Count),
                (
                    "num_ratings".into(),
                    Accumulator::Sum(NumericField::RatingsQuantity),
                ),
                (
                    "avg_rating".into(),
                    Accumulator::Avg(NumericField::RatingsAverage),
                ),
                ("avg_price".into(), Accumulator::Avg(NumericField::Price)),
                ("min_price".into(), Accumulator::Min(NumericField::Price)),
                ("max_price".into(), Accumulator::Max(NumericField::Price)),
            ],
        }))
        .stage(Stage::Sort(GroupSort {
            metric: "avg_price".into(),
            descending: false,
        }))
}
