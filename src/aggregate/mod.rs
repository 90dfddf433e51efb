//! Weighted aggregator.
//!
//! Groups a [`Relation`] by one or two dimensions and counts works per
//! group, either exactly (distinct work ids) or fractionally (see
//! [`weights`]).
//!
//! Results sort by key ascending, except a single categorical dimension,
//! which sorts by count descending with ties broken by key.

pub mod contingency;
pub mod query;
pub mod weights;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::types::{Dimension, GroupKey, PublicationRecord, Relation};

pub use contingency::{contingency, ContingencyTable};
pub use query::{AggregateQuery, Preset};
pub use weights::{fractional_weights, weights_by_work, Partition, WeightedRow};

/// Rejected aggregation requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    /// Only one or two grouping dimensions are supported.
    #[error("Expected 1 or 2 grouping dimensions, got {0}")]
    UnsupportedDimensions(usize),
    /// Year bin widths must be positive.
    #[error("Invalid year interval: {0}")]
    InvalidInterval(i32),
    /// The weighted dimension must be the last grouping dimension.
    #[error("Weight dimension {0} is not the last grouping dimension")]
    WeightDimensionNotGrouped(Dimension),
}

impl AggregateError {
    /// Machine-readable code for adapters.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedDimensions(_) => "UNSUPPORTED_DIMENSIONS",
            Self::InvalidInterval(_) => "INVALID_INTERVAL",
            Self::WeightDimensionNotGrouped(_) => "WEIGHT_DIMENSION_NOT_GROUPED",
        }
    }
}

/// How counts were computed. Adapters label axes from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountKind {
    /// Distinct work ids per group.
    Exact,
    /// Sum of fractional weights per group.
    Proportional,
}

/// One group and its count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    /// Group key, one entry per grouping dimension.
    pub keys: Vec<GroupKey>,
    /// Works in the group. Integral for [`CountKind::Exact`].
    pub count: f64,
}

/// Aggregation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Grouping dimensions, outer first.
    pub dimensions: Vec<Dimension>,
    /// Weighted dimension, for proportional counts.
    pub weight: Option<Dimension>,
    /// Year bin width used.
    pub interval: Option<i32>,
    /// Count mode.
    pub count_kind: CountKind,
    /// Sorted rows.
    pub rows: Vec<AggregateRow>,
}

impl Aggregate {
    /// Count for a group key.
    pub fn get(&self, keys: &[GroupKey]) -> Option<f64> {
        self.rows.iter().find(|r| r.keys == keys).map(|r| r.count)
    }

    /// Sum of all counts.
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.count).sum()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no groups.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Empty result shaped like `query`.
    pub fn empty(query: &AggregateQuery) -> Self {
        Self {
            dimensions: query.group_by.clone(),
            weight: query.weight,
            interval: query.interval,
            count_kind: count_kind(query),
            rows: Vec::new(),
        }
    }
}

fn count_kind(query: &AggregateQuery) -> CountKind {
    if query.weight.is_some() {
        CountKind::Proportional
    } else {
        CountKind::Exact
    }
}

/// Group and count.
///
/// Groups containing an unset value are skipped.
pub fn aggregate(relation: &Relation, query: &AggregateQuery) -> Result<Aggregate, AggregateError> {
    query.validate()?;

    let counts: BTreeMap<Vec<GroupKey>, f64> = match query.weight {
        None => exact_counts(relation, query),
        Some(weight) => proportional_counts(relation, query, weight),
    };

    let mut rows: Vec<AggregateRow> = counts
        .into_iter()
        .map(|(keys, count)| AggregateRow { keys, count })
        .collect();

    if query.sorts_by_count() {
        // Stable sort over key-ordered rows keeps ties in key order.
        rows.sort_by(|a, b| b.count.total_cmp(&a.count));
    }

    tracing::debug!(
        dimensions = ?query.group_by,
        weight = ?query.weight,
        groups = rows.len(),
        "Aggregated relation"
    );

    Ok(Aggregate {
        dimensions: query.group_by.clone(),
        weight: query.weight,
        interval: query.interval,
        count_kind: count_kind(query),
        rows,
    })
}

fn group_key(query: &AggregateQuery, record: &PublicationRecord) -> Option<Vec<GroupKey>> {
    query
        .group_by
        .iter()
        .map(|dim| dim.key(record, query.interval))
        .collect()
}

fn exact_counts(relation: &Relation, query: &AggregateQuery) -> BTreeMap<Vec<GroupKey>, f64> {
    let mut works: BTreeMap<Vec<GroupKey>, BTreeSet<&str>> = BTreeMap::new();
    for record in relation {
        if let Some(keys) = group_key(query, record) {
            works.entry(keys).or_default().insert(record.id.as_str());
        }
    }
    works
        .into_iter()
        .map(|(keys, ids)| (keys, ids.len() as f64))
        .collect()
}

fn proportional_counts(
    relation: &Relation,
    query: &AggregateQuery,
    weight: Dimension,
) -> BTreeMap<Vec<GroupKey>, f64> {
    let partition = match query.group_by.as_slice() {
        [outer, _] => Some(Partition {
            dimension: *outer,
            interval: query.interval,
        }),
        _ => None,
    };

    let mut sums: BTreeMap<Vec<GroupKey>, f64> = BTreeMap::new();
    for row in fractional_weights(relation, weight, partition) {
        if let Some(keys) = group_key(query, row.record) {
            *sums.entry(keys).or_insert(0.0) += row.weight;
        }
    }
    sums
}
