//! Fractional weighting of multi-valued attributes.
//!
//! A work spread over several rows by a multi-valued column contributes a
//! total of 1 to that column's buckets. Each row whose weighted value is
//! set receives `1 / n`, where `n` counts the set rows in its partition.
//! The partition is the work id, or (outer key, work id) for a
//! cross-tabulation, so the sum is 1 per work within each outer group.

use std::collections::{BTreeMap, HashMap};

use crate::types::{Dimension, GroupKey, PublicationRecord, Relation};

/// A row paired with its fractional weight.
#[derive(Debug, Clone, Copy)]
pub struct WeightedRow<'a> {
    /// Source row.
    pub record: &'a PublicationRecord,
    /// Contribution of the row to its bucket.
    pub weight: f64,
}

/// Outer partition of a cross-tabulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// Outer grouping dimension.
    pub dimension: Dimension,
    /// Year bin width, for a `Year` outer dimension.
    pub interval: Option<i32>,
}

/// Weight every row whose `dimension` value is set.
///
/// Rows with an unset weighted value, or an unset outer key, are omitted:
/// they neither receive weight nor enlarge a denominator.
pub fn fractional_weights<'a>(
    relation: &'a Relation,
    dimension: Dimension,
    partition: Option<Partition>,
) -> Vec<WeightedRow<'a>> {
    let keyed: Vec<(&'a PublicationRecord, (Option<GroupKey>, &'a str))> = relation
        .iter()
        .filter(|record| dimension.key(record, None).is_some())
        .filter_map(|record| {
            let outer = match partition {
                Some(p) => Some(p.dimension.key(record, p.interval)?),
                None => None,
            };
            Some((record, (outer, record.id.as_str())))
        })
        .collect();

    let mut sizes: HashMap<&(Option<GroupKey>, &str), usize> = HashMap::new();
    for (_, key) in &keyed {
        *sizes.entry(key).or_insert(0) += 1;
    }

    keyed
        .iter()
        .map(|(record, key)| WeightedRow {
            record: *record,
            weight: 1.0 / sizes[key] as f64,
        })
        .collect()
}

/// Weight per work and value: `id → value → Σ weight`.
///
/// For every work with at least one set value the inner weights sum to 1.
pub fn weights_by_work(relation: &Relation, dimension: Dimension) -> BTreeMap<String, BTreeMap<String, f64>> {
    let mut by_work: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for row in fractional_weights(relation, dimension, None) {
        if let Some(value) = dimension.text(row.record) {
            *by_work
                .entry(row.record.id.clone())
                .or_default()
                .entry(value.to_string())
                .or_insert(0.0) += row.weight;
        }
    }
    by_work
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_three_genres_split_evenly() {
        let relation: Relation = ["g1", "g2", "g3"]
            .iter()
            .map(|g| PublicationRecord::new("b1", "P1", 1650).with_genre(g))
            .collect();

        let weights = weights_by_work(&relation, Dimension::Genre);
        for weight in weights["b1"].values() {
            assert!((weight - 1.0 / 3.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_unset_rows_excluded_from_denominator() {
        let relation: Relation = vec![
            PublicationRecord::new("b1", "P1", 1650).with_genre("g1"),
            PublicationRecord::new("b1", "P1", 1650),
        ]
        .into_iter()
        .collect();

        let weights = weights_by_work(&relation, Dimension::Genre);
        assert!((weights["b1"]["g1"] - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_work_without_values_has_no_weights() {
        let relation: Relation = vec![PublicationRecord::new("b1", "P1", 1650)]
            .into_iter()
            .collect();
        assert!(weights_by_work(&relation, Dimension::Topic).is_empty());
    }

    #[test]
    fn test_repeated_value_sums_to_one() {
        // Two authors, one genre: two rows carry the same genre.
        let relation: Relation = vec![
            PublicationRecord::new("b1", "P1", 1650).with_author("A1").with_genre("g1"),
            PublicationRecord::new("b1", "P1", 1650).with_author("A2").with_genre("g1"),
        ]
        .into_iter()
        .collect();

        let weights = weights_by_work(&relation, Dimension::Genre);
        assert!((weights["b1"]["g1"] - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_partitioned_weights_sum_per_outer_group() {
        let relation: Relation = vec![
            PublicationRecord::new("b1", "P1", 1650).with_dynasty("D1").with_language("latina"),
            PublicationRecord::new("b1", "P1", 1650).with_dynasty("D1").with_language("čeština"),
            PublicationRecord::new("b1", "P2", 1650).with_dynasty("D2").with_language("latina"),
        ]
        .into_iter()
        .collect();

        let partition = Partition {
            dimension: Dimension::Dynasty,
            interval: None,
        };
        let rows = fractional_weights(&relation, Dimension::Language, Some(partition));

        let d1: f64 = rows
            .iter()
            .filter(|r| r.record.dynasty.as_str() == Some("D1"))
            .map(|r| r.weight)
            .sum();
        let d2: f64 = rows
            .iter()
            .filter(|r| r.record.dynasty.as_str() == Some("D2"))
            .map(|r| r.weight)
            .sum();
        assert!((d1 - 1.0).abs() < EPSILON);
        assert!((d2 - 1.0).abs() < EPSILON);
    }
}
