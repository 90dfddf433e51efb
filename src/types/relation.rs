//! The denormalized publication relation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::record::PublicationRecord;

/// An ordered sequence of publication rows.
///
/// Every pipeline stage returns a new `Relation`; none mutates its input.
/// Row order carries no meaning for aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    rows: Vec<PublicationRecord>,
}

impl Relation {
    /// Wrap rows into a relation.
    pub fn new(rows: Vec<PublicationRecord>) -> Self {
        Self { rows }
    }

    /// The empty relation.
    pub fn empty() -> Self {
        Self::default()
    }

    /// All rows.
    pub fn rows(&self) -> &[PublicationRecord] {
        &self.rows
    }

    /// Iterate over rows.
    pub fn iter(&self) -> std::slice::Iter<'_, PublicationRecord> {
        self.rows.iter()
    }

    /// Number of rows (not works).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct works.
    pub fn distinct_works(&self) -> usize {
        self.rows.iter().map(|r| r.id.as_str()).collect::<BTreeSet<_>>().len()
    }

    /// Distinct printers, sorted.
    pub fn printers(&self) -> BTreeSet<&str> {
        self.rows.iter().map(|r| r.printer.as_str()).collect()
    }

    /// Minimum and maximum publication year, if any rows exist.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let min = self.rows.iter().map(|r| r.publish_year).min()?;
        let max = self.rows.iter().map(|r| r.publish_year).max()?;
        Some((min, max))
    }

    /// Consume into rows.
    pub fn into_rows(self) -> Vec<PublicationRecord> {
        self.rows
    }
}

impl FromIterator<PublicationRecord> for Relation {
    fn from_iter<T: IntoIterator<Item = PublicationRecord>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Relation {
    type Item = &'a PublicationRecord;
    type IntoIter = std::slice::Iter<'a, PublicationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_works_counts_ids_not_rows() {
        let relation: Relation = vec![
            PublicationRecord::new("b1", "P1", 1650).with_author("A1"),
            PublicationRecord::new("b1", "P1", 1650).with_author("A2"),
            PublicationRecord::new("b2", "P2", 1660),
        ]
        .into_iter()
        .collect();

        assert_eq!(relation.len(), 3);
        assert_eq!(relation.distinct_works(), 2);
        assert_eq!(relation.year_bounds(), Some((1650, 1660)));
    }

    #[test]
    fn test_empty_bounds() {
        assert_eq!(Relation::empty().year_bounds(), None);
    }
}
