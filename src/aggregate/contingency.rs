//! Contingency tables for correspondence analysis.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::types::{Dimension, Relation};

/// Row-count cross-tabulation of two categorical dimensions.
///
/// Rows with either value unset are not counted. Labels are sorted
/// ascending and `cells[i][j]` counts rows with `row_labels[i]` and
/// `col_labels[j]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingencyTable {
    /// Dimension along the rows.
    pub row_dimension: Dimension,
    /// Dimension along the columns.
    pub col_dimension: Dimension,
    /// Row labels.
    pub row_labels: Vec<String>,
    /// Column labels.
    pub col_labels: Vec<String>,
    /// Dense cell counts.
    pub cells: Vec<Vec<u64>>,
}

impl ContingencyTable {
    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_labels.len(), self.col_labels.len())
    }

    /// Whether both axes have at least `min_dim` labels.
    pub fn is_sufficient(&self, min_dim: usize) -> bool {
        let (rows, cols) = self.shape();
        rows >= min_dim && cols >= min_dim
    }

    /// Sum of all cells.
    pub fn total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }

    /// Count for a label pair.
    pub fn get(&self, row: &str, col: &str) -> Option<u64> {
        let i = self.row_labels.iter().position(|l| l == row)?;
        let j = self.col_labels.iter().position(|l| l == col)?;
        Some(self.cells[i][j])
    }
}

/// Cross-tabulate `rows` × `cols`.
pub fn contingency(relation: &Relation, rows: Dimension, cols: Dimension) -> ContingencyTable {
    let mut counts: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for record in relation {
        if let (Some(r), Some(c)) = (rows.text(record), cols.text(record)) {
            *counts.entry((r, c)).or_insert(0) += 1;
        }
    }

    let row_labels: Vec<String> = counts
        .keys()
        .map(|(r, _)| *r)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    let col_labels: Vec<String> = counts
        .keys()
        .map(|(_, c)| *c)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let cells = row_labels
        .iter()
        .map(|r| {
            col_labels
                .iter()
                .map(|c| counts.get(&(r.as_str(), c.as_str())).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    ContingencyTable {
        row_dimension: rows,
        col_dimension: cols,
        row_labels,
        col_labels,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PublicationRecord;

    fn relation() -> Relation {
        vec![
            ("g1", "latina"),
            ("g1", "latina"),
            ("g1", "čeština"),
            ("g2", "němčina"),
            ("g3", "latina"),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (genre, language))| {
            PublicationRecord::new(format!("b{}", i), "P1", 1650)
                .with_genre(genre)
                .with_language(language)
        })
        .chain(std::iter::once(PublicationRecord::new("b9", "P1", 1650).with_genre("g1")))
        .collect()
    }

    #[test]
    fn test_crosstab_counts_rows() {
        let table = contingency(&relation(), Dimension::Genre, Dimension::Language);
        assert_eq!(table.shape(), (3, 3));
        assert_eq!(table.get("g1", "latina"), Some(2));
        assert_eq!(table.get("g2", "latina"), Some(0));
        assert_eq!(table.total(), 5);
    }

    #[test]
    fn test_sufficiency_threshold() {
        let table = contingency(&relation(), Dimension::Genre, Dimension::Language);
        assert!(table.is_sufficient(3));
        assert!(!table.is_sufficient(4));

        let empty = contingency(&Relation::empty(), Dimension::Genre, Dimension::Language);
        assert_eq!(empty.shape(), (0, 0));
        assert!(!empty.is_sufficient(3));
    }
}
