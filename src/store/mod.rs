//! Record store backends.
//!
//! A backend yields the raw publication rows and the printer → dynasty
//! lookup. [`join_dynasties`] combines them into the denormalized
//! [`Relation`] with left-join semantics.

pub mod flat_file;
pub mod memory;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::types::{Attr, PublicationRecord, Relation};

/// Errors raised while loading backing data. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A source file could not be opened or read.
    #[error("Cannot read {path}: {source}")]
    Io {
        /// Offending file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The CSV reader rejected the file.
    #[error("Malformed CSV in {path}: {source}")]
    Csv {
        /// Offending file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: csv::Error,
    },
    /// A required column header is absent.
    #[error("Missing required column '{column}' in {path}")]
    MissingColumn {
        /// Offending file.
        path: PathBuf,
        /// Column header that was expected.
        column: &'static str,
    },
    /// A year cell could not be coerced to an integer.
    #[error("Invalid year '{value}' in {path} at line {line}")]
    InvalidYear {
        /// Offending file.
        path: PathBuf,
        /// 1-based line number.
        line: u64,
        /// Raw cell content.
        value: String,
    },
    /// The publication table has no rows.
    #[error("Publication table is empty")]
    EmptyDataset,
}

/// Printer → dynasty mapping.
///
/// A printer may be listed with an unset dynasty. The first mapping for a
/// printer wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynastyLookup {
    entries: BTreeMap<String, Attr>,
}

impl DynastyLookup {
    /// Create an empty lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mapping. Returns `false` when the printer was already mapped.
    pub fn insert(&mut self, printer: impl Into<String>, dynasty: Attr) -> bool {
        let printer = printer.into();
        if self.entries.contains_key(&printer) {
            return false;
        }
        self.entries.insert(printer, dynasty);
        true
    }

    /// Dynasty for a printer, `Unset` if the printer is unknown.
    pub fn get(&self, printer: &str) -> Attr {
        self.entries.get(printer).cloned().unwrap_or_default()
    }

    /// Whether the printer appears in the lookup.
    pub fn contains(&self, printer: &str) -> bool {
        self.entries.contains_key(printer)
    }

    /// All mapped printers with their dynasty.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attr)> {
        self.entries.iter().map(|(p, d)| (p.as_str(), d))
    }

    /// Distinct set dynasty names.
    pub fn dynasties(&self) -> BTreeSet<&str> {
        self.entries.values().filter_map(Attr::as_str).collect()
    }

    /// Number of mapped printers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the lookup is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Into<String>> FromIterator<(P, Attr)> for DynastyLookup {
    fn from_iter<T: IntoIterator<Item = (P, Attr)>>(iter: T) -> Self {
        let mut lookup = Self::new();
        for (printer, dynasty) in iter {
            lookup.insert(printer, dynasty);
        }
        lookup
    }
}

/// Trait for record store backends.
///
/// Implementations return rows with `dynasty` unset; the join happens in
/// [`join_dynasties`].
pub trait RecordSource {
    /// Load every publication row.
    fn publications(&self) -> Result<Vec<PublicationRecord>, DataLoadError>;

    /// Load the printer → dynasty lookup.
    fn dynasty_lookup(&self) -> Result<DynastyLookup, DataLoadError>;
}

/// Left-join publication rows against the dynasty lookup by printer name.
///
/// Rows whose printer is missing from the lookup keep an unset dynasty.
pub fn join_dynasties(records: Vec<PublicationRecord>, lookup: &DynastyLookup) -> Relation {
    let mut unmatched: BTreeSet<String> = BTreeSet::new();

    let rows: Vec<PublicationRecord> = records
        .into_iter()
        .map(|mut record| {
            if !lookup.contains(&record.printer) {
                unmatched.insert(record.printer.clone());
            }
            record.dynasty = lookup.get(&record.printer);
            record
        })
        .collect();

    if !unmatched.is_empty() {
        tracing::debug!(
            unmatched_printers = unmatched.len(),
            "Printers without a dynasty mapping"
        );
    }

    Relation::new(rows)
}

/// Load and join the two backing tables.
pub fn load(
    publication_path: impl AsRef<Path>,
    dynasty_lookup_path: impl AsRef<Path>,
) -> Result<Relation, DataLoadError> {
    let source = CsvSource::new(publication_path.as_ref(), dynasty_lookup_path.as_ref());
    let records = source.publications()?;
    if records.is_empty() {
        return Err(DataLoadError::EmptyDataset);
    }
    let lookup = source.dynasty_lookup()?;
    Ok(join_dynasties(records, &lookup))
}

pub use flat_file::CsvSource;
pub use memory::InMemorySource;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_join_keeps_unmatched_printers() {
        let lookup: DynastyLookup = vec![("P1", Attr::new("Černochové"))].into_iter().collect();
        let records = vec![
            PublicationRecord::new("b1", "P1", 1650),
            PublicationRecord::new("b2", "P2", 1660),
        ];

        let relation = join_dynasties(records, &lookup);

        assert_eq!(relation.len(), 2);
        assert_eq!(relation.rows()[0].dynasty.as_str(), Some("Černochové"));
        assert_eq!(relation.rows()[1].dynasty, Attr::Unset);
    }

    #[test]
    fn test_lookup_first_mapping_wins() {
        let mut lookup = DynastyLookup::new();
        assert!(lookup.insert("P1", Attr::new("D1")));
        assert!(!lookup.insert("P1", Attr::new("D2")));
        assert_eq!(lookup.get("P1").as_str(), Some("D1"));
    }

    #[test]
    fn test_lookup_dynasties_skip_unset() {
        let lookup: DynastyLookup = vec![
            ("P1", Attr::new("D1")),
            ("P2", Attr::Unset),
            ("P3", Attr::new("D1")),
        ]
        .into_iter()
        .collect();

        assert_eq!(lookup.dynasties().into_iter().collect::<Vec<_>>(), vec!["D1"]);
    }
}
