//! Session catalog.
//!
//! The immutable context built once at startup: the joined relation, the
//! dynasty lookup, the printer directory and a fingerprint of the loaded
//! data. A `Catalog` is never mutated after construction and is shared
//! across sessions behind an `Arc`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::canonical::canonical_hash_hex;
use crate::config::DataPaths;
use crate::directory::PrinterDirectory;
use crate::store::{join_dynasties, CsvSource, DataLoadError, DynastyLookup, RecordSource};
use crate::types::{Dimension, FilterSpec, PublicationRecord, Relation};

/// Fingerprint of a loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSnapshot {
    /// Canonical hash of the joined rows.
    pub snapshot_id: String,
    /// Number of rows.
    pub record_count: usize,
    /// Number of distinct works.
    pub work_count: usize,
    /// Minimum and maximum publication year.
    pub year_bounds: (i32, i32),
    /// When the data was loaded.
    pub loaded_at: DateTime<Utc>,
}

/// The read-only dataset context.
#[derive(Debug, Clone)]
pub struct Catalog {
    relation: Relation,
    lookup: DynastyLookup,
    directory: PrinterDirectory,
    snapshot: DatasetSnapshot,
}

impl Catalog {
    /// Load from the flat files at `paths`.
    pub fn load(paths: &DataPaths) -> Result<Self, DataLoadError> {
        Self::from_source(&CsvSource::new(&paths.publications, &paths.dynasties))
    }

    /// Load from any record source.
    pub fn from_source<S: RecordSource>(source: &S) -> Result<Self, DataLoadError> {
        let records = source.publications()?;
        if records.is_empty() {
            return Err(DataLoadError::EmptyDataset);
        }
        let lookup = source.dynasty_lookup()?;
        Self::from_parts(records, lookup)
    }

    /// Build from raw rows and a lookup.
    pub fn from_parts(
        records: Vec<PublicationRecord>,
        lookup: DynastyLookup,
    ) -> Result<Self, DataLoadError> {
        let relation = join_dynasties(records, &lookup);
        let year_bounds = relation.year_bounds().ok_or(DataLoadError::EmptyDataset)?;
        let directory = PrinterDirectory::from_relation(&relation, &lookup);

        let snapshot = DatasetSnapshot {
            snapshot_id: canonical_hash_hex(&relation),
            record_count: relation.len(),
            work_count: relation.distinct_works(),
            year_bounds,
            loaded_at: Utc::now(),
        };

        tracing::info!(
            snapshot_id = %snapshot.snapshot_id,
            records = snapshot.record_count,
            works = snapshot.work_count,
            printers = directory.len(),
            from = year_bounds.0,
            to = year_bounds.1,
            "Catalog ready"
        );

        Ok(Self {
            relation,
            lookup,
            directory,
            snapshot,
        })
    }

    /// The joined relation.
    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    /// The dynasty lookup.
    pub fn lookup(&self) -> &DynastyLookup {
        &self.lookup
    }

    /// The printer directory.
    pub fn directory(&self) -> &PrinterDirectory {
        &self.directory
    }

    /// Dataset fingerprint.
    pub fn snapshot(&self) -> &DatasetSnapshot {
        &self.snapshot
    }

    /// Minimum and maximum publication year.
    pub fn year_bounds(&self) -> (i32, i32) {
        self.snapshot.year_bounds
    }

    /// The default selection: the whole year range, no value sets.
    pub fn unrestricted(&self) -> FilterSpec {
        FilterSpec::unrestricted(self.year_bounds())
    }

    /// Distinct set values of a dimension, sorted, for selector controls.
    ///
    /// Dynasty options come from the lookup, so dynasties whose printers
    /// have no publications are still offered.
    pub fn options(&self, dimension: Dimension) -> Vec<String> {
        match dimension {
            Dimension::Year => self
                .relation
                .iter()
                .map(|r| r.publish_year)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(|y| y.to_string())
                .collect(),
            Dimension::Dynasty => self.lookup.dynasties().into_iter().map(str::to_string).collect(),
            _ => self
                .relation
                .iter()
                .filter_map(|r| dimension.text(r))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Printers belonging to any of `dynasties` in the unfiltered relation.
    pub fn printers_of_dynasties(&self, dynasties: &BTreeSet<String>) -> BTreeSet<String> {
        if dynasties.is_empty() {
            return BTreeSet::new();
        }
        self.relation
            .iter()
            .filter(|r| r.dynasty.is_in(dynasties))
            .map(|r| r.printer.clone())
            .collect()
    }
}
