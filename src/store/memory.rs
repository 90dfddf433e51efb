//! In-memory record source for testing and embedding.

use crate::types::{Attr, PublicationRecord};
use super::{DataLoadError, DynastyLookup, RecordSource};

/// In-memory record source.
///
/// Records are kept in insertion order; any `dynasty` already set on a
/// record is discarded by the join.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<PublicationRecord>,
    lookup: DynastyLookup,
}

impl InMemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a publication row.
    pub fn add_record(&mut self, record: PublicationRecord) {
        self.records.push(record);
    }

    /// Map a printer to a dynasty.
    pub fn add_dynasty(&mut self, printer: impl Into<String>, dynasty: &str) {
        self.lookup.insert(printer, Attr::new(dynasty));
    }

    /// Builder-style variant of [`add_record`](Self::add_record).
    pub fn with_record(mut self, record: PublicationRecord) -> Self {
        self.add_record(record);
        self
    }

    /// Builder-style variant of [`add_dynasty`](Self::add_dynasty).
    pub fn with_dynasty(mut self, printer: impl Into<String>, dynasty: &str) -> Self {
        self.add_dynasty(printer, dynasty);
        self
    }

    /// Number of rows.
    pub fn num_records(&self) -> usize {
        self.records.len()
    }
}

impl RecordSource for InMemorySource {
    fn publications(&self) -> Result<Vec<PublicationRecord>, DataLoadError> {
        Ok(self.records.clone())
    }

    fn dynasty_lookup(&self) -> Result<DynastyLookup, DataLoadError> {
        Ok(self.lookup.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_read_back() {
        let source = InMemorySource::new()
            .with_record(PublicationRecord::new("b1", "P1", 1650))
            .with_dynasty("P1", "D1");

        assert_eq!(source.num_records(), 1);
        assert_eq!(source.publications().unwrap()[0].id, "b1");
        assert_eq!(source.dynasty_lookup().unwrap().get("P1").as_str(), Some("D1"));
    }
}
