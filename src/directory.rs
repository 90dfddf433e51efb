//! Printer directory.
//!
//! The derived printer dimension: one [`Printer`] per printer known to the
//! dynasty lookup or the publication table, with its active-year range
//! reduced from the publication rows in a single pass.

use std::collections::BTreeMap;

use crate::store::DynastyLookup;
use crate::types::{FilterSpec, Printer, Relation};

/// All printers, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrinterDirectory {
    printers: BTreeMap<String, Printer>,
}

impl PrinterDirectory {
    /// Derive the directory.
    ///
    /// Printers without dated publications keep an active range of `0..0`.
    pub fn from_relation(relation: &Relation, lookup: &DynastyLookup) -> Self {
        let mut ranges: BTreeMap<&str, (i32, i32)> = BTreeMap::new();
        for record in relation {
            let year = record.publish_year;
            ranges
                .entry(record.printer.as_str())
                .and_modify(|(lo, hi)| {
                    *lo = (*lo).min(year);
                    *hi = (*hi).max(year);
                })
                .or_insert((year, year));
        }

        let mut printers: BTreeMap<String, Printer> = lookup
            .iter()
            .map(|(name, dynasty)| (name.to_string(), Printer::new(name, dynasty.clone())))
            .collect();

        for (name, (from, to)) in ranges {
            let printer = printers
                .entry(name.to_string())
                .or_insert_with(|| Printer::new(name, lookup.get(name)));
            printer.active_from = from;
            printer.active_to = to;
        }

        Self { printers }
    }

    /// Look up a printer.
    pub fn get(&self, name: &str) -> Option<&Printer> {
        self.printers.get(name)
    }

    /// Printers sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &Printer> {
        self.printers.values()
    }

    /// Number of printers.
    pub fn len(&self) -> usize {
        self.printers.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.printers.is_empty()
    }

    /// Printers shown on the map for a selection, sorted by name.
    ///
    /// A printer is visible when its active range overlaps the year range
    /// and it passes the printer/dynasty selection, where a non-empty
    /// printer set and a non-empty dynasty set combine with OR. The
    /// attribute selections do not apply here. An inverted range shows
    /// nothing.
    pub fn visible(&self, spec: &FilterSpec) -> Vec<Printer> {
        if spec.validate().is_err() {
            return Vec::new();
        }

        self.iter()
            .filter(|p| spec.years.overlaps(p.active_from, p.active_to))
            .filter(|p| {
                let by_printer = spec.printers.contains(&p.name);
                let by_dynasty = p.dynasty.is_in(&spec.dynasties);
                match (spec.printers.is_empty(), spec.dynasties.is_empty()) {
                    (true, true) => true,
                    (false, true) => by_printer,
                    (true, false) => by_dynasty,
                    (false, false) => by_printer || by_dynasty,
                }
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Attr, PublicationRecord};

    fn directory() -> PrinterDirectory {
        let lookup: DynastyLookup = vec![
            ("P1", Attr::new("D1")),
            ("P2", Attr::new("D1")),
            ("P9", Attr::new("D9")),
        ]
        .into_iter()
        .collect();
        let relation: Relation = vec![
            PublicationRecord::new("b1", "P1", 1620),
            PublicationRecord::new("b2", "P1", 1640),
            PublicationRecord::new("b3", "P2", 1660),
            PublicationRecord::new("b4", "P3", 1690),
        ]
        .into_iter()
        .collect();
        PrinterDirectory::from_relation(&relation, &lookup)
    }

    #[test]
    fn test_active_ranges() {
        let dir = directory();
        assert_eq!(dir.len(), 4);

        let p1 = dir.get("P1").unwrap();
        assert_eq!((p1.active_from, p1.active_to), (1620, 1640));

        let p9 = dir.get("P9").unwrap();
        assert!(!p9.has_activity());
        assert_eq!(p9.dynasty.as_str(), Some("D9"));

        assert_eq!(dir.get("P3").unwrap().dynasty, Attr::Unset);
    }

    #[test]
    fn test_visible_by_overlap() {
        let names: Vec<String> = directory()
            .visible(&FilterSpec::new(1640, 1665))
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["P1", "P2"]);
    }

    #[test]
    fn test_visible_printer_or_dynasty() {
        let spec = FilterSpec::new(1600, 1700)
            .with_printers(["P3"])
            .with_dynasties(["D1"]);
        let names: Vec<String> = directory().visible(&spec).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["P1", "P2", "P3"]);
    }

    #[test]
    fn test_visible_inverted_range() {
        assert!(directory().visible(&FilterSpec::new(1700, 1600)).is_empty());
    }
}
