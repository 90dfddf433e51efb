//! Filter engine.
//!
//! Applies a [`FilterSpec`] to a [`Relation`] and returns a new, independent
//! relation. Evaluation order:
//!
//! 1. Year range (inclusive).
//! 2. Printer and dynasty sets. When both are non-empty a row passes if it
//!    matches either one.
//! 3. Author, language, genre and topic sets, each narrowing further.
//! 4. Exact duplicates are removed by [`PublicationRecord::dedup_key`],
//!    keeping the first occurrence.
//!
//! An unset attribute never matches a non-empty selection.

use std::collections::HashSet;

use crate::types::{Dimension, FilterSpec, InvalidFilterError, PublicationRecord, Relation};

/// Apply a filter, failing closed.
///
/// An invalid spec yields the empty relation and a warning; it is never
/// raised to the caller.
pub fn apply(relation: &Relation, spec: &FilterSpec) -> Relation {
    match try_apply(relation, spec) {
        Ok(filtered) => filtered,
        Err(err) => {
            tracing::warn!(
                error = %err,
                code = err.code(),
                "Invalid filter, returning empty result"
            );
            Relation::empty()
        }
    }
}

/// Apply a filter, reporting an invalid spec as an error.
pub fn try_apply(relation: &Relation, spec: &FilterSpec) -> Result<Relation, InvalidFilterError> {
    spec.validate()?;

    let mut seen = HashSet::new();
    let rows: Vec<PublicationRecord> = relation
        .iter()
        .filter(|record| matches(record, spec))
        .filter(|record| seen.insert(record.dedup_key()))
        .cloned()
        .collect();

    tracing::debug!(
        input_rows = relation.len(),
        output_rows = rows.len(),
        fingerprint = %spec.fingerprint(),
        "Applied filter"
    );

    Ok(Relation::new(rows))
}

/// Row predicate for a spec, without deduplication.
pub fn matches(record: &PublicationRecord, spec: &FilterSpec) -> bool {
    spec.years.contains(record.publish_year)
        && matches_printer_or_dynasty(record, spec)
        && [Dimension::Author, Dimension::Language, Dimension::Genre, Dimension::Topic]
            .into_iter()
            .all(|dim| matches_dimension(record, spec, dim))
}

fn matches_printer_or_dynasty(record: &PublicationRecord, spec: &FilterSpec) -> bool {
    let by_printer = !spec.printers.is_empty();
    let by_dynasty = !spec.dynasties.is_empty();

    match (by_printer, by_dynasty) {
        (false, false) => true,
        (true, false) => spec.printers.contains(&record.printer),
        (false, true) => record.dynasty.is_in(&spec.dynasties),
        (true, true) => {
            spec.printers.contains(&record.printer) || record.dynasty.is_in(&spec.dynasties)
        }
    }
}

fn matches_dimension(record: &PublicationRecord, spec: &FilterSpec, dimension: Dimension) -> bool {
    match spec.selection(dimension) {
        Some(selection) if !selection.is_empty() => dimension
            .text(record)
            .map_or(false, |value| selection.contains(value)),
        _ => true,
    }
}
