//! Filter selection values.
//!
//! A [`FilterSpec`] is an immutable description of the current selection:
//! an inclusive year range plus six categorical value sets. An empty set
//! places no restriction on its dimension.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::canonical::canonical_hash_hex;
use super::record::Dimension;

/// Reasons a filter selection cannot be evaluated.
///
/// The filter engine never raises these to the caller of `apply`; it
/// fails closed with an empty relation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidFilterError {
    /// The lower year bound is greater than the upper bound.
    #[error("Inverted year range: {from} > {to}")]
    InvertedYearRange {
        /// Lower bound.
        from: i32,
        /// Upper bound.
        to: i32,
    },
    /// A selection names a column that is not in the schema.
    #[error("Unknown dimension: {0}")]
    UnknownDimension(String),
    /// A selection targets a dimension that is restricted by range, not by set.
    #[error("Dimension cannot be filtered by value set: {0}")]
    NotFilterable(Dimension),
}

impl InvalidFilterError {
    /// Machine-readable code for adapters.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvertedYearRange { .. } => "INVERTED_YEAR_RANGE",
            Self::UnknownDimension(_) => "UNKNOWN_DIMENSION",
            Self::NotFilterable(_) => "NOT_FILTERABLE",
        }
    }
}

/// Inclusive publication year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    /// First year included.
    pub from: i32,
    /// Last year included.
    pub to: i32,
}

impl YearRange {
    /// Create a range.
    pub fn new(from: i32, to: i32) -> Self {
        Self { from, to }
    }

    /// Whether `year` falls inside the range.
    pub fn contains(&self, year: i32) -> bool {
        self.from <= year && year <= self.to
    }

    /// Whether the closed interval `[start, end]` intersects the range.
    pub fn overlaps(&self, start: i32, end: i32) -> bool {
        !(end < self.from || start > self.to)
    }

    /// Whether the bounds are ordered.
    pub fn is_valid(&self) -> bool {
        self.from <= self.to
    }
}

/// The multi-dimensional filter selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Inclusive year range.
    pub years: YearRange,
    /// Selected printers. OR-combined with `dynasties`.
    #[serde(default)]
    pub printers: BTreeSet<String>,
    /// Selected printer families. OR-combined with `printers`.
    #[serde(default)]
    pub dynasties: BTreeSet<String>,
    /// Selected authors.
    #[serde(default)]
    pub authors: BTreeSet<String>,
    /// Selected languages.
    #[serde(default)]
    pub languages: BTreeSet<String>,
    /// Selected genres.
    #[serde(default)]
    pub genres: BTreeSet<String>,
    /// Selected topics.
    #[serde(default)]
    pub topics: BTreeSet<String>,
}

impl FilterSpec {
    /// A spec restricting only the year range.
    pub fn new(from: i32, to: i32) -> Self {
        Self {
            years: YearRange::new(from, to),
            printers: BTreeSet::new(),
            dynasties: BTreeSet::new(),
            authors: BTreeSet::new(),
            languages: BTreeSet::new(),
            genres: BTreeSet::new(),
            topics: BTreeSet::new(),
        }
    }

    /// A spec covering the whole dataset, given its year bounds.
    pub fn unrestricted(bounds: (i32, i32)) -> Self {
        Self::new(bounds.0, bounds.1)
    }

    /// Restrict to printers.
    pub fn with_printers<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.printers.extend(values.into_iter().map(Into::into));
        self
    }

    /// Restrict to printer families.
    pub fn with_dynasties<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dynasties.extend(values.into_iter().map(Into::into));
        self
    }

    /// Restrict to authors.
    pub fn with_authors<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors.extend(values.into_iter().map(Into::into));
        self
    }

    /// Restrict to languages.
    pub fn with_languages<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages.extend(values.into_iter().map(Into::into));
        self
    }

    /// Restrict to genres.
    pub fn with_genres<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres.extend(values.into_iter().map(Into::into));
        self
    }

    /// Restrict to topics.
    pub fn with_topics<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics.extend(values.into_iter().map(Into::into));
        self
    }

    /// Add a value set for a dimension given by value.
    pub fn with_selection<I, S>(self, dimension: Dimension, values: I) -> Result<Self, InvalidFilterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(match dimension {
            Dimension::Year => return Err(InvalidFilterError::NotFilterable(dimension)),
            Dimension::Printer => self.with_printers(values),
            Dimension::Dynasty => self.with_dynasties(values),
            Dimension::Author => self.with_authors(values),
            Dimension::Language => self.with_languages(values),
            Dimension::Genre => self.with_genres(values),
            Dimension::Topic => self.with_topics(values),
        })
    }

    /// The value set for a categorical dimension. `None` for `Year`.
    pub fn selection(&self, dimension: Dimension) -> Option<&BTreeSet<String>> {
        match dimension {
            Dimension::Year => None,
            Dimension::Printer => Some(&self.printers),
            Dimension::Dynasty => Some(&self.dynasties),
            Dimension::Author => Some(&self.authors),
            Dimension::Language => Some(&self.languages),
            Dimension::Genre => Some(&self.genres),
            Dimension::Topic => Some(&self.topics),
        }
    }

    /// Check that the spec can be evaluated.
    pub fn validate(&self) -> Result<(), InvalidFilterError> {
        if !self.years.is_valid() {
            return Err(InvalidFilterError::InvertedYearRange {
                from: self.years.from,
                to: self.years.to,
            });
        }
        Ok(())
    }

    /// Stable fingerprint of the selection, used as a memo key.
    pub fn fingerprint(&self) -> String {
        canonical_hash_hex(self)
    }
}

/// Loosely-typed filter selection as collected from user controls.
///
/// Selections are keyed by dimension name so that adapters can forward
/// control ids directly; unknown names are rejected on conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterRequest {
    /// Inclusive `[from, to]`. Defaults to the dataset bounds.
    #[serde(default)]
    pub year_range: Option<(i32, i32)>,
    /// Value sets keyed by dimension name.
    #[serde(default)]
    pub selections: BTreeMap<String, Vec<String>>,
}

impl FilterRequest {
    /// Resolve into a typed spec, filling a missing year range from `bounds`.
    pub fn into_spec(self, bounds: (i32, i32)) -> Result<FilterSpec, InvalidFilterError> {
        let (from, to) = self.year_range.unwrap_or(bounds);
        let mut spec = FilterSpec::new(from, to);

        for (name, values) in self.selections {
            let dimension = Dimension::parse_name(&name)
                .ok_or_else(|| InvalidFilterError::UnknownDimension(name.clone()))?;
            spec = spec.with_selection(dimension, values)?;
        }

        spec.validate()?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_range_inclusive() {
        let range = YearRange::new(1620, 1650);
        assert!(range.contains(1620));
        assert!(range.contains(1650));
        assert!(!range.contains(1651));
    }

    #[test]
    fn test_year_range_overlap() {
        let range = YearRange::new(1620, 1650);
        assert!(range.overlaps(1600, 1620));
        assert!(range.overlaps(1650, 1700));
        assert!(!range.overlaps(1600, 1619));
        assert!(!range.overlaps(1651, 1700));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let spec = FilterSpec::new(1700, 1600);
        assert_eq!(
            spec.validate(),
            Err(InvalidFilterError::InvertedYearRange { from: 1700, to: 1600 })
        );
    }

    #[test]
    fn test_year_is_not_set_filterable() {
        let result = FilterSpec::new(1600, 1700).with_selection(Dimension::Year, ["1650"]);
        assert_eq!(result, Err(InvalidFilterError::NotFilterable(Dimension::Year)));
    }

    #[test]
    fn test_request_into_spec() {
        let mut selections = BTreeMap::new();
        selections.insert("Printer".to_string(), vec!["P1".to_string()]);
        selections.insert("genre".to_string(), vec!["g1".to_string(), "g2".to_string()]);
        let request = FilterRequest {
            year_range: None,
            selections,
        };

        let spec = request.into_spec((1600, 1700)).unwrap();
        assert_eq!(spec.years, YearRange::new(1600, 1700));
        assert!(spec.printers.contains("P1"));
        assert_eq!(spec.genres.len(), 2);
    }

    #[test]
    fn test_request_unknown_dimension() {
        let mut selections = BTreeMap::new();
        selections.insert("format".to_string(), vec!["folio".to_string()]);
        let request = FilterRequest {
            year_range: Some((1600, 1700)),
            selections,
        };

        assert_eq!(
            request.into_spec((1600, 1700)),
            Err(InvalidFilterError::UnknownDimension("format".to_string()))
        );
    }

    #[test]
    fn test_fingerprint_ignores_insertion_order() {
        let a = FilterSpec::new(1600, 1700).with_authors(["A2", "A1"]);
        let b = FilterSpec::new(1600, 1700).with_authors(["A1", "A2"]);
        assert_eq!(a.fingerprint(), b.fingerprint());

        let c = FilterSpec::new(1600, 1701).with_authors(["A1", "A2"]);
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
