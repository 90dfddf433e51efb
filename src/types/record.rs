//! Publication records and the categorical dimensions they carry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Raw cell values that the source tables use for "no value".
const UNSET_MARKERS: [&str; 4] = ["", "nan", "NaN", "None"];

/// A categorical attribute value.
///
/// Missing source values become `Unset` rather than an `Option`, so a
/// record always has a total value in every column and grouping stays
/// stable. `Unset` never matches a filter selection and never forms a
/// group of its own.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Attr {
    /// No value in the source data.
    Unset,
    /// A concrete value.
    Value(String),
}

impl Attr {
    /// Build an attribute from a raw cell, mapping unset markers to `Unset`.
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        if UNSET_MARKERS.contains(&trimmed) {
            Self::Unset
        } else {
            Self::Value(trimmed.to_string())
        }
    }

    /// The value, if set.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Unset => None,
            Self::Value(v) => Some(v.as_str()),
        }
    }

    /// Whether a concrete value is present.
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Membership test against a selection set.
    pub fn is_in(&self, selection: &BTreeSet<String>) -> bool {
        self.as_str().map_or(false, |v| selection.contains(v))
    }
}

impl Default for Attr {
    fn default() -> Self {
        Self::Unset
    }
}

impl From<Option<String>> for Attr {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(v) => Self::new(&v),
            None => Self::Unset,
        }
    }
}

impl From<Attr> for Option<String> {
    fn from(attr: Attr) -> Self {
        match attr {
            Attr::Unset => None,
            Attr::Value(v) => Some(v),
        }
    }
}

impl From<&str> for Attr {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, "(unset)"),
            Self::Value(v) => write!(f, "{}", v),
        }
    }
}

/// One row of the denormalized publication fact table.
///
/// A work (`id`) spans several rows when it has several authors, genres,
/// topics or languages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicationRecord {
    /// Bibliographic work identifier. Not unique per row.
    pub id: String,
    /// Printing house.
    pub printer: String,
    /// Year of publication.
    pub publish_year: i32,
    /// Author of the work.
    pub author: Attr,
    /// Genre of the work.
    pub genre: Attr,
    /// Topic of the work.
    pub topic: Attr,
    /// Language of the work.
    pub language: Attr,
    /// Printer family, resolved through the dynasty lookup.
    pub dynasty: Attr,
}

impl PublicationRecord {
    /// Create a record with all optional attributes unset.
    pub fn new(id: impl Into<String>, printer: impl Into<String>, publish_year: i32) -> Self {
        Self {
            id: id.into(),
            printer: printer.into(),
            publish_year,
            author: Attr::Unset,
            genre: Attr::Unset,
            topic: Attr::Unset,
            language: Attr::Unset,
            dynasty: Attr::Unset,
        }
    }

    /// Set the author.
    pub fn with_author(mut self, author: &str) -> Self {
        self.author = Attr::new(author);
        self
    }

    /// Set the genre.
    pub fn with_genre(mut self, genre: &str) -> Self {
        self.genre = Attr::new(genre);
        self
    }

    /// Set the topic.
    pub fn with_topic(mut self, topic: &str) -> Self {
        self.topic = Attr::new(topic);
        self
    }

    /// Set the language.
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Attr::new(language);
        self
    }

    /// Set the dynasty.
    pub fn with_dynasty(mut self, dynasty: &str) -> Self {
        self.dynasty = Attr::new(dynasty);
        self
    }

    /// Compound key used to suppress exact duplicate rows after the join.
    ///
    /// The year is not part of the key: a work has one year.
    pub fn dedup_key(&self) -> (&str, &str, &Attr, &Attr, &Attr, &Attr, &Attr) {
        (
            &self.id,
            &self.printer,
            &self.author,
            &self.language,
            &self.genre,
            &self.topic,
            &self.dynasty,
        )
    }
}

/// A column of the relation that can be grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Publication year (optionally binned).
    Year,
    /// Printing house.
    Printer,
    /// Printer family.
    Dynasty,
    /// Author.
    Author,
    /// Language.
    Language,
    /// Genre.
    Genre,
    /// Topic.
    Topic,
}

impl Dimension {
    /// Dimensions that a [`FilterSpec`](super::FilterSpec) can restrict by value set.
    pub const CATEGORICAL: [Dimension; 6] = [
        Self::Printer,
        Self::Dynasty,
        Self::Author,
        Self::Language,
        Self::Genre,
        Self::Topic,
    ];

    /// Parse a dimension from its name or its source column header.
    pub fn parse_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "year" | "publishdate" | "publish_year" => Some(Self::Year),
            "printer" => Some(Self::Printer),
            "dynasty" | "dynastie" => Some(Self::Dynasty),
            "author" => Some(Self::Author),
            "language" | "language_cs" => Some(Self::Language),
            "genre" => Some(Self::Genre),
            "topic" => Some(Self::Topic),
            _ => None,
        }
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Printer => "printer",
            Self::Dynasty => "dynasty",
            Self::Author => "author",
            Self::Language => "language",
            Self::Genre => "genre",
            Self::Topic => "topic",
        }
    }

    /// Whether a single work can carry several values of this dimension.
    ///
    /// Counts over these dimensions need fractional weighting.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Self::Author | Self::Language | Self::Genre | Self::Topic)
    }

    /// Text value of this dimension for a record. `None` for `Year` or unset.
    pub fn text<'a>(&self, record: &'a PublicationRecord) -> Option<&'a str> {
        match self {
            Self::Year => None,
            Self::Printer => Some(record.printer.as_str()),
            Self::Dynasty => record.dynasty.as_str(),
            Self::Author => record.author.as_str(),
            Self::Language => record.language.as_str(),
            Self::Genre => record.genre.as_str(),
            Self::Topic => record.topic.as_str(),
        }
    }

    /// Grouping key of this dimension for a record.
    ///
    /// Years are floor-binned into `interval`-wide buckets when an interval
    /// is given. Returns `None` when the value is unset.
    pub fn key(&self, record: &PublicationRecord, interval: Option<i32>) -> Option<GroupKey> {
        match self {
            Self::Year => Some(GroupKey::Year(match interval {
                Some(k) => bin_year(record.publish_year, k),
                None => record.publish_year,
            })),
            _ => self.text(record).map(|v| GroupKey::Text(v.to_string())),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Map a year to the left edge of its `interval`-wide bucket.
///
/// Non-positive intervals leave the year unchanged.
pub fn bin_year(year: i32, interval: i32) -> i32 {
    if interval <= 0 {
        return year;
    }
    year.div_euclid(interval) * interval
}

/// Value of one grouping dimension in an aggregate row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupKey {
    /// A (possibly binned) year.
    Year(i32),
    /// A categorical value.
    Text(String),
}

impl GroupKey {
    /// The text value, if this is a categorical key.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v.as_str()),
            Self::Year(_) => None,
        }
    }

    /// The year value, if this is a year key.
    pub fn as_year(&self) -> Option<i32> {
        match self {
            Self::Year(y) => Some(*y),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(y) => write!(f, "{}", y),
            Self::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i32> for GroupKey {
    fn from(value: i32) -> Self {
        Self::Year(value)
    }
}
