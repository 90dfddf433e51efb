//! Aggregation queries and the named presets used by the chart views.

use serde::{Deserialize, Serialize};

use crate::types::Dimension;
use super::AggregateError;

/// A group-by request.
///
/// `weight`, when set, switches to fractional counting and must name the
/// last grouping dimension. `interval` bins `Year` keys into left-closed
/// buckets of that width and has no effect on other dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregateQuery {
    /// One or two grouping dimensions, outer first.
    pub group_by: Vec<Dimension>,
    /// Dimension whose multiple values per work are fractionally weighted.
    #[serde(default)]
    pub weight: Option<Dimension>,
    /// Year bin width.
    #[serde(default)]
    pub interval: Option<i32>,
}

impl AggregateQuery {
    /// Distinct-work count per value of `dimension`.
    pub fn exact(dimension: Dimension) -> Self {
        Self {
            group_by: vec![dimension],
            weight: None,
            interval: None,
        }
    }

    /// Fractional count per value of `dimension`.
    pub fn proportional(dimension: Dimension) -> Self {
        Self {
            group_by: vec![dimension],
            weight: Some(dimension),
            interval: None,
        }
    }

    /// Works per year.
    pub fn per_year() -> Self {
        Self::exact(Dimension::Year)
    }

    /// Works per `k`-year interval.
    pub fn per_interval(k: i32) -> Self {
        Self::exact(Dimension::Year).with_interval(k)
    }

    /// Fractional share of `dimension` values within each `k`-year interval.
    pub fn share_per_interval(dimension: Dimension, k: i32) -> Self {
        Self {
            group_by: vec![Dimension::Year, dimension],
            weight: Some(dimension),
            interval: Some(k),
        }
    }

    /// Fractional cross-tabulation of `outer` × `inner`, weighted per
    /// (`outer` value, work).
    pub fn cross(outer: Dimension, inner: Dimension) -> Self {
        Self {
            group_by: vec![outer, inner],
            weight: Some(inner),
            interval: None,
        }
    }

    /// Set the year bin width.
    pub fn with_interval(mut self, k: i32) -> Self {
        self.interval = Some(k);
        self
    }

    /// Check the query shape.
    pub fn validate(&self) -> Result<(), AggregateError> {
        match self.group_by.len() {
            1 | 2 => {}
            n => return Err(AggregateError::UnsupportedDimensions(n)),
        }
        if let Some(k) = self.interval {
            if k <= 0 {
                return Err(AggregateError::InvalidInterval(k));
            }
        }
        if let Some(weight) = self.weight {
            if self.group_by.last() != Some(&weight) {
                return Err(AggregateError::WeightDimensionNotGrouped(weight));
            }
        }
        Ok(())
    }

    /// Whether results sort by count rather than by key.
    ///
    /// Only a single categorical dimension sorts by count.
    pub fn sorts_by_count(&self) -> bool {
        matches!(self.group_by.as_slice(), [dim] if *dim != Dimension::Year)
    }
}

/// The chart set of the statistics view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Works per year.
    WorksPerYear,
    /// Works per interval.
    WorksPerInterval,
    /// Language share per interval.
    LanguagesPerInterval,
    /// Genre share per interval.
    GenresPerInterval,
    /// Topic share per interval.
    TopicsPerInterval,
    /// Works per dynasty.
    WorksPerDynasty,
    /// Works per printer.
    WorksPerPrinter,
    /// Works per language.
    WorksPerLanguage,
    /// Works per genre.
    WorksPerGenre,
    /// Works per topic.
    WorksPerTopic,
    /// Dynasty × language.
    DynastyLanguages,
    /// Dynasty × genre.
    DynastyGenres,
    /// Dynasty × topic.
    DynastyTopics,
}

impl Preset {
    /// All presets.
    pub const ALL: [Preset; 13] = [
        Self::WorksPerYear,
        Self::WorksPerInterval,
        Self::LanguagesPerInterval,
        Self::GenresPerInterval,
        Self::TopicsPerInterval,
        Self::WorksPerDynasty,
        Self::WorksPerPrinter,
        Self::WorksPerLanguage,
        Self::WorksPerGenre,
        Self::WorksPerTopic,
        Self::DynastyLanguages,
        Self::DynastyGenres,
        Self::DynastyTopics,
    ];

    /// Build the query. `interval` is used only by interval presets.
    pub fn query(&self, interval: i32) -> AggregateQuery {
        match self {
            Self::WorksPerYear => AggregateQuery::per_year(),
            Self::WorksPerInterval => AggregateQuery::per_interval(interval),
            Self::LanguagesPerInterval => {
                AggregateQuery::share_per_interval(Dimension::Language, interval)
            }
            Self::GenresPerInterval => AggregateQuery::share_per_interval(Dimension::Genre, interval),
            Self::TopicsPerInterval => AggregateQuery::share_per_interval(Dimension::Topic, interval),
            Self::WorksPerDynasty => AggregateQuery::exact(Dimension::Dynasty),
            Self::WorksPerPrinter => AggregateQuery::exact(Dimension::Printer),
            Self::WorksPerLanguage => AggregateQuery::exact(Dimension::Language),
            Self::WorksPerGenre => AggregateQuery::exact(Dimension::Genre),
            Self::WorksPerTopic => AggregateQuery::exact(Dimension::Topic),
            Self::DynastyLanguages => AggregateQuery::cross(Dimension::Dynasty, Dimension::Language),
            Self::DynastyGenres => AggregateQuery::cross(Dimension::Dynasty, Dimension::Genre),
            Self::DynastyTopics => AggregateQuery::cross(Dimension::Dynasty, Dimension::Topic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for preset in Preset::ALL {
            assert!(preset.query(5).validate().is_ok(), "{:?}", preset);
        }
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        let none = AggregateQuery {
            group_by: vec![],
            weight: None,
            interval: None,
        };
        assert_eq!(none.validate(), Err(AggregateError::UnsupportedDimensions(0)));

        assert_eq!(
            AggregateQuery::per_interval(0).validate(),
            Err(AggregateError::InvalidInterval(0))
        );

        let mut outer_weight = AggregateQuery::cross(Dimension::Dynasty, Dimension::Genre);
        outer_weight.weight = Some(Dimension::Dynasty);
        assert_eq!(
            outer_weight.validate(),
            Err(AggregateError::WeightDimensionNotGrouped(Dimension::Dynasty))
        );
    }

    #[test]
    fn test_sort_mode() {
        assert!(AggregateQuery::exact(Dimension::Genre).sorts_by_count());
        assert!(!AggregateQuery::per_year().sorts_by_count());
        assert!(!AggregateQuery::cross(Dimension::Dynasty, Dimension::Genre).sorts_by_count());
    }
}
