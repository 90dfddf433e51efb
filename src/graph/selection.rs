//! Printer selection for the network view.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::catalog::Catalog;
use crate::types::FilterSpec;

/// The printer set passed to [`build_subgraph`](super::build_subgraph).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSelection {
    /// Selected printer names.
    pub printers: BTreeSet<String>,
}

impl GraphSelection {
    /// Selected printers plus every printer of a selected dynasty.
    ///
    /// Dynasty membership is read from the unfiltered relation, so the year
    /// range does not shrink the selection.
    pub fn resolve(catalog: &Catalog, spec: &FilterSpec) -> Self {
        let mut printers = spec.printers.clone();
        printers.extend(catalog.printers_of_dynasties(&spec.dynasties));
        Self { printers }
    }

    /// Whether no printer is selected.
    pub fn is_empty(&self) -> bool {
        self.printers.is_empty()
    }
}
