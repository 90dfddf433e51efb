//! Printer dimension.

use serde::{Deserialize, Serialize};

use super::record::Attr;

/// A printing house as seen by the map and network views.
///
/// Geocoordinates and descriptive metadata belong to the mapping layer and
/// are not carried here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Printer {
    /// Printer name.
    pub name: String,
    /// Printer family, when the lookup maps one.
    pub dynasty: Attr,
    /// First year with a publication, or 0 when none are dated.
    pub active_from: i32,
    /// Last year with a publication, or 0 when none are dated.
    pub active_to: i32,
}

impl Printer {
    /// Create a printer with no dated publications.
    pub fn new(name: impl Into<String>, dynasty: Attr) -> Self {
        Self {
            name: name.into(),
            dynasty,
            active_from: 0,
            active_to: 0,
        }
    }

    /// Whether any publications are dated for this printer.
    pub fn has_activity(&self) -> bool {
        self.active_from != 0 || self.active_to != 0
    }
}
