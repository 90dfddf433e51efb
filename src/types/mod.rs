//! Core types for the imprint kernel.

pub mod record;
pub mod relation;
pub mod filter;
pub mod printer;

pub use record::{Attr, PublicationRecord, Dimension, GroupKey, bin_year};
pub use relation::Relation;
pub use filter::{FilterSpec, FilterRequest, YearRange, InvalidFilterError};
pub use printer::Printer;
