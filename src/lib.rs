//! # imprint-kernel
//!
//! Filtered relational aggregation over early-modern printing records.
//!
//! The kernel answers three questions about a selection of the data:
//!
//! > Which publication rows are in view? How many works fall in each
//! > group? How are the selected printers connected to their authors?
//!
//! ## Core Contract
//!
//! 1. Load the publication table and the printer → dynasty lookup once into
//!    an immutable [`Catalog`]
//! 2. Apply a [`FilterSpec`] to get a new, deduplicated [`Relation`]
//! 3. Aggregate the relation with exact or fractionally weighted counts
//! 4. Build the printer–author subgraph with centrality metrics and a
//!    seeded layout
//!
//! ## Architecture
//!
//! ```text
//! RecordSource → Catalog ─→ filter::apply ─→ aggregate / contingency
//!   (CSV, memory)  │                    └─→ build_subgraph → PrinterNetwork
//!                  └─→ PrinterDirectory::visible
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Aggregates are independent of row order
//! - Node order is canonical (printers, then authors, by name)
//! - Same subgraph + same layout seed → identical coordinates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod store;
pub mod config;
pub mod canonical;
pub mod catalog;
pub mod directory;
pub mod filter;
pub mod aggregate;
pub mod graph;
pub mod memo;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use types::{
    Attr, PublicationRecord, Dimension, GroupKey, bin_year, Relation,
    FilterSpec, FilterRequest, YearRange, InvalidFilterError, Printer,
};
pub use store::{
    load, join_dynasties, RecordSource, CsvSource, InMemorySource,
    DynastyLookup, DataLoadError,
};
pub use config::{EngineConfig, LayoutConfig, MemoConfig, DataPaths};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};
pub use catalog::{Catalog, DatasetSnapshot};
pub use directory::PrinterDirectory;
pub use aggregate::{
    aggregate, contingency, Aggregate, AggregateError, AggregateQuery, AggregateRow,
    ContingencyTable, CountKind, Preset,
};
pub use graph::{
    build_subgraph, BipartiteGraph, GraphSelection, GraphStatus, NetworkEdge, NetworkNode,
    NodeId, NodeKind, NodeMetrics, Point, PrinterNetwork,
};
pub use memo::{FilterMemo, MemoStats};

// Service re-exports (when service feature is enabled)
#[cfg(feature = "service")]
pub use service::{create_router, ServiceState};

/// Schema version of the serialized result types.
/// Increment on breaking changes to any of them.
pub const IMPRINT_KERNEL_SCHEMA_VERSION: &str = "1.0.0";
