//! Relational graph builder.
//!
//! Builds the bipartite printer–author graph of a filtered relation,
//! restricts it to the neighbourhood of a printer selection, and computes
//! per-node centrality and a seeded 2-D layout over that subgraph.
//!
//! ## Node identity
//!
//! Nodes are keyed by [`NodeId`], kind first, so a printer and an author
//! that share a name stay distinct. Node order everywhere is the sorted
//! `NodeId` order: printers by name, then authors by name.

pub mod bipartite;
pub mod builder;
pub mod centrality;
pub mod layout;
pub mod selection;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use bipartite::BipartiteGraph;
pub use builder::build_subgraph;
pub use centrality::{betweenness_centrality, closeness_centrality, degree_centrality};
pub use layout::{spring_layout, Point};
pub use selection::GraphSelection;

/// Side of the bipartite graph a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A printing house.
    Printer,
    /// An author.
    Author,
}

/// Node key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId {
    /// Node side.
    pub kind: NodeKind,
    /// Printer or author name.
    pub name: String,
}

impl NodeId {
    /// A printer node.
    pub fn printer(name: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Printer,
            name: name.into(),
        }
    }

    /// An author node.
    pub fn author(name: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Author,
            name: name.into(),
        }
    }

    /// Whether this is a printer node.
    pub fn is_printer(&self) -> bool {
        self.kind == NodeKind::Printer
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NodeKind::Printer => write!(f, "printer:{}", self.name),
            NodeKind::Author => write!(f, "author:{}", self.name),
        }
    }
}

/// Structural metrics of a node within its subgraph.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeMetrics {
    /// Number of incident edges.
    pub degree: usize,
    /// Degree over `n - 1`.
    pub degree_centrality: f64,
    /// Wasserman–Faust scaled closeness. 0 for isolated nodes.
    pub closeness: f64,
    /// Normalized shortest-path betweenness.
    pub betweenness: f64,
}

/// A rendered node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    /// Node key.
    pub id: NodeId,
    /// Layout position.
    pub position: Point,
    /// Centrality metrics.
    pub metrics: NodeMetrics,
    /// Distinct works of this printer or author in the filtered relation.
    pub works: usize,
    /// Whether the node is a printer from the resolved selection.
    pub selected: bool,
}

/// A printer–author edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NetworkEdge {
    /// Printer name.
    pub printer: String,
    /// Author name.
    pub author: String,
}

/// Shape of a subgraph result.
///
/// Degenerate subgraphs are valid results, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphStatus {
    /// At least one edge.
    Ok,
    /// No nodes.
    Empty,
    /// Nodes but no edges.
    Edgeless,
}

/// The subgraph handed to the network view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterNetwork {
    /// Nodes in `NodeId` order.
    pub nodes: Vec<NetworkNode>,
    /// Edges sorted by (printer, author).
    pub edges: Vec<NetworkEdge>,
    /// Whether the subgraph is degenerate.
    pub status: GraphStatus,
}

impl PrinterNetwork {
    /// A degenerate result with no nodes or edges.
    pub fn degenerate(status: GraphStatus) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            status,
        }
    }

    /// Whether there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node.
    pub fn node(&self, id: &NodeId) -> Option<&NetworkNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }
}
