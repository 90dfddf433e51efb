//! Bipartite printer–author graph.

use std::collections::{BTreeSet, HashMap};

use crate::types::Relation;
use super::NodeId;

/// Undirected, unweighted bipartite graph over sorted node ids.
///
/// Edges only join a printer to an author; there are no self-loops and
/// no parallel edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BipartiteGraph {
    nodes: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    adjacency: Vec<BTreeSet<usize>>,
}

impl BipartiteGraph {
    /// Build from a relation.
    ///
    /// Every printer becomes a node. Every set author becomes a node, and
    /// each row with a set author contributes a printer–author edge.
    pub fn from_relation(relation: &Relation) -> Self {
        let mut ids: BTreeSet<NodeId> = BTreeSet::new();
        let mut pairs: BTreeSet<(NodeId, NodeId)> = BTreeSet::new();

        for record in relation {
            let printer = NodeId::printer(record.printer.as_str());
            if let Some(author) = record.author.as_str() {
                let author = NodeId::author(author);
                ids.insert(author.clone());
                pairs.insert((printer.clone(), author));
            }
            ids.insert(printer);
        }

        let mut graph = Self::with_nodes(ids);
        for (printer, author) in &pairs {
            let (p, a) = (graph.index[printer], graph.index[author]);
            graph.add_edge(p, a);
        }
        graph
    }

    fn with_nodes(ids: BTreeSet<NodeId>) -> Self {
        let nodes: Vec<NodeId> = ids.into_iter().collect();
        let index = nodes.iter().cloned().enumerate().map(|(i, id)| (id, i)).collect();
        let adjacency = vec![BTreeSet::new(); nodes.len()];
        Self { nodes, index, adjacency }
    }

    fn add_edge(&mut self, a: usize, b: usize) {
        if a != b {
            self.adjacency[a].insert(b);
            self.adjacency[b].insert(a);
        }
    }

    /// Nodes in index order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Index of a node.
    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Whether the node is present.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// Neighbour indices of node `i`.
    pub fn neighbors(&self, i: usize) -> &BTreeSet<usize> {
        &self.adjacency[i]
    }

    /// Degree of node `i`.
    pub fn degree(&self, i: usize) -> usize {
        self.adjacency[i].len()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Edges as `(printer index, author index)`, sorted.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges = Vec::with_capacity(self.edge_count());
        for (i, neighbors) in self.adjacency.iter().enumerate() {
            if self.nodes[i].is_printer() {
                edges.extend(neighbors.iter().map(|&j| (i, j)));
            }
        }
        edges
    }

    /// Subgraph induced by a node set.
    pub fn induced(&self, keep: &BTreeSet<NodeId>) -> Self {
        let kept: BTreeSet<NodeId> = keep.iter().filter(|id| self.contains(id)).cloned().collect();
        let mut graph = Self::with_nodes(kept);

        let ids = graph.nodes.clone();
        for (i, id) in ids.iter().enumerate() {
            let old = self.index[id];
            for &n in &self.adjacency[old] {
                if let Some(j) = graph.index_of(&self.nodes[n]) {
                    graph.add_edge(i, j);
                }
            }
        }
        graph
    }

    /// Restrict to a printer selection and its neighbouring authors.
    ///
    /// An empty selection keeps the whole graph. Otherwise selected names
    /// absent from the graph are dropped silently, and selected printers
    /// with no neighbours are excluded.
    pub fn around_printers(&self, selected: &BTreeSet<String>) -> Self {
        if selected.is_empty() {
            return self.clone();
        }

        let mut keep: BTreeSet<NodeId> = BTreeSet::new();
        for name in selected {
            let Some(i) = self.index_of(&NodeId::printer(name.as_str())) else {
                continue;
            };
            if self.adjacency[i].is_empty() {
                continue;
            }
            keep.insert(self.nodes[i].clone());
            keep.extend(self.adjacency[i].iter().map(|&j| self.nodes[j].clone()));
        }
        self.induced(&keep)
    }
}
