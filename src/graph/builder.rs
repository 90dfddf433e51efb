//! Subgraph assembly.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::LayoutConfig;
use crate::types::Relation;
use super::bipartite::BipartiteGraph;
use super::centrality::{betweenness_centrality, closeness_centrality, degree_centrality};
use super::layout::spring_layout;
use super::{GraphStatus, NetworkEdge, NetworkNode, NodeId, NodeKind, NodeMetrics, PrinterNetwork};

/// Build the network view of a filtered relation around `selected` printers.
///
/// The full bipartite graph is built from `relation`, restricted with
/// [`BipartiteGraph::around_printers`], and every remaining node gets its
/// metrics, layout position and display weight. Metrics describe the
/// subgraph only.
///
/// A subgraph with no nodes or no edges yields a degenerate result with
/// empty node and edge lists; no layout is computed for it.
pub fn build_subgraph(
    relation: &Relation,
    selected: &BTreeSet<String>,
    config: &LayoutConfig,
) -> PrinterNetwork {
    let full = BipartiteGraph::from_relation(relation);
    let graph = full.around_printers(selected);

    let status = if graph.node_count() == 0 {
        GraphStatus::Empty
    } else if graph.edge_count() == 0 {
        GraphStatus::Edgeless
    } else {
        GraphStatus::Ok
    };

    if status != GraphStatus::Ok {
        tracing::debug!(
            full_nodes = full.node_count(),
            selected = selected.len(),
            status = ?status,
            "Degenerate subgraph"
        );
        return PrinterNetwork::degenerate(status);
    }

    let degree = degree_centrality(&graph);
    let closeness = closeness_centrality(&graph);
    let betweenness = betweenness_centrality(&graph);
    let positions = spring_layout(&graph, config);
    let works = works_per_node(relation);

    let nodes: Vec<NetworkNode> = graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(i, id)| NetworkNode {
            id: id.clone(),
            position: positions[i],
            metrics: NodeMetrics {
                degree: graph.degree(i),
                degree_centrality: degree[i],
                closeness: closeness[i],
                betweenness: betweenness[i],
            },
            works: works.get(id).map_or(0, BTreeSet::len),
            selected: id.kind == NodeKind::Printer && selected.contains(&id.name),
        })
        .collect();

    let edges: Vec<NetworkEdge> = graph
        .edges()
        .into_iter()
        .map(|(p, a)| NetworkEdge {
            printer: graph.nodes()[p].name.clone(),
            author: graph.nodes()[a].name.clone(),
        })
        .collect();

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        "Built printer network"
    );

    PrinterNetwork { nodes, edges, status }
}

/// Distinct works per printer and per author.
fn works_per_node(relation: &Relation) -> BTreeMap<NodeId, BTreeSet<&str>> {
    let mut works: BTreeMap<NodeId, BTreeSet<&str>> = BTreeMap::new();
    for record in relation {
        works
            .entry(NodeId::printer(record.printer.as_str()))
            .or_default()
            .insert(record.id.as_str());
        if let Some(author) = record.author.as_str() {
            works
                .entry(NodeId::author(author))
                .or_default()
                .insert(record.id.as_str());
        }
    }
    works
}
