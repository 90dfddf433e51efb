//! Node centrality over an unweighted, undirected graph.
//!
//! All functions return one value per node, in node index order, and
//! treat a graph of one node as having zero centrality everywhere.

use std::collections::VecDeque;

use super::bipartite::BipartiteGraph;

/// Degree over `n - 1`.
pub fn degree_centrality(graph: &BipartiteGraph) -> Vec<f64> {
    let n = graph.node_count();
    if n <= 1 {
        return vec![0.0; n];
    }
    let scale = 1.0 / (n - 1) as f64;
    (0..n).map(|i| graph.degree(i) as f64 * scale).collect()
}

/// Closeness centrality with the Wasserman–Faust correction.
///
/// For a node reaching `r - 1` other nodes at total distance `d`,
/// closeness is `(r - 1) / d` scaled by `(r - 1) / (n - 1)`, so nodes in
/// small components score lower. Isolated nodes score 0.
pub fn closeness_centrality(graph: &BipartiteGraph) -> Vec<f64> {
    let n = graph.node_count();
    let mut closeness = vec![0.0; n];
    if n <= 1 {
        return closeness;
    }

    for (source, score) in closeness.iter_mut().enumerate() {
        let dist = bfs_distances(graph, source);
        let (reached, total) = dist
            .iter()
            .flatten()
            .fold((0usize, 0usize), |(r, t), &d| (r + 1, t + d));

        if total > 0 {
            let others = (reached - 1) as f64;
            *score = (others / total as f64) * (others / (n - 1) as f64);
        }
    }
    closeness
}

/// Shortest-path betweenness (Brandes), normalized by `(n - 1)(n - 2)`.
///
/// Every source is visited, so each unordered pair contributes twice to
/// the raw score, and the normalization matches the undirected
/// `2 / ((n - 1)(n - 2))` convention. Graphs with two or fewer nodes are
/// left unscaled.
pub fn betweenness_centrality(graph: &BipartiteGraph) -> Vec<f64> {
    let n = graph.node_count();
    let mut cb = vec![0.0; n];

    for s in 0..n {
        // Nodes in order of non-decreasing distance from s.
        let mut stack: Vec<usize> = Vec::with_capacity(n);
        let mut pred: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma: Vec<f64> = vec![0.0; n];
        let mut dist: Vec<Option<usize>> = vec![None; n];

        sigma[s] = 1.0;
        dist[s] = Some(0);

        let mut queue: VecDeque<usize> = VecDeque::new();
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let dv = dist[v].unwrap_or(0);
            for &w in graph.neighbors(v) {
                if dist[w].is_none() {
                    dist[w] = Some(dv + 1);
                    queue.push_back(w);
                }
                if dist[w] == Some(dv + 1) {
                    sigma[w] += sigma[v];
                    pred[w].push(v);
                }
            }
        }

        let mut delta: Vec<f64> = vec![0.0; n];
        while let Some(w) = stack.pop() {
            for &v in &pred[w] {
                delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
            }
            if w != s {
                cb[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        for value in &mut cb {
            *value *= scale;
        }
    }
    cb
}

fn bfs_distances(graph: &BipartiteGraph, source: usize) -> Vec<Option<usize>> {
    let mut dist = vec![None; graph.node_count()];
    dist[source] = Some(0);

    let mut queue = VecDeque::from([source]);
    while let Some(v) = queue.pop_front() {
        let next = dist[v].map_or(0, |d| d + 1);
        for &w in graph.neighbors(v) {
            if dist[w].is_none() {
                dist[w] = Some(next);
                queue.push_back(w);
            }
        }
    }
    dist
}
