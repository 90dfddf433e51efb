//! Seeded force-directed layout (Fruchterman–Reingold).
//!
//! Initial positions are drawn uniformly from the unit square with a
//! seeded RNG, so a fixed graph and seed always yield the same layout.
//! After relaxation the positions are centred and scaled so the largest
//! absolute coordinate equals `scale`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use super::bipartite::BipartiteGraph;

/// Minimum pairwise distance used in force computation.
const MIN_DISTANCE: f64 = 0.01;

/// Displacements shorter than this are treated as [`STALLED_LENGTH`].
const MIN_DISPLACEMENT: f64 = 0.01;
const STALLED_LENGTH: f64 = 0.1;

/// Mean per-node step below which relaxation stops early.
const CONVERGENCE_THRESHOLD: f64 = 1e-4;

/// A 2-D position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Compute positions for every node, in node index order.
pub fn spring_layout(graph: &BipartiteGraph, config: &LayoutConfig) -> Vec<Point> {
    let n = graph.node_count();
    match n {
        0 => return Vec::new(),
        1 => return vec![Point::default()],
        _ => {}
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut pos: Vec<[f64; 2]> = (0..n).map(|_| [rng.gen::<f64>(), rng.gen::<f64>()]).collect();

    let k = (1.0 / n as f64).sqrt();
    let mut t = 0.1 * span(&pos);
    let dt = t / (config.iterations as f64 + 1.0);

    for _ in 0..config.iterations {
        let mut step_norm_sq = 0.0;
        let mut steps = vec![[0.0f64; 2]; n];

        for (i, step) in steps.iter_mut().enumerate() {
            let mut disp = [0.0f64; 2];
            for j in 0..n {
                if i == j {
                    continue;
                }
                let delta = [pos[i][0] - pos[j][0], pos[i][1] - pos[j][1]];
                let distance = (delta[0] * delta[0] + delta[1] * delta[1])
                    .sqrt()
                    .max(MIN_DISTANCE);
                let attraction = if graph.neighbors(i).contains(&j) {
                    distance / k
                } else {
                    0.0
                };
                let force = k * k / (distance * distance) - attraction;
                disp[0] += delta[0] * force;
                disp[1] += delta[1] * force;
            }

            let mut length = (disp[0] * disp[0] + disp[1] * disp[1]).sqrt();
            if length < MIN_DISPLACEMENT {
                length = STALLED_LENGTH;
            }
            *step = [disp[0] * t / length, disp[1] * t / length];
            step_norm_sq += step[0] * step[0] + step[1] * step[1];
        }

        for (p, step) in pos.iter_mut().zip(&steps) {
            p[0] += step[0];
            p[1] += step[1];
        }
        t -= dt;

        if step_norm_sq.sqrt() / (n as f64) < CONVERGENCE_THRESHOLD {
            break;
        }
    }

    rescale(&mut pos, config.scale);
    pos.into_iter().map(|[x, y]| Point::new(x, y)).collect()
}

fn span(pos: &[[f64; 2]]) -> f64 {
    let extent = |axis: usize| {
        let (lo, hi) = pos
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p[axis]), hi.max(p[axis])));
        hi - lo
    };
    extent(0).max(extent(1))
}

fn rescale(pos: &mut [[f64; 2]], scale: f64) {
    let n = pos.len() as f64;
    for axis in 0..2 {
        let mean = pos.iter().map(|p| p[axis]).sum::<f64>() / n;
        for p in pos.iter_mut() {
            p[axis] -= mean;
        }
    }

    let lim = pos
        .iter()
        .flat_map(|p| [p[0].abs(), p[1].abs()])
        .fold(0.0f64, f64::max);
    if lim > 0.0 {
        for p in pos.iter_mut() {
            p[0] *= scale / lim;
            p[1] *= scale / lim;
        }
    }
}
