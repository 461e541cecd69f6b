//! Kamada-Kawai layout via stress majorization.
//!
//! Edge weights are edge *lengths* here: a light edge makes its endpoints graph-theoretically
//! close, the opposite sense of the force-directed layouts where weight scales attraction.
//! The energy `Σ (|p_i - p_j| - L·d_ij)² / d_ij²` is the Kamada-Kawai spring energy with
//! stiffness `1 / d_ij²`; it is minimized with localized majorization updates, which decrease
//! the stress monotonically regardless of the stiffness scale.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use nalgebra::DMatrix;

use crate::algo::force::EPSILON;
use crate::algo::{CircleOptions, KamadaKawaiOptions, circle};
use crate::graph::{Graph, Point};

/// Disconnected pairs are kept this many times the largest finite graph distance apart.
pub const DISCONNECTED_DISTANCE_FACTOR: f64 = 1.5;

// Floor for graph distances, keeps the stiffness finite for near-zero-length edges.
const MIN_PATH_DISTANCE: f64 = 1e-6;

pub fn layout(graph: &Graph, opts: &KamadaKawaiOptions) -> Vec<Point> {
    let n = graph.node_count();
    match n {
        0 => return Vec::new(),
        1 => return vec![Point::ORIGIN],
        _ => {}
    }

    let edge_length = if opts.edge_length.is_finite() && opts.edge_length > 0.0 {
        opts.edge_length
    } else {
        crate::algo::DEFAULT_SPACING
    };

    let dist = shortest_path_matrix(graph);
    let mut pos = circle::layout(
        n,
        &CircleOptions {
            radius: Some(circle::default_radius(n) * edge_length / crate::algo::DEFAULT_SPACING),
        },
    );

    let mut prev = stress(&pos, &dist, edge_length);
    let mut iterations = 0usize;
    while iterations < opts.max_iterations {
        iterations += 1;
        majorize_sweep(&mut pos, &dist, edge_length);
        let cur = stress(&pos, &dist, edge_length);
        let converged = prev <= 0.0 || (prev - cur) / prev < opts.tolerance;
        prev = cur;
        if converged {
            break;
        }
    }
    tracing::debug!(nodes = n, iterations, stress = prev, "kamada-kawai finished");

    pos
}

/// All-pairs shortest path lengths (Dijkstra from every node).
///
/// Unreachable pairs get [`DISCONNECTED_DISTANCE_FACTOR`] times the largest finite distance
/// (at least 1.0), so every entry off the diagonal is finite and positive.
pub fn shortest_path_matrix(graph: &Graph) -> DMatrix<f64> {
    let n = graph.node_count();
    let adj = graph.adjacency();
    let mut d = DMatrix::<f64>::from_element(n, n, f64::INFINITY);

    let mut heap: BinaryHeap<Visit> = BinaryHeap::new();
    let mut row: Vec<f64> = vec![f64::INFINITY; n];
    for s in 0..n {
        row.fill(f64::INFINITY);
        row[s] = 0.0;
        heap.clear();
        heap.push(Visit { dist: 0.0, node: s });
        while let Some(Visit { dist, node }) = heap.pop() {
            if dist > row[node] {
                continue;
            }
            for &(next, w) in &adj[node] {
                if next == node {
                    continue;
                }
                let cand = dist + w;
                if cand < row[next] {
                    row[next] = cand;
                    heap.push(Visit {
                        dist: cand,
                        node: next,
                    });
                }
            }
        }
        for (t, &v) in row.iter().enumerate() {
            d[(s, t)] = v;
        }
    }

    let max_finite = d
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);
    let disconnected = (max_finite * DISCONNECTED_DISTANCE_FACTOR).max(1.0);
    for i in 0..n {
        for j in 0..n {
            if i == j {
                d[(i, j)] = 0.0;
            } else if !d[(i, j)].is_finite() {
                d[(i, j)] = disconnected;
            } else {
                d[(i, j)] = d[(i, j)].max(MIN_PATH_DISTANCE);
            }
        }
    }
    d
}

/// Total weighted stress of `pos` against the target lengths `edge_length · d_ij`.
pub fn stress(pos: &[Point], dist: &DMatrix<f64>, edge_length: f64) -> f64 {
    let mut total = 0.0;
    for i in 0..pos.len() {
        for j in (i + 1)..pos.len() {
            let d = dist[(i, j)];
            let diff = pos[i].distance(pos[j]) - edge_length * d;
            total += diff * diff / (d * d);
        }
    }
    total
}

fn majorize_sweep(pos: &mut [Point], dist: &DMatrix<f64>, edge_length: f64) {
    let n = pos.len();
    for i in 0..n {
        let mut num_x = 0.0;
        let mut num_y = 0.0;
        let mut den = 0.0;
        let pi = pos[i];
        for (j, &pj) in pos.iter().enumerate() {
            if i == j {
                continue;
            }
            let d = dist[(i, j)];
            let w = 1.0 / (d * d);
            let target = edge_length * d;
            let dx = pi.x - pj.x;
            let dy = pi.y - pj.y;
            let len = dx.hypot(dy).max(EPSILON);
            num_x += w * (pj.x + target * dx / len);
            num_y += w * (pj.y + target * dy / len);
            den += w;
        }
        if den > 0.0 {
            let next = Point::new(num_x / den, num_y / den);
            if next.is_finite() {
                pos[i] = next;
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Visit {
    dist: f64,
    node: usize,
}

impl PartialEq for Visit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Visit {}

impl PartialOrd for Visit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Visit {
    // Reversed: `BinaryHeap` is a max-heap and we want the closest node first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}
