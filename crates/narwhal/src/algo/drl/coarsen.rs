//! Heavy-edge matching coarsening.

use rustc_hash::FxHashMap;

use crate::graph::Edge;

/// A pass that keeps more than this fraction of the nodes is not worth another level.
const MIN_SHRINK_RATIO: f64 = 0.95;

/// One graph in the coarsening hierarchy. Level 0 is the input graph.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Level {
    pub node_count: usize,
    pub edges: Vec<Edge>,
    /// Number of input nodes folded into each node of this level.
    pub mass: Vec<f64>,
}

impl Level {
    pub(crate) fn new(node_count: usize, edges: Vec<Edge>) -> Self {
        Self {
            node_count,
            edges,
            mass: vec![1.0; node_count],
        }
    }

    /// Mass scaled to average 1.0, for use as a repulsion multiplier.
    pub(crate) fn relative_mass(&self) -> Vec<f64> {
        if self.node_count == 0 {
            return Vec::new();
        }
        let mean = self.mass.iter().sum::<f64>() / self.node_count as f64;
        if mean <= 0.0 {
            return vec![1.0; self.node_count];
        }
        self.mass.iter().map(|m| m / mean).collect()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Hierarchy {
    /// `levels[0]` is the finest level, the last entry the coarsest.
    pub levels: Vec<Level>,
    /// `maps[l][i]` is the node of `levels[l + 1]` that node `i` of `levels[l]` was merged into.
    pub maps: Vec<Vec<usize>>,
}

impl Hierarchy {
    pub(crate) fn build(base: Level, edge_cut: usize, coarsest_size: usize) -> Self {
        let mut levels = vec![base];
        let mut maps: Vec<Vec<usize>> = Vec::new();
        loop {
            let Some(fine) = levels.last() else {
                break;
            };
            if fine.node_count <= coarsest_size.max(1) {
                break;
            }
            let Some((coarse, map)) = contract(fine, edge_cut) else {
                break;
            };
            tracing::trace!(
                level = levels.len(),
                fine = fine.node_count,
                coarse = coarse.node_count,
                "coarsened"
            );
            maps.push(map);
            levels.push(coarse);
        }
        Self { levels, maps }
    }

    pub(crate) fn coarsest(&self) -> &Level {
        // `build` always seeds the base level.
        &self.levels[self.levels.len() - 1]
    }
}

/// Contracts a greedy heavy-edge matching of `fine`.
///
/// Nodes are visited in index order; each unmatched node looks at up to `edge_cut` of its
/// heaviest neighbours (ties broken by index) and merges with the first one still unmatched.
/// Nodes left alone are then paired with another lone node sharing a neighbour with them (so the
/// leaves of a star collapse pairwise), and isolated nodes are paired in index order.
/// Returns `None` when the pass would not shrink the level enough.
pub(crate) fn contract(fine: &Level, edge_cut: usize) -> Option<(Level, Vec<usize>)> {
    let n = fine.node_count;
    if n <= 1 {
        return None;
    }

    let mut neighbors: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    for e in &fine.edges {
        if e.is_self_loop() || e.source >= n || e.target >= n {
            continue;
        }
        neighbors[e.source].push((e.target, e.weight));
        neighbors[e.target].push((e.source, e.weight));
    }
    for cand in &mut neighbors {
        cand.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    }

    // `partner[u] == u` marks a node that stays alone.
    const UNMATCHED: usize = usize::MAX;
    let mut partner: Vec<usize> = vec![UNMATCHED; n];
    for u in 0..n {
        if partner[u] != UNMATCHED {
            continue;
        }
        let found = neighbors[u]
            .iter()
            .take(edge_cut.max(1))
            .map(|&(v, _)| v)
            .find(|&v| v != u && partner[v] == UNMATCHED);
        match found {
            Some(v) => {
                partner[u] = v;
                partner[v] = u;
            }
            None => partner[u] = u,
        }
    }

    for hub in 0..n {
        let mut waiting: Option<usize> = None;
        for &(v, _) in &neighbors[hub] {
            if v == hub || partner[v] != v {
                continue;
            }
            match waiting {
                Some(w) if w != v => {
                    partner[w] = v;
                    partner[v] = w;
                    waiting = None;
                }
                Some(_) => {}
                None => waiting = Some(v),
            }
        }
    }

    let mut waiting: Option<usize> = None;
    for u in 0..n {
        if partner[u] != u || !neighbors[u].is_empty() {
            continue;
        }
        match waiting.take() {
            Some(w) => {
                partner[w] = u;
                partner[u] = w;
            }
            None => waiting = Some(u),
        }
    }

    let mut map: Vec<usize> = vec![UNMATCHED; n];
    let mut next_id = 0usize;
    for u in 0..n {
        if map[u] != UNMATCHED {
            continue;
        }
        map[u] = next_id;
        map[partner[u]] = next_id;
        next_id += 1;
    }

    if (next_id as f64) > (n as f64) * MIN_SHRINK_RATIO {
        return None;
    }

    let mut mass = vec![0.0; next_id];
    for (i, &c) in map.iter().enumerate() {
        mass[c] += fine.mass.get(i).copied().unwrap_or(1.0);
    }

    let mut merged: FxHashMap<(usize, usize), f64> = FxHashMap::default();
    for e in &fine.edges {
        if e.source >= n || e.target >= n {
            continue;
        }
        let (a, b) = (map[e.source], map[e.target]);
        if a == b {
            continue;
        }
        *merged.entry((a.min(b), a.max(b))).or_insert(0.0) += e.weight;
    }
    let mut edges: Vec<Edge> = merged
        .into_iter()
        .map(|((source, target), weight)| Edge {
            source,
            target,
            weight,
        })
        .collect();
    edges.sort_by(|a, b| (a.source, a.target).cmp(&(b.source, b.target)));

    Some((
        Level {
            node_count: next_id,
            edges,
            mass,
        },
        map,
    ))
}
