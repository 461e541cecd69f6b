//! Multilevel force-directed layout for large, sparse graphs.
//!
//! The graph is coarsened by heavy-edge matching until it is small, the coarsest level gets a
//! full all-pairs force layout, and every finer level starts from its super-node positions and
//! is relaxed with cutoff repulsion only. The quadratic cost is therefore paid on the coarsest
//! level alone.

mod coarsen;

use crate::algo::DrlOptions;
use crate::algo::force::{self, Cooling, ForceParams, Repulsion};
use crate::algo::fruchterman_reingold::{AREA_PER_NODE, random_square};
use crate::algo::rng::XorShift64Star;
use crate::graph::{Graph, Point};

use coarsen::{Hierarchy, Level};

/// `init_attraction` value that leaves the attractive term unscaled.
pub const NEUTRAL_ATTRACTION: f64 = 10.0;

/// Layout extent that `init_temperature` is measured against: the default of 2000 starts the
/// coarsest level at a tenth of the layout width.
pub const TEMPERATURE_REFERENCE_EXTENT: f64 = 20_000.0;

/// Refinement jitter, as a fraction of the level's natural spacing.
const REFINE_JITTER: f64 = 0.1;
/// Refinement start temperature, in multiples of the level's natural spacing.
const REFINE_TEMPERATURE: f64 = 2.0;
/// Cutoff radius for refinement repulsion, in multiples of the level's natural spacing.
const REFINE_REPULSION_RANGE: f64 = 3.0;

pub fn layout(graph: &Graph, opts: &DrlOptions) -> Vec<Point> {
    let n = graph.node_count();
    match n {
        0 => return Vec::new(),
        1 => return vec![Point::ORIGIN],
        _ => {}
    }

    let area = n as f64 * AREA_PER_NODE;
    let side = area.sqrt();
    let attraction = (opts.init_attraction / NEUTRAL_ATTRACTION).max(0.0);
    let damping = if opts.init_damping_mult.is_finite() && opts.init_damping_mult > 0.0 {
        opts.init_damping_mult
    } else {
        1.0
    };
    let cooling = Cooling::Geometric(opts.cool_factor.clamp(0.0, 1.0));

    let hierarchy = Hierarchy::build(
        Level::new(n, graph.edges().to_vec()),
        opts.edge_cut,
        opts.coarsest_size,
    );
    let mut rng = XorShift64Star::new(opts.seed);

    let coarsest = hierarchy.coarsest();
    let coarsest_k = natural_spacing(area, coarsest.node_count);
    let mut pos = random_square(coarsest.node_count, side, &mut rng);
    let stats = force::relax(
        &mut pos,
        &coarsest.edges,
        Some(&coarsest.relative_mass()),
        &ForceParams {
            k: coarsest_k,
            attraction,
            iterations: opts.init_iterations,
            start_temperature: opts.init_temperature.max(0.0) * side
                / TEMPERATURE_REFERENCE_EXTENT,
            cooling,
            damping,
            repulsion: coarsest_repulsion(coarsest.node_count, opts.coarsest_size, coarsest_k),
        },
    );
    tracing::debug!(
        levels = hierarchy.levels.len(),
        coarsest = coarsest.node_count,
        iterations = stats.steps.len(),
        "drl coarsest level laid out"
    );

    for l in (0..hierarchy.maps.len()).rev() {
        let fine = &hierarchy.levels[l];
        let map = &hierarchy.maps[l];
        let k = natural_spacing(area, fine.node_count);
        pos = expand(&pos, map, k * REFINE_JITTER, &mut rng);
        let _ = force::relax(
            &mut pos,
            &fine.edges,
            Some(&fine.relative_mass()),
            &ForceParams {
                k,
                attraction,
                iterations: opts.refine_iterations,
                start_temperature: REFINE_TEMPERATURE * k,
                cooling,
                damping,
                repulsion: Repulsion::Cutoff(REFINE_REPULSION_RANGE * k),
            },
        );
    }

    if opts.output_scale != 1.0 && opts.output_scale.is_finite() {
        for p in &mut pos {
            p.x *= opts.output_scale;
            p.y *= opts.output_scale;
        }
    }
    pos
}

/// All-pairs repulsion for a small coarsest level; a level that matching could not bring down to
/// `coarsest_size` is treated like a refinement level.
fn coarsest_repulsion(node_count: usize, coarsest_size: usize, k: f64) -> Repulsion {
    if node_count <= coarsest_size.max(1) {
        Repulsion::AllPairs
    } else {
        Repulsion::Cutoff(REFINE_REPULSION_RANGE * k)
    }
}

fn natural_spacing(area: f64, nodes: usize) -> f64 {
    (area / nodes.max(1) as f64).sqrt()
}

/// Places every fine node on its super-node, nudged by a seeded jitter of at most `jitter`
/// per axis so that merged pairs can separate.
fn expand(coarse: &[Point], map: &[usize], jitter: f64, rng: &mut XorShift64Star) -> Vec<Point> {
    map.iter()
        .map(|&c| {
            let base = coarse.get(c).copied().unwrap_or(Point::ORIGIN);
            Point::new(
                base.x + rng.next_f64_signed() * jitter,
                base.y + rng.next_f64_signed() * jitter,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{REFINE_REPULSION_RANGE, coarsest_repulsion, expand, natural_spacing};
    use crate::algo::force::Repulsion;
    use crate::algo::rng::XorShift64Star;
    use crate::graph::Point;

    #[test]
    fn expand_keeps_fine_nodes_near_their_super_node() {
        let coarse = vec![Point::new(0.0, 0.0), Point::new(100.0, 50.0)];
        let map = vec![0, 1, 1, 0];
        let mut rng = XorShift64Star::new(5);
        let fine = expand(&coarse, &map, 2.0, &mut rng);
        assert_eq!(fine.len(), 4);
        for (i, p) in fine.iter().enumerate() {
            let parent = coarse[map[i]];
            assert!((p.x - parent.x).abs() <= 2.0 && (p.y - parent.y).abs() <= 2.0);
        }
        assert_ne!(fine[1], fine[2]);
    }

    #[test]
    fn oversized_coarsest_level_uses_cutoff_repulsion() {
        assert_eq!(coarsest_repulsion(32, 32, 5.0), Repulsion::AllPairs);
        assert_eq!(coarsest_repulsion(1, 0, 5.0), Repulsion::AllPairs);
        assert_eq!(
            coarsest_repulsion(500, 32, 5.0),
            Repulsion::Cutoff(REFINE_REPULSION_RANGE * 5.0)
        );
    }

    #[test]
    fn coarser_levels_get_wider_spacing() {
        let area = 1000.0 * 100.0;
        assert_eq!(natural_spacing(area, 1000), 10.0);
        assert!(natural_spacing(area, 10) > natural_spacing(area, 100));
    }
}
