//! Force kernel shared by Fruchterman-Reingold and the multilevel layout.
//!
//! One step: every node is pushed away from every other node (`k² / d`, scaled by the other
//! node's mass), every attracting edge pulls its endpoints together (`d² / k · w`), and each
//! node then moves along its net displacement by at most the current temperature.
//!
//! Repulsion is either all-pairs (O(n²) per step) or limited to a cutoff radius, in which case
//! nodes are bucketed into a uniform grid of cutoff-sized cells and only the 3×3 block of cells
//! around a node is visited.

use rustc_hash::FxHashMap;

use crate::graph::{Edge, Point};

/// Distance floor for coincident or nearly coincident nodes.
pub(crate) const EPSILON: f64 = 1e-6;

// Golden angle, used to pick a stable escape direction for coincident pairs.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// How the temperature (maximum per-step displacement) shrinks over a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cooling {
    /// Linear decay from the start temperature to zero over the iteration budget.
    Linear,
    /// Multiply the temperature by the factor after every step.
    Geometric(f64),
}

impl Cooling {
    pub(crate) fn temperature(self, start: f64, iteration: usize, total: usize) -> f64 {
        match self {
            Cooling::Linear => {
                if total == 0 {
                    return 0.0;
                }
                start * (1.0 - (iteration as f64) / (total as f64))
            }
            Cooling::Geometric(factor) => {
                let exp = i32::try_from(iteration).unwrap_or(i32::MAX);
                start * factor.powi(exp)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Repulsion {
    AllPairs,
    /// Ignore pairs further apart than this distance.
    Cutoff(f64),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ForceParams {
    /// Natural spacing between nodes.
    pub k: f64,
    /// Multiplier on the attractive term.
    pub attraction: f64,
    pub iterations: usize,
    pub start_temperature: f64,
    pub cooling: Cooling,
    /// Multiplier on the temperature clamp.
    pub damping: f64,
    pub repulsion: Repulsion,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct StepStats {
    pub temperature: f64,
    pub max_displacement: f64,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct RelaxStats {
    pub steps: Vec<StepStats>,
}

/// Runs `params.iterations` force steps over `pos` in place.
///
/// `mass` defaults to 1.0 per node. Edges whose endpoints are out of range are ignored.
pub(crate) fn relax(
    pos: &mut [Point],
    edges: &[Edge],
    mass: Option<&[f64]>,
    params: &ForceParams,
) -> RelaxStats {
    let n = pos.len();
    let mut stats = RelaxStats {
        steps: Vec::with_capacity(params.iterations),
    };
    if n == 0 || params.iterations == 0 {
        return stats;
    }

    let k = params.k.max(EPSILON);
    let k2 = k * k;
    let mut disp: Vec<Point> = vec![Point::ORIGIN; n];

    for iteration in 0..params.iterations {
        let current: &[Point] = pos;
        match params.repulsion {
            Repulsion::Cutoff(range) if range.is_finite() && range > 0.0 => {
                let grid = CellGrid::build(current, range);
                repulsion(&mut disp, |i| {
                    repulsion_on(i, current, mass, k2, grid.around(current[i]), Some(range))
                });
            }
            _ => repulsion(&mut disp, |i| {
                repulsion_on(i, current, mass, k2, 0..n, None)
            }),
        }

        for e in edges {
            if !e.attracts() || e.source >= n || e.target >= n {
                continue;
            }
            let dx = pos[e.source].x - pos[e.target].x;
            let dy = pos[e.source].y - pos[e.target].y;
            let dist = dx.hypot(dy);
            if dist < EPSILON {
                continue;
            }
            let force = (dist * dist / k) * e.weight * params.attraction;
            let fx = dx / dist * force;
            let fy = dy / dist * force;
            disp[e.source].x -= fx;
            disp[e.source].y -= fy;
            disp[e.target].x += fx;
            disp[e.target].y += fy;
        }

        let temperature =
            params
                .cooling
                .temperature(params.start_temperature, iteration, params.iterations)
                * params.damping;
        let mut max_displacement = 0.0f64;
        for (p, d) in pos.iter_mut().zip(disp.iter()) {
            let len = d.x.hypot(d.y);
            if !(len.is_finite() && len > 0.0) {
                continue;
            }
            let step = len.min(temperature.max(0.0));
            p.x += d.x / len * step;
            p.y += d.y / len * step;
            max_displacement = max_displacement.max(step);
        }

        stats.steps.push(StepStats {
            temperature,
            max_displacement,
        });
    }

    stats
}

fn repulsion<F>(out: &mut [Point], on: F)
where
    F: Fn(usize) -> Point + Sync,
{
    // Each slot is owned by exactly one node, so the parallel pass never shares a write target
    // and sums in the same order as the serial one.
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        out.par_iter_mut()
            .enumerate()
            .for_each(|(i, slot)| *slot = on(i));
    }
    #[cfg(not(feature = "parallel"))]
    {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = on(i);
        }
    }
}

fn repulsion_on(
    i: usize,
    pos: &[Point],
    mass: Option<&[f64]>,
    k2: f64,
    others: impl IntoIterator<Item = usize>,
    range: Option<f64>,
) -> Point {
    let mut acc = Point::ORIGIN;
    let pi = pos[i];
    for j in others {
        if i == j {
            continue;
        }
        let pj = pos[j];
        let dx = pi.x - pj.x;
        let dy = pi.y - pj.y;
        let len = dx.hypot(dy);
        if range.is_some_and(|r| len > r) {
            continue;
        }
        let (ux, uy) = if len > 0.0 {
            (dx / len, dy / len)
        } else {
            escape_direction(i, j)
        };
        let m = mass.and_then(|m| m.get(j)).copied().unwrap_or(1.0);
        let force = k2 * m / len.max(EPSILON);
        acc.x += ux * force;
        acc.y += uy * force;
    }
    acc
}

/// Uniform bucketing of node indices by position.
#[derive(Debug, Clone)]
struct CellGrid {
    size: f64,
    cells: FxHashMap<(i64, i64), Vec<usize>>,
}

impl CellGrid {
    fn build(pos: &[Point], size: f64) -> Self {
        let mut grid = Self {
            size,
            cells: FxHashMap::default(),
        };
        for (i, &p) in pos.iter().enumerate() {
            let key = grid.cell_of(p);
            grid.cells.entry(key).or_default().push(i);
        }
        grid
    }

    fn cell_of(&self, p: Point) -> (i64, i64) {
        // `as` saturates, so far-away points share the border cells instead of overflowing.
        (
            (p.x / self.size).floor() as i64,
            (p.y / self.size).floor() as i64,
        )
    }

    /// Indices in the 3×3 block of cells around `p`, cell by cell, ascending within a cell.
    fn around(&self, p: Point) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = self.cell_of(p);
        (-1i64..=1)
            .flat_map(move |dx| {
                (-1i64..=1).map(move |dy| (cx.saturating_add(dx), cy.saturating_add(dy)))
            })
            .filter_map(move |key| self.cells.get(&key))
            .flat_map(|cell| cell.iter().copied())
    }
}

/// Unit vector pushing `i` away from a coincident `j`; antisymmetric in `(i, j)`.
fn escape_direction(i: usize, j: usize) -> (f64, f64) {
    let (lo, hi, sign) = if i < j { (i, j, 1.0) } else { (j, i, -1.0) };
    let angle = ((lo.wrapping_mul(31).wrapping_add(hi)) as f64) * GOLDEN_ANGLE;
    (sign * angle.cos(), sign * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::{CellGrid, Cooling, ForceParams, Repulsion, escape_direction, relax};
    use crate::graph::{Edge, Point};

    fn params(iterations: usize) -> ForceParams {
        ForceParams {
            k: 10.0,
            attraction: 1.0,
            iterations,
            start_temperature: 20.0,
            cooling: Cooling::Linear,
            damping: 1.0,
            repulsion: Repulsion::AllPairs,
        }
    }

    fn path_edges(n: usize) -> Vec<Edge> {
        (1..n)
            .map(|i| Edge {
                source: i - 1,
                target: i,
                weight: 1.0,
            })
            .collect()
    }

    #[test]
    fn linear_cooling_reaches_zero_at_the_end() {
        assert_eq!(Cooling::Linear.temperature(10.0, 0, 4), 10.0);
        assert_eq!(Cooling::Linear.temperature(10.0, 2, 4), 5.0);
        assert_eq!(Cooling::Linear.temperature(10.0, 4, 4), 0.0);
    }

    #[test]
    fn geometric_cooling_multiplies_each_step() {
        let t = Cooling::Geometric(0.5).temperature(8.0, 3, 100);
        assert!((t - 1.0).abs() < 1e-12);
    }

    #[test]
    fn displacement_never_exceeds_temperature() {
        let mut pos: Vec<Point> = (0..6)
            .map(|i| Point::new(i as f64 * 0.5, (i % 2) as f64))
            .collect();
        let stats = relax(&mut pos, &path_edges(6), None, &params(80));
        assert_eq!(stats.steps.len(), 80);
        for (i, s) in stats.steps.iter().enumerate() {
            assert!(
                s.max_displacement <= s.temperature + 1e-12,
                "step {i}: moved {} with temperature {}",
                s.max_displacement,
                s.temperature
            );
        }
        let temps: Vec<f64> = stats.steps.iter().map(|s| s.temperature).collect();
        assert!(temps.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn coincident_nodes_are_separated() {
        let mut pos = vec![Point::ORIGIN; 3];
        let _ = relax(&mut pos, &[], None, &params(30));
        for i in 0..3 {
            assert!(pos[i].is_finite());
            for j in (i + 1)..3 {
                assert!(pos[i].distance(pos[j]) > 1.0, "{i} and {j} still overlap");
            }
        }
    }

    #[test]
    fn escape_direction_is_antisymmetric() {
        let (ax, ay) = escape_direction(2, 5);
        let (bx, by) = escape_direction(5, 2);
        assert_eq!(ax, -bx);
        assert_eq!(ay, -by);
        assert!(((ax * ax + ay * ay) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn self_loops_do_not_move_a_lone_node() {
        let mut pos = vec![Point::new(3.0, 4.0)];
        let edges = vec![Edge {
            source: 0,
            target: 0,
            weight: 5.0,
        }];
        let _ = relax(&mut pos, &edges, None, &params(10));
        assert_eq!(pos[0], Point::new(3.0, 4.0));
    }

    #[test]
    fn parallel_edges_sum_their_attraction() {
        let start = vec![
            Point::new(0.0, 0.0),
            Point::new(25.0, 5.0),
            Point::new(-8.0, 12.0),
        ];
        let edge = |weight: f64| Edge {
            source: 0,
            target: 1,
            weight,
        };
        let mut doubled = start.clone();
        let _ = relax(&mut doubled, &[edge(1.0), edge(1.0)], None, &params(40));
        let mut single = start;
        let _ = relax(&mut single, &[edge(2.0)], None, &params(40));
        for (a, b) in doubled.iter().zip(&single) {
            assert!(a.distance(*b) < 1e-9, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn heavier_edge_pulls_endpoints_closer() {
        let run = |w: f64| {
            let mut pos = vec![Point::new(0.0, 0.0), Point::new(30.0, 0.0)];
            let edges = vec![Edge {
                source: 0,
                target: 1,
                weight: w,
            }];
            let _ = relax(&mut pos, &edges, None, &params(200));
            pos[0].distance(pos[1])
        };
        assert!(run(4.0) < run(1.0));
    }

    #[test]
    fn cell_grid_finds_only_nearby_nodes() {
        let pos = vec![
            Point::new(0.5, 0.5),
            Point::new(1.5, 0.5),
            Point::new(9.0, 9.0),
            Point::new(-0.5, -0.5),
        ];
        let grid = CellGrid::build(&pos, 1.0);
        let mut near: Vec<usize> = grid.around(pos[0]).collect();
        near.sort_unstable();
        assert_eq!(near, vec![0, 1, 3]);
        assert_eq!(grid.around(pos[2]).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn cutoff_repulsion_ignores_distant_nodes() {
        let start = vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)];
        let mut pos = start.clone();
        let mut p = params(10);
        p.repulsion = Repulsion::Cutoff(20.0);
        let _ = relax(&mut pos, &[], None, &p);
        assert_eq!(pos, start);

        let mut pos = start.clone();
        let _ = relax(&mut pos, &[], None, &params(10));
        assert!(pos[0].distance(pos[1]) > 100.0);
    }

    #[test]
    fn cutoff_matches_all_pairs_when_everything_is_in_range() {
        let start: Vec<Point> = (0..5)
            .map(|i| Point::new(i as f64 * 2.0, (i * i) as f64 * 0.3))
            .collect();
        let edges = path_edges(5);
        let mut a = start.clone();
        let mut b = start.clone();
        let mut cutoff = params(1);
        cutoff.repulsion = Repulsion::Cutoff(1.0e6);
        let _ = relax(&mut a, &edges, None, &params(1));
        let _ = relax(&mut b, &edges, None, &cutoff);
        for (pa, pb) in a.iter().zip(b.iter()) {
            assert!(pa.distance(*pb) < 1e-9);
        }
    }
}
