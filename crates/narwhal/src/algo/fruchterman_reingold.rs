use crate::algo::FruchtermanReingoldOptions;
use crate::algo::force::{self, ForceParams, Repulsion};
use crate::algo::rng::XorShift64Star;
use crate::graph::{Graph, Point};

/// Area per node used when `area` is not configured.
pub const AREA_PER_NODE: f64 = 100.0;

pub fn layout(graph: &Graph, opts: &FruchtermanReingoldOptions) -> Vec<Point> {
    let n = graph.node_count();
    match n {
        0 => return Vec::new(),
        1 => return vec![Point::ORIGIN],
        _ => {}
    }

    let area = opts
        .area
        .filter(|a| a.is_finite() && *a > 0.0)
        .unwrap_or(n as f64 * AREA_PER_NODE);
    let side = area.sqrt();
    let k = (area / n as f64).sqrt();
    let start_temperature = opts
        .start_temperature
        .filter(|t| t.is_finite() && *t > 0.0)
        .unwrap_or(side / 10.0);

    let mut rng = XorShift64Star::new(opts.seed);
    let mut pos = random_square(n, side, &mut rng);

    let stats = force::relax(
        &mut pos,
        graph.edges(),
        None,
        &ForceParams {
            k,
            attraction: 1.0,
            iterations: opts.iterations,
            start_temperature,
            cooling: opts.cooling,
            damping: 1.0,
            repulsion: Repulsion::AllPairs,
        },
    );
    tracing::debug!(
        nodes = n,
        iterations = stats.steps.len(),
        k,
        start_temperature,
        final_displacement = stats.steps.last().map_or(0.0, |s| s.max_displacement),
        "fruchterman-reingold finished"
    );

    pos
}

/// Uniform random points in a `side × side` square centered on the origin.
pub(crate) fn random_square(n: usize, side: f64, rng: &mut XorShift64Star) -> Vec<Point> {
    let half = side / 2.0;
    (0..n)
        .map(|_| Point::new(rng.next_f64_signed() * half, rng.next_f64_signed() * half))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{layout, random_square};
    use crate::algo::FruchtermanReingoldOptions;
    use crate::algo::rng::XorShift64Star;
    use crate::graph::{Graph, Link, Node};

    #[test]
    fn random_square_stays_inside_bounds() {
        let mut rng = XorShift64Star::new(3);
        for p in random_square(200, 40.0, &mut rng) {
            assert!(p.x.abs() <= 20.0 && p.y.abs() <= 20.0);
        }
    }

    #[test]
    fn zero_iterations_keeps_the_seeded_start() {
        let g = Graph::build(
            vec![Node::new("a"), Node::new("b"), Node::new("c")],
            vec![Link::new("a", "b")],
        )
        .unwrap();
        let opts = FruchtermanReingoldOptions {
            iterations: 0,
            seed: 9,
            ..Default::default()
        };
        let mut rng = XorShift64Star::new(9);
        let expected = random_square(3, (300.0f64).sqrt(), &mut rng);
        assert_eq!(layout(&g, &opts), expected);
    }
}
