use std::f64::consts::TAU;

use crate::algo::{CircleOptions, DEFAULT_SPACING};
use crate::graph::Point;

/// Radius that keeps neighbouring nodes `DEFAULT_SPACING` apart along the circle.
pub fn default_radius(n: usize) -> f64 {
    n as f64 * DEFAULT_SPACING / TAU
}

/// Places `n` nodes counter-clockwise on a circle around the origin, node 0 on the positive x
/// axis. Edges play no part.
pub fn layout(n: usize, opts: &CircleOptions) -> Vec<Point> {
    if n == 1 {
        return vec![Point::ORIGIN];
    }
    let radius = opts
        .radius
        .filter(|r| r.is_finite() && *r >= 0.0)
        .unwrap_or_else(|| default_radius(n));
    (0..n)
        .map(|i| {
            let angle = TAU * (i as f64) / (n as f64);
            Point::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}
