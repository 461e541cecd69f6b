use crate::algo::{DEFAULT_SPACING, GridOptions};
use crate::graph::Point;

/// Row-major placement on a `ceil(sqrt(n))`-wide square grid starting at the origin.
pub fn layout(n: usize, opts: &GridOptions) -> Vec<Point> {
    if n == 0 {
        return Vec::new();
    }
    let spacing = opts
        .spacing
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(DEFAULT_SPACING);
    let side = side_length(n);
    (0..n)
        .map(|i| {
            Point::new(
                (i % side) as f64 * spacing,
                (i / side) as f64 * spacing,
            )
        })
        .collect()
}

pub fn side_length(n: usize) -> usize {
    let mut side = (n as f64).sqrt().ceil() as usize;
    // Guard against float rounding around perfect squares.
    while side * side < n {
        side += 1;
    }
    while side > 1 && (side - 1) * (side - 1) >= n {
        side -= 1;
    }
    side.max(1)
}

#[cfg(test)]
mod tests {
    use super::{layout, side_length};
    use crate::algo::GridOptions;
    use crate::graph::Point;

    #[test]
    fn side_length_is_ceil_sqrt() {
        assert_eq!(side_length(1), 1);
        assert_eq!(side_length(2), 2);
        assert_eq!(side_length(4), 2);
        assert_eq!(side_length(5), 3);
        assert_eq!(side_length(9), 3);
        assert_eq!(side_length(10), 4);
    }

    #[test]
    fn five_nodes_fill_rows_left_to_right() {
        let pos = layout(5, &GridOptions { spacing: Some(1.0) });
        assert_eq!(
            pos,
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(0.0, 1.0),
                Point::new(1.0, 1.0),
            ]
        );
    }
}
