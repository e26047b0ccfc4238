use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::graph::{GraphModel, Position};

/// Angle increment per node of the spiral
const SPIRAL_RESOLUTION: f64 = 0.35;

/// Concentric shells by crawl depth, shallowest innermost.
///
/// A first shell with a single node (the seed) sits at the centre.
pub(super) fn shell(graph: &GraphModel) -> Vec<Position> {
    let n = graph.node_count();
    let mut positions = vec![Position::new(0.0, 0.0); n];
    if n == 0 {
        return positions;
    }

    let mut shells: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, node) in graph.nodes().enumerate() {
        shells.entry(node.depth).or_default().push(i);
    }

    let radius_bump = 1.0 / shells.len() as f64;
    let rotate = PI / shells.len() as f64;
    let mut radius = match shells.values().next() {
        Some(first) if first.len() == 1 => 0.0,
        _ => radius_bump,
    };

    for (s, members) in shells.values().enumerate() {
        let count = members.len() as f64;
        for (k, &i) in members.iter().enumerate() {
            let theta = 2.0 * PI * k as f64 / count + rotate * s as f64;
            positions[i] = Position::new(radius * theta.cos(), radius * theta.sin());
        }
        radius += radius_bump;
    }

    positions
}

/// Node `i` at distance `i` from the centre, turned by `i * 0.35` radians
pub(super) fn spiral(n: usize) -> Vec<Position> {
    (0..n)
        .map(|i| {
            let dist = i as f64;
            let angle = SPIRAL_RESOLUTION * dist;
            Position::new(dist * angle.cos(), dist * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests::graph_from;
    use crate::layout::LayoutEngine;
    use crate::layout::LayoutKind;

    #[test]
    fn test_shell_seed_at_centre_and_rings_by_depth() {
        let g = graph_from(
            &[("A", 0), ("B", 1), ("C", 1), ("D", 1), ("E", 2), ("F", 2)],
            &[("A", "B"), ("A", "C"), ("A", "D"), ("B", "E"), ("C", "F")],
        );
        let coords = LayoutEngine::default().compute(&g, LayoutKind::Shell);
        let origin = Position::new(0.0, 0.0);

        assert!(coords["A"].distance(&origin) < 1e-9);
        let r1 = coords["B"].distance(&origin);
        assert!((coords["C"].distance(&origin) - r1).abs() < 1e-9);
        assert!((coords["D"].distance(&origin) - r1).abs() < 1e-9);
        let r2 = coords["E"].distance(&origin);
        assert!((coords["F"].distance(&origin) - r2).abs() < 1e-9);
        assert!(r2 > r1 && r1 > 0.0);
    }

    #[test]
    fn test_shell_raw_radii() {
        let g = graph_from(&[("A", 0), ("B", 1), ("C", 1)], &[("A", "B"), ("A", "C")]);
        let positions = shell(&g);
        assert_eq!(positions[0], Position::new(0.0, 0.0));
        let origin = Position::new(0.0, 0.0);
        assert!((positions[1].distance(&origin) - 0.5).abs() < 1e-12);
        assert!((positions[2].distance(&origin) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_spiral_is_deterministic_and_outward() {
        let positions = spiral(10);
        assert_eq!(positions, spiral(10));
        let origin = Position::new(0.0, 0.0);
        for w in positions.windows(2) {
            assert!(w[1].distance(&origin) > w[0].distance(&origin));
        }
    }
}
