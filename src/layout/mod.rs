//! Layout algorithms: 2-D coordinates for every node of a graph.
//!
//! Every algorithm works on node indices (`GraphModel::nodes()` order) and the
//! undirected adjacency; the result is centred on the origin and scaled so the
//! largest absolute coordinate is 1.

mod force;
mod radial;
mod spectral;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::LayoutConfig;
use crate::error::{Result, WikigraphError};
use crate::graph::{Coordinates, GraphModel, Position};

/// Layout algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    /// Stress minimisation on graph-theoretic distances
    KamadaKawai,
    /// Concentric circles by crawl depth
    Shell,
    /// Fruchterman-Reingold force-directed (random start)
    Spring,
    /// Laplacian eigenvectors
    Spectral,
    /// Archimedean spiral in node order
    Spiral,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 5] = [
        LayoutKind::KamadaKawai,
        LayoutKind::Shell,
        LayoutKind::Spring,
        LayoutKind::Spectral,
        LayoutKind::Spiral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutKind::KamadaKawai => "kamada_kawai",
            LayoutKind::Shell => "shell",
            LayoutKind::Spring => "spring",
            LayoutKind::Spectral => "spectral",
            LayoutKind::Spiral => "spiral",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            LayoutKind::KamadaKawai => "Kamada Kawai Layout",
            LayoutKind::Shell => "Shell Layout",
            LayoutKind::Spring => "Spring Layout",
            LayoutKind::Spectral => "Spectral Layout",
            LayoutKind::Spiral => "Spiral Layout",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutKind {
    type Err = WikigraphError;

    /// Accepts the plain names and the `<name>_layout` spelling.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        let name = name.strip_suffix("_layout").unwrap_or(name);
        LayoutKind::ALL
            .into_iter()
            .find(|k| k.as_str() == name)
            .ok_or_else(|| WikigraphError::UnknownLayout(s.to_string()))
    }
}

/// Computes coordinates for a graph
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    /// Iterations for spring and kamada_kawai
    iterations: usize,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl LayoutEngine {
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.iterations)
    }

    /// Lay out `graph` with the algorithm named `algorithm`
    pub fn layout(&self, graph: &GraphModel, algorithm: &str) -> Result<Coordinates> {
        let kind: LayoutKind = algorithm.parse()?;
        Ok(self.compute(graph, kind))
    }

    /// Lay out `graph` with `kind`. Every node gets a position.
    pub fn compute(&self, graph: &GraphModel, kind: LayoutKind) -> Coordinates {
        let mut positions = match kind {
            LayoutKind::KamadaKawai => force::kamada_kawai(graph, self.iterations),
            LayoutKind::Shell => radial::shell(graph),
            LayoutKind::Spring => force::spring(graph, self.iterations),
            LayoutKind::Spectral => spectral::spectral(graph),
            LayoutKind::Spiral => radial::spiral(graph.node_count()),
        };
        rescale(&mut positions, 1.0);

        log::debug!("Computed {} layout for {} nodes", kind, positions.len());

        graph
            .nodes()
            .zip(positions)
            .map(|(node, pos)| (node.title.clone(), pos))
            .collect()
    }
}

/// Lay out `graph` with default settings
pub fn layout(graph: &GraphModel, algorithm: &str) -> Result<Coordinates> {
    LayoutEngine::default().layout(graph, algorithm)
}

/// Centre on the origin and scale so the largest absolute coordinate is `scale`
fn rescale(positions: &mut [Position], scale: f64) {
    if positions.is_empty() {
        return;
    }
    let n = positions.len() as f64;
    let cx = positions.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = positions.iter().map(|p| p.y).sum::<f64>() / n;

    let mut lim: f64 = 0.0;
    for p in positions.iter_mut() {
        p.x -= cx;
        p.y -= cy;
        lim = lim.max(p.x.abs()).max(p.y.abs());
    }

    if lim > 0.0 {
        for p in positions.iter_mut() {
            p.x *= scale / lim;
            p.y *= scale / lim;
        }
    }
}

/// Evenly spaced points on the unit circle; a single point sits at the origin
fn circular(n: usize) -> Vec<Position> {
    if n == 1 {
        return vec![Position::new(0.0, 0.0)];
    }
    (0..n)
        .map(|i| {
            let theta = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            Position::new(theta.cos(), theta.sin())
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn graph_from(nodes: &[(&str, usize)], edges: &[(&str, &str)]) -> GraphModel {
        let mut g = GraphModel::new();
        for (title, depth) in nodes {
            g.add_node(*title, *depth).unwrap();
        }
        for (a, b) in edges {
            g.add_edge(a, b).unwrap();
        }
        g.freeze();
        g
    }

    pub(crate) fn path(n: usize) -> GraphModel {
        let titles: Vec<String> = (0..n).map(|i| format!("N{}", i)).collect();
        let mut g = GraphModel::new();
        for (i, t) in titles.iter().enumerate() {
            g.add_node(t.clone(), i).unwrap();
        }
        for w in titles.windows(2) {
            g.add_edge(&w[0], &w[1]).unwrap();
        }
        g
    }

    fn sample() -> GraphModel {
        graph_from(
            &[("A", 0), ("B", 1), ("C", 1), ("D", 2), ("E", 2), ("Island", 1)],
            &[("A", "B"), ("A", "C"), ("B", "C"), ("B", "D"), ("C", "E")],
        )
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("kamada_kawai".parse::<LayoutKind>().unwrap(), LayoutKind::KamadaKawai);
        assert_eq!("spring_layout".parse::<LayoutKind>().unwrap(), LayoutKind::Spring);
        assert_eq!(" spiral ".parse::<LayoutKind>().unwrap(), LayoutKind::Spiral);
        for kind in LayoutKind::ALL {
            assert_eq!(kind.as_str().parse::<LayoutKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_layout() {
        let err = layout(&sample(), "circular").unwrap_err();
        assert!(matches!(err, WikigraphError::UnknownLayout(ref n) if n == "circular"));
    }

    #[test]
    fn test_every_node_gets_a_finite_coordinate() {
        let g = sample();
        for kind in LayoutKind::ALL {
            let coords = layout(&g, kind.as_str()).unwrap();
            assert_eq!(coords.len(), g.node_count(), "{}", kind);
            for node in g.nodes() {
                let p = coords.get(&node.title).unwrap();
                assert!(p.x.is_finite() && p.y.is_finite(), "{} {:?}", kind, p);
                assert!(p.x.abs() <= 1.0 + 1e-9 && p.y.abs() <= 1.0 + 1e-9);
            }
        }
    }

    #[test]
    fn test_empty_graph() {
        let g = GraphModel::new();
        for kind in LayoutKind::ALL {
            assert!(layout(&g, kind.as_str()).unwrap().is_empty());
        }
    }

    #[test]
    fn test_single_node_at_origin() {
        let g = graph_from(&[("Solo", 0)], &[]);
        for kind in LayoutKind::ALL {
            let coords = layout(&g, kind.as_str()).unwrap();
            assert_eq!(coords["Solo"], Position::new(0.0, 0.0), "{}", kind);
        }
    }

    #[test]
    fn test_layout_leaves_graph_untouched() {
        let g = sample();
        let before = g.clone();
        for kind in LayoutKind::ALL {
            let _ = layout(&g, kind.as_str()).unwrap();
        }
        assert!(g.nodes().eq(before.nodes()));
        assert!(g.edges().eq(before.edges()));
    }

    #[test]
    fn test_rescale_centres_and_bounds() {
        let mut positions = vec![Position::new(2.0, 2.0), Position::new(4.0, 6.0)];
        rescale(&mut positions, 1.0);
        assert_eq!(positions[0], Position::new(-0.5, -1.0));
        assert_eq!(positions[1], Position::new(0.5, 1.0));
    }

    #[test]
    fn test_circular() {
        assert_eq!(circular(1), vec![Position::new(0.0, 0.0)]);
        let ring = circular(4);
        assert_eq!(ring.len(), 4);
        assert!(ring.iter().all(|p| (p.distance(&Position::new(0.0, 0.0)) - 1.0).abs() < 1e-12));
    }
}
