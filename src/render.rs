//! Drawable series for a laid-out graph.
//!
//! The output mirrors two scatter traces: one line trace holding every edge as
//! a segment followed by a gap, and one marker trace holding every node with
//! its title as label.

use serde::Serialize;

use crate::config::RenderConfig;
use crate::error::{Result, WikigraphError};
use crate::graph::{GraphModel, Position};

/// Line styling
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub width: f64,
    pub color: String,
}

/// Marker styling; `color` has one entry per node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub size: f64,
    pub color: Vec<String>,
    pub line: LineStyle,
}

/// All edges as one line series: `x0, x1, None, x0, x1, None, ...`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeSeries {
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
    pub mode: &'static str,
    pub hoverinfo: &'static str,
    pub line: LineStyle,
}

impl EdgeSeries {
    /// Number of drawn segments
    pub fn segment_count(&self) -> usize {
        self.x.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// All nodes as one marker series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSeries {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub text: Vec<String>,
    pub mode: &'static str,
    pub hoverinfo: &'static str,
    pub marker: MarkerStyle,
}

impl NodeSeries {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Edge and node series of one graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderData {
    pub edges: EdgeSeries,
    pub nodes: NodeSeries,
}

/// Turns a graph with coordinates into drawable series
#[derive(Debug, Clone, Default)]
pub struct RenderAdapter {
    style: RenderConfig,
}

impl RenderAdapter {
    pub fn new(style: RenderConfig) -> Self {
        Self { style }
    }

    /// Build both series from scratch. Fails if a node has no coordinate.
    pub fn render(&self, graph: &GraphModel) -> Result<RenderData> {
        let lookup = |title: &str| -> Result<Position> {
            graph
                .position(title)
                .ok_or_else(|| WikigraphError::MissingCoordinates(title.to_string()))
        };

        let mut edge_x = Vec::with_capacity(graph.edge_count() * 3);
        let mut edge_y = Vec::with_capacity(graph.edge_count() * 3);
        for (source, target) in graph.edges() {
            let a = lookup(source)?;
            let b = lookup(target)?;
            edge_x.extend([Some(a.x), Some(b.x), None]);
            edge_y.extend([Some(a.y), Some(b.y), None]);
        }

        let mut node_x = Vec::with_capacity(graph.node_count());
        let mut node_y = Vec::with_capacity(graph.node_count());
        let mut text = Vec::with_capacity(graph.node_count());
        let mut colors = Vec::with_capacity(graph.node_count());
        for node in graph.nodes() {
            let p = lookup(&node.title)?;
            node_x.push(p.x);
            node_y.push(p.y);
            text.push(node.title.clone());
            colors.push(self.depth_color(node.depth));
        }

        Ok(RenderData {
            edges: EdgeSeries {
                x: edge_x,
                y: edge_y,
                mode: "lines",
                hoverinfo: "none",
                line: LineStyle {
                    width: self.style.line_width,
                    color: self.style.edge_color.clone(),
                },
            },
            nodes: NodeSeries {
                x: node_x,
                y: node_y,
                text,
                mode: "markers",
                hoverinfo: "text",
                marker: MarkerStyle {
                    size: self.style.node_size,
                    color: colors,
                    line: LineStyle {
                        width: 1.0,
                        color: "#fff".to_string(),
                    },
                },
            },
        })
    }

    fn depth_color(&self, depth: usize) -> String {
        let palette = &self.style.node_palette;
        if palette.is_empty() {
            return "#1f77b4".to_string();
        }
        palette[depth % palette.len()].clone()
    }
}

/// Render with the default styling
pub fn render(graph: &GraphModel) -> Result<RenderData> {
    RenderAdapter::default().render(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Coordinates;

    fn laid_out() -> GraphModel {
        let mut g = GraphModel::new();
        g.add_node("A", 0).unwrap();
        g.add_node("B", 1).unwrap();
        g.add_node("C", 1).unwrap();
        g.add_edge("A", "B").unwrap();
        g.add_edge("A", "C").unwrap();
        g.add_edge("B", "C").unwrap();
        g.freeze();
        let coords: Coordinates = [
            ("A".to_string(), Position::new(0.0, 0.0)),
            ("B".to_string(), Position::new(1.0, 0.0)),
            ("C".to_string(), Position::new(0.0, 1.0)),
        ]
        .into_iter()
        .collect();
        g.set_coordinates(coords).unwrap();
        g
    }

    #[test]
    fn test_render_empty_graph() {
        let data = render(&GraphModel::new()).unwrap();
        assert!(data.edges.is_empty());
        assert!(data.nodes.is_empty());
    }

    #[test]
    fn test_render_matches_graph() {
        let g = laid_out();
        let data = render(&g).unwrap();

        assert_eq!(data.nodes.len(), g.node_count());
        assert_eq!(data.nodes.text, vec!["A", "B", "C"]);
        assert_eq!(data.edges.segment_count(), g.edge_count());
        assert_eq!(
            data.edges.x,
            vec![Some(0.0), Some(1.0), None, Some(0.0), Some(0.0), None, Some(1.0), Some(0.0), None]
        );
        assert_eq!(
            data.edges.y,
            vec![Some(0.0), Some(0.0), None, Some(0.0), Some(1.0), None, Some(0.0), Some(1.0), None]
        );
    }

    #[test]
    fn test_render_colours_by_depth() {
        let adapter = RenderAdapter::new(RenderConfig {
            node_palette: vec!["red".to_string(), "blue".to_string()],
            ..RenderConfig::default()
        });
        let data = adapter.render(&laid_out()).unwrap();
        assert_eq!(data.nodes.marker.color, vec!["red", "blue", "blue"]);
        assert_eq!(data.nodes.marker.color.len(), data.nodes.len());
    }

    #[test]
    fn test_render_requires_coordinates() {
        let mut g = GraphModel::new();
        g.add_node("A", 0).unwrap();
        let err = render(&g).unwrap_err();
        assert!(matches!(err, WikigraphError::MissingCoordinates(ref t) if t == "A"));
    }

    #[test]
    fn test_render_serializes_gaps_as_null() {
        let data = render(&laid_out()).unwrap();
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["edges"]["x"][2], serde_json::Value::Null);
        assert_eq!(json["edges"]["mode"], "lines");
        assert_eq!(json["nodes"]["mode"], "markers");
        assert_eq!(json["nodes"]["text"][0], "A");
    }
}
