//! Article graph: the node/edge container and the breadth-first crawl that fills it.
//!
//! Nodes are articles keyed by canonical title, edges are links found in an
//! article's summary. A graph is append-only while the crawl runs and frozen
//! afterwards; only its coordinates are replaced when the layout changes.

mod crawl;

pub use crawl::{crawl, CrawlOptions};

use petgraph::graph::{DiGraph, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{Result, WikigraphError};
use crate::source::NotFoundReason;

/// An article node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Canonical title, unique within a graph.
    pub title: String,
    /// Distance from the seed (0 = seed).
    pub depth: usize,
}

/// A title that did not resolve during the crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedArticle {
    pub title: String,
    /// Depth the title would have had
    pub depth: usize,
    pub reason: NotFoundReason,
}

/// 2-D position of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Title -> position mapping produced by a layout.
pub type Coordinates = HashMap<String, Position>;

/// In-memory article graph.
///
/// Backed by a petgraph `DiGraph`; node and edge indices follow insertion
/// order since nothing is ever removed.
#[derive(Debug, Default, Clone)]
pub struct GraphModel {
    graph: DiGraph<Article, ()>,
    index: HashMap<String, NodeIndex>,
    skipped: Vec<SkippedArticle>,
    coordinates: Coordinates,
    frozen: bool,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an article. Returns `false` if the title was already present
    /// (the first depth wins).
    pub fn add_node(&mut self, title: impl Into<String>, depth: usize) -> Result<bool> {
        if self.frozen {
            return Err(WikigraphError::GraphFrozen);
        }
        let title = title.into();
        if self.index.contains_key(&title) {
            return Ok(false);
        }
        let idx = self.graph.add_node(Article {
            title: title.clone(),
            depth,
        });
        self.index.insert(title, idx);
        Ok(true)
    }

    /// Add a directed link. Both endpoints must exist. Returns `false` if the
    /// link was already present.
    pub fn add_edge(&mut self, source: &str, target: &str) -> Result<bool> {
        if self.frozen {
            return Err(WikigraphError::GraphFrozen);
        }
        let (Some(&from), Some(&to)) = (self.index.get(source), self.index.get(target)) else {
            return Err(WikigraphError::DanglingEdge {
                from: source.to_string(),
                to: target.to_string(),
            });
        };
        if self.graph.find_edge(from, to).is_some() {
            return Ok(false);
        }
        self.graph.add_edge(from, to, ());
        Ok(true)
    }

    /// Record a title that failed to resolve
    pub fn record_skip(&mut self, title: impl Into<String>, depth: usize, reason: NotFoundReason) -> Result<()> {
        if self.frozen {
            return Err(WikigraphError::GraphFrozen);
        }
        self.skipped.push(SkippedArticle {
            title: title.into(),
            depth,
            reason,
        });
        Ok(())
    }

    /// Stop accepting nodes, edges and skips
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Nodes in insertion (breadth-first) order
    pub fn nodes(&self) -> impl Iterator<Item = &Article> + '_ {
        self.graph.raw_nodes().iter().map(|n| &n.weight)
    }

    /// Edges as `(source, target)` titles, in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.graph.raw_edges().iter().map(move |e| {
            (
                self.graph[e.source()].title.as_str(),
                self.graph[e.target()].title.as_str(),
            )
        })
    }

    pub fn skipped(&self) -> &[SkippedArticle] {
        &self.skipped
    }

    pub fn node(&self, title: &str) -> Option<&Article> {
        self.index.get(title).map(|&i| &self.graph[i])
    }

    pub fn contains(&self, title: &str) -> bool {
        self.index.contains_key(title)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Undirected neighbourhood of `title`: link targets first, then link
    /// sources, each once, in edge order.
    pub fn neighbors(&self, title: &str) -> Vec<&str> {
        let Some(&idx) = self.index.get(title) else {
            return Vec::new();
        };
        let mut outgoing: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.target()))
            .collect();
        let mut incoming: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.id(), e.source()))
            .collect();
        outgoing.sort_unstable_by_key(|&(id, _)| id);
        incoming.sort_unstable_by_key(|&(id, _)| id);

        let mut seen = HashSet::new();
        outgoing
            .into_iter()
            .chain(incoming)
            .filter(|&(_, n)| seen.insert(n))
            .map(|(_, n)| self.graph[n].title.as_str())
            .collect()
    }

    /// Undirected adjacency lists by node position, sorted, without
    /// self-loops or duplicate entries.
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        self.graph
            .node_indices()
            .map(|idx| {
                let mut adj: Vec<usize> = self
                    .graph
                    .neighbors_undirected(idx)
                    .filter(|&n| n != idx)
                    .map(|n| n.index())
                    .collect();
                adj.sort_unstable();
                adj.dedup();
                adj
            })
            .collect()
    }

    /// Structure-only undirected copy, for path algorithms
    pub(crate) fn undirected(&self) -> UnGraph<(), ()> {
        self.graph.map(|_, _| (), |_, _| ()).into_edge_type()
    }

    /// Replace the coordinates wholesale. The mapping must cover exactly the
    /// node set.
    pub fn set_coordinates(&mut self, coordinates: Coordinates) -> Result<()> {
        if let Some(missing) = self.nodes().find(|n| !coordinates.contains_key(&n.title)) {
            return Err(WikigraphError::CoordinateMismatch(format!(
                "no position for '{}'",
                missing.title
            )));
        }
        if let Some(extra) = coordinates.keys().find(|t| !self.index.contains_key(*t)) {
            return Err(WikigraphError::CoordinateMismatch(format!(
                "position for unknown node '{}'",
                extra
            )));
        }
        self.coordinates = coordinates;
        Ok(())
    }

    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    pub fn position(&self, title: &str) -> Option<Position> {
        self.coordinates.get(title).copied()
    }
}
