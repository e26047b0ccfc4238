//! Graph sessions: the handle a front end keeps between interactions.
//!
//! A session owns one crawled graph, its current layout choice and
//! coordinates. A new crawl means a new session; the layout can be switched
//! any number of times.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Result, WikigraphError};
use crate::graph::{crawl, CrawlOptions, GraphModel, SkippedArticle};
use crate::layout::{LayoutEngine, LayoutKind};
use crate::render::{RenderAdapter, RenderData};
use crate::source::ArticleSource;

/// Status line shown to the user after a crawl request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CrawlStatus {
    Built { topic: String, depth: usize },
    SeedNotFound,
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlStatus::Built { topic, depth } => write!(
                f,
                "The current topic is **{}** and the depth of the network is **{}**.",
                topic, depth
            ),
            CrawlStatus::SeedNotFound => f.write_str("Topic does not exist."),
        }
    }
}

/// Crawl, layout and render settings shared by all sessions
#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    pub crawl: CrawlOptions,
    pub layout: LayoutEngine,
    pub render: RenderAdapter,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            crawl: CrawlOptions::from(&config.crawl),
            layout: LayoutEngine::from_config(&config.layout),
            render: RenderAdapter::new(config.render.clone()),
        }
    }
}

/// One crawled graph with its layout
#[derive(Debug, Clone)]
pub struct GraphSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    topic: String,
    depth: usize,
    layout: LayoutKind,
    graph: GraphModel,
    engine: LayoutEngine,
    renderer: RenderAdapter,
}

impl GraphSession {
    /// Crawl `topic` and lay the result out with `layout`.
    ///
    /// Fails with `SeedNotFound` when the topic does not resolve; nothing is
    /// kept in that case.
    pub async fn build(
        source: &dyn ArticleSource,
        settings: &SessionSettings,
        topic: &str,
        depth: usize,
        layout: LayoutKind,
    ) -> Result<Self> {
        let mut graph = crawl(source, topic, depth, &settings.crawl).await?;

        // Layouts are CPU bound; keep them off the async workers
        let engine = settings.layout.clone();
        let graph = tokio::task::spawn_blocking(move || -> Result<GraphModel> {
            let coordinates = engine.compute(&graph, layout);
            graph.set_coordinates(coordinates)?;
            Ok(graph)
        })
        .await??;

        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            topic: topic.trim().to_string(),
            depth,
            layout,
            graph,
            engine: settings.layout.clone(),
            renderer: settings.render.clone(),
        })
    }

    /// Switch to the layout named `algorithm`.
    ///
    /// Returns `false` when it is already the current layout. On an unknown
    /// name the current coordinates stay in place.
    pub fn relayout(&mut self, algorithm: &str) -> Result<bool> {
        let kind: LayoutKind = algorithm.parse()?;
        self.relayout_kind(kind)
    }

    pub fn relayout_kind(&mut self, kind: LayoutKind) -> Result<bool> {
        if kind == self.layout {
            return Ok(false);
        }
        log::info!("Changing {} layout from {} to {}", self.id, self.layout, kind);
        let coordinates = self.engine.compute(&self.graph, kind);
        self.graph.set_coordinates(coordinates)?;
        self.layout = kind;
        Ok(true)
    }

    /// Fresh drawable series for the current coordinates
    pub fn render(&self) -> Result<RenderData> {
        self.renderer.render(&self.graph)
    }

    pub fn status(&self) -> CrawlStatus {
        CrawlStatus::Built {
            topic: self.topic.clone(),
            depth: self.depth,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            status: self.status().to_string(),
            topic: self.topic.clone(),
            depth: self.depth,
            layout: self.layout,
            nodes: self.graph.node_count(),
            edges: self.graph.edge_count(),
            skipped: self.graph.skipped().to_vec(),
            created_at: self.created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn layout(&self) -> LayoutKind {
        self.layout
    }

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Map a build result onto the user-visible status
pub fn status_of(result: &Result<GraphSession>) -> Option<CrawlStatus> {
    match result {
        Ok(session) => Some(session.status()),
        Err(WikigraphError::SeedNotFound(_)) => Some(CrawlStatus::SeedNotFound),
        Err(_) => None,
    }
}

/// Serializable description of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub status: String,
    pub topic: String,
    pub depth: usize,
    pub layout: LayoutKind,
    pub nodes: usize,
    pub edges: usize,
    pub skipped: Vec<SkippedArticle>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;

    fn source() -> StaticSource {
        StaticSource::new([
            ("A", vec!["B", "C", "Gone"]),
            ("B", vec!["C"]),
            ("C", vec![]),
        ])
    }

    async fn built(source: &StaticSource) -> GraphSession {
        GraphSession::build(source, &SessionSettings::default(), "A", 2, LayoutKind::Spiral)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_build_lays_out_every_node() {
        let source = source();
        let session = built(&source).await;

        assert_eq!(session.graph().node_count(), 3);
        assert_eq!(session.graph().coordinates().len(), 3);
        assert_eq!(session.layout(), LayoutKind::Spiral);
        assert_eq!(
            session.status().to_string(),
            "The current topic is **A** and the depth of the network is **2**."
        );

        let data = session.render().unwrap();
        assert_eq!(data.nodes.len(), 3);
        assert_eq!(data.edges.segment_count(), 3);
    }

    #[tokio::test]
    async fn test_build_seed_not_found() {
        let source = source();
        let result =
            GraphSession::build(&source, &SessionSettings::default(), "Nope", 1, LayoutKind::Shell).await;
        assert!(matches!(result, Err(WikigraphError::SeedNotFound(_))));
        let status = status_of(&result).unwrap();
        assert_eq!(status, CrawlStatus::SeedNotFound);
        assert_eq!(status.to_string(), "Topic does not exist.");
    }

    #[tokio::test]
    async fn test_relayout_changes_only_coordinates() {
        let source = source();
        let mut session = built(&source).await;
        let before_graph = session.graph().clone();
        let before = session.graph().coordinates().clone();

        assert!(session.relayout("shell_layout").unwrap());
        assert_eq!(session.layout(), LayoutKind::Shell);
        assert!(session.graph().nodes().eq(before_graph.nodes()));
        assert!(session.graph().edges().eq(before_graph.edges()));
        assert_eq!(session.graph().coordinates().len(), 3);
        assert_ne!(session.graph().coordinates(), &before);
    }

    #[tokio::test]
    async fn test_relayout_same_kind_is_noop() {
        let source = source();
        let mut session = built(&source).await;
        let before = session.graph().coordinates().clone();
        assert!(!session.relayout("spiral").unwrap());
        assert_eq!(session.graph().coordinates(), &before);
    }

    #[tokio::test]
    async fn test_relayout_unknown_keeps_coordinates() {
        let source = source();
        let mut session = built(&source).await;
        let before = session.graph().coordinates().clone();

        let err = session.relayout("random").unwrap_err();
        assert!(matches!(err, WikigraphError::UnknownLayout(_)));
        assert_eq!(session.layout(), LayoutKind::Spiral);
        assert_eq!(session.graph().coordinates(), &before);
    }

    #[tokio::test]
    async fn test_summary_reports_skipped() {
        let source = source();
        let session = built(&source).await;
        let summary = session.summary();
        assert_eq!(summary.nodes, 3);
        assert_eq!(summary.edges, 3);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].title, "Gone");
        assert_eq!(summary.id, session.id());
    }

    #[test]
    fn test_status_of_other_errors() {
        let result: Result<GraphSession> = Err(WikigraphError::InvalidInput("x".to_string()));
        assert!(status_of(&result).is_none());
    }
}
