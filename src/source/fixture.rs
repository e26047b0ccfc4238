//! In-memory article source backed by a fixed link table.

use crate::error::Result;
use crate::source::{ArticleRecord, ArticleSource, Lookup, NotFoundReason};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

/// On-disk fixture layout
///
/// ```json
/// {"articles": {"A": ["B", "C"]}, "redirects": {"a": "A"}, "disambiguation": ["X"]}
/// ```
#[derive(Debug, Deserialize)]
struct FixtureFile {
    articles: HashMap<String, Vec<String>>,
    #[serde(default)]
    redirects: HashMap<String, String>,
    #[serde(default)]
    disambiguation: Vec<String>,
}

/// Article source serving a fixed link table, for offline crawls and tests.
///
/// Counts how often each title was requested.
#[derive(Debug, Default)]
pub struct StaticSource {
    articles: HashMap<String, Vec<String>>,
    redirects: HashMap<String, String>,
    disambiguation: HashSet<String>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl StaticSource {
    /// Build from `(title, links)` pairs
    pub fn new<I, T, L>(articles: I) -> Self
    where
        I: IntoIterator<Item = (T, L)>,
        T: Into<String>,
        L: IntoIterator,
        L::Item: Into<String>,
    {
        Self {
            articles: articles
                .into_iter()
                .map(|(title, links)| (title.into(), links.into_iter().map(Into::into).collect()))
                .collect(),
            ..Self::default()
        }
    }

    /// Load a JSON fixture file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse a JSON fixture
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: FixtureFile = serde_json::from_str(json)?;
        Ok(Self {
            articles: file.articles,
            redirects: file.redirects,
            disambiguation: file.disambiguation.into_iter().collect(),
            fetches: Mutex::new(HashMap::new()),
        })
    }

    /// Make `alias` resolve to the article `target`
    pub fn with_redirect(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.redirects.insert(alias.into(), target.into());
        self
    }

    /// Mark `title` as a disambiguation page
    pub fn with_disambiguation(mut self, title: impl Into<String>) -> Self {
        self.disambiguation.insert(title.into());
        self
    }

    /// How many times `title` has been resolved
    pub fn fetch_count(&self, title: &str) -> usize {
        self.fetches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(title)
            .copied()
            .unwrap_or(0)
    }

    /// Total number of resolve calls
    pub fn total_fetches(&self) -> usize {
        self.fetches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .sum()
    }
}

#[async_trait]
impl ArticleSource for StaticSource {
    async fn resolve(&self, title: &str) -> Lookup {
        *self
            .fetches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(title.to_string())
            .or_insert(0) += 1;

        let canonical = self.redirects.get(title).map_or(title, String::as_str);

        if self.disambiguation.contains(canonical) {
            return Lookup::NotFound(NotFoundReason::Disambiguation);
        }

        match self.articles.get(canonical) {
            Some(links) => Lookup::Found(ArticleRecord {
                canonical_title: canonical.to_string(),
                outbound_links: links.clone(),
            }),
            None => Lookup::NotFound(NotFoundReason::Missing),
        }
    }
}
