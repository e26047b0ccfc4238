//! Article sources: where titles are resolved into canonical articles and links.
//!
//! The crawl only talks to the [`ArticleSource`] trait. `WikipediaSource`
//! queries the MediaWiki action API; `StaticSource` serves a fixed link table
//! (JSON fixtures, tests).

mod extraction;
mod fixture;
mod wikipedia;

pub use extraction::extract_summary_links;
pub use fixture::StaticSource;
pub use wikipedia::WikipediaSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved article: its canonical title and outbound links in summary order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub canonical_title: String,
    pub outbound_links: Vec<String>,
}

/// Why a title did not resolve to an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundReason {
    /// No such article
    Missing,
    /// The title is a disambiguation page
    Disambiguation,
    /// The service could not be reached or answered garbage
    Unavailable,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotFoundReason::Missing => "missing",
            NotFoundReason::Disambiguation => "disambiguation",
            NotFoundReason::Unavailable => "unavailable",
        };
        f.write_str(s)
    }
}

/// Outcome of resolving one title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(ArticleRecord),
    NotFound(NotFoundReason),
}

/// Resolves article titles.
///
/// Implementations must be idempotent per title within a crawl. Timeouts and
/// retries are the implementation's business; they surface only as
/// `Lookup::NotFound(NotFoundReason::Unavailable)`.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn resolve(&self, title: &str) -> Lookup;
}
