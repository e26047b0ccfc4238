//! Bounded breadth-first crawl over article links.

use std::collections::{HashMap, HashSet};

use futures_util::{stream, StreamExt};

use crate::config::CrawlConfig;
use crate::graph::GraphModel;
use crate::source::{ArticleSource, Lookup};
use crate::{Result, WikigraphError};

/// Limits applied to a crawl request.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Largest `max_depth` accepted
    pub max_depth_limit: usize,
    /// Article fetches in flight per depth level
    pub concurrency: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self::from(&CrawlConfig::default())
    }
}

impl From<&CrawlConfig> for CrawlOptions {
    fn from(config: &CrawlConfig) -> Self {
        Self {
            max_depth_limit: config.max_depth_limit,
            concurrency: config.concurrency.max(1),
        }
    }
}

/// Crawl the link graph from `seed`, `max_depth` levels deep.
///
/// Each level is fetched with bounded parallelism and consumed in frontier
/// order; the next level starts once the current one is done. A title is
/// fetched at most once. Titles that do not resolve are left out of the graph
/// and recorded in its skip list, except the seed, which fails the crawl with
/// `SeedNotFound`. Links are turned into edges once the crawl is complete and
/// only when their target became a node. The returned graph is frozen.
pub async fn crawl(
    source: &dyn ArticleSource,
    seed: &str,
    max_depth: usize,
    options: &CrawlOptions,
) -> Result<GraphModel> {
    let seed = seed.trim();
    if seed.is_empty() {
        return Err(WikigraphError::InvalidInput("Seed title cannot be empty".to_string()));
    }
    if max_depth > options.max_depth_limit {
        return Err(WikigraphError::InvalidInput(format!(
            "Depth {} exceeds the limit of {}",
            max_depth, options.max_depth_limit
        )));
    }

    log::info!("Crawling '{}' to depth {}", seed, max_depth);

    let mut graph = GraphModel::new();
    let mut visited: HashSet<String> = HashSet::new();
    // requested title -> canonical title
    let mut aliases: HashMap<String, String> = HashMap::new();
    // canonical title -> outbound links, in resolution order
    let mut recorded: Vec<(String, Vec<String>)> = Vec::new();

    visited.insert(seed.to_string());
    let mut frontier = vec![seed.to_string()];
    let mut depth = 0;

    while !frontier.is_empty() {
        log::debug!("Depth {}: resolving {} titles", depth, frontier.len());

        let lookups: Vec<(String, Lookup)> = stream::iter(frontier)
            .map(|title| async move {
                let lookup = source.resolve(&title).await;
                (title, lookup)
            })
            .buffered(options.concurrency.max(1))
            .collect()
            .await;

        let mut next = Vec::new();

        for (title, lookup) in lookups {
            let record = match lookup {
                Lookup::Found(record) => record,
                Lookup::NotFound(reason) => {
                    if depth == 0 {
                        log::info!("Seed '{}' not found ({})", title, reason);
                        return Err(WikigraphError::SeedNotFound(title));
                    }
                    log::warn!("Skipping '{}' ({})", title, reason);
                    graph.record_skip(title, depth, reason)?;
                    continue;
                }
            };

            let canonical = record.canonical_title;
            if canonical != title {
                aliases.insert(title, canonical.clone());
            }

            if !graph.add_node(canonical.clone(), depth)? {
                // Another requested title already resolved to this article
                continue;
            }
            visited.insert(canonical.clone());

            if depth < max_depth {
                for link in &record.outbound_links {
                    if visited.insert(link.clone()) {
                        next.push(link.clone());
                    }
                }
            }

            recorded.push((canonical, record.outbound_links));
        }

        // A title queued before a redirect revealed it as an existing node
        next.retain(|title| !graph.contains(title));

        frontier = next;
        depth += 1;
    }

    for (source_title, links) in &recorded {
        for link in links {
            let target = aliases.get(link).unwrap_or(link);
            if graph.contains(target) {
                graph.add_edge(source_title, target)?;
            }
        }
    }

    graph.freeze();

    log::info!(
        "Crawl of '{}' finished: {} articles, {} links, {} skipped",
        seed,
        graph.node_count(),
        graph.edge_count(),
        graph.skipped().len()
    );

    Ok(graph)
}
