use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::layout::LayoutKind;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub wikigraph: WikigraphConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
}

/// General settings
#[derive(Debug, Clone, Deserialize)]
pub struct WikigraphConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for WikigraphConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Encyclopedia service settings
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// MediaWiki action API endpoint, e.g. `https://en.wikipedia.org/w/api.php`
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    /// Number of resolved articles kept in memory; 0 disables the cache
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

/// Crawl settings
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    #[serde(default = "default_depth")]
    pub default_depth: usize,
    /// Largest depth a caller may request
    #[serde(default = "default_max_depth_limit")]
    pub max_depth_limit: usize,
    /// Article fetches in flight per depth level
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            default_depth: default_depth(),
            max_depth_limit: default_max_depth_limit(),
            concurrency: default_concurrency(),
        }
    }
}

/// Layout settings
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_layout")]
    pub default_layout: String,
    /// Iterations for the force-directed layouts
    #[serde(default = "default_iterations")]
    pub iterations: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_layout: default_layout(),
            iterations: default_iterations(),
        }
    }
}

/// Drawable series styling
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_node_size")]
    pub node_size: f64,
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    #[serde(default = "default_edge_color")]
    pub edge_color: String,
    /// Node colours, indexed by crawl depth (wrapping)
    #[serde(default = "default_node_palette")]
    pub node_palette: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            node_size: default_node_size(),
            line_width: default_line_width(),
            edge_color: default_edge_color(),
            node_palette: default_node_palette(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_port")]
    pub port: u16,
    /// Graph sessions kept before the least recently used is dropped
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            port: default_http_port(),
            max_sessions: default_max_sessions(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_user_agent() -> String {
    format!(
        "wikigraph/{} (https://github.com/wikigraph/wikigraph)",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_max_retries() -> usize {
    3
}

fn default_cache_capacity() -> usize {
    2000
}

fn default_depth() -> usize {
    2
}

fn default_max_depth_limit() -> usize {
    4
}

fn default_concurrency() -> usize {
    4
}

fn default_layout() -> String {
    "kamada_kawai".to_string()
}

fn default_iterations() -> usize {
    50
}

fn default_node_size() -> f64 {
    10.0
}

fn default_line_width() -> f64 {
    0.5
}

fn default_edge_color() -> String {
    "#888".to_string()
}

fn default_node_palette() -> Vec<String> {
    ["#d62728", "#1f77b4", "#2ca02c", "#ff7f0e", "#9467bd", "#8c564b"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn default_http_port() -> u16 {
    8000
}

fn default_max_sessions() -> usize {
    64
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in WIKIGRAPH_CONFIG environment variable (must exist)
    /// 2. ./wikigraph.toml in current directory
    ///
    /// Falls back to built-in defaults when neither is present.
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        if let Ok(path) = std::env::var("WIKIGRAPH_CONFIG") {
            return Self::from_path(Path::new(&path));
        }

        let default_path = PathBuf::from("wikigraph.toml");
        if default_path.exists() {
            return Self::from_path(&default_path);
        }

        log::debug!("No wikigraph.toml found, using built-in defaults");
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from an explicit path
    pub fn from_path(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.source.api_url)
            .with_context(|| format!("source.api_url is not a valid URL: {}", self.source.api_url))?;

        if self.source.user_agent.trim().is_empty() {
            anyhow::bail!("source.user_agent must not be empty");
        }

        if self.source.timeout_secs == 0 {
            anyhow::bail!("source.timeout_secs must be greater than 0");
        }

        if self.crawl.concurrency == 0 {
            anyhow::bail!("crawl.concurrency must be greater than 0");
        }

        if self.crawl.default_depth > self.crawl.max_depth_limit {
            anyhow::bail!(
                "crawl.default_depth ({}) must not exceed crawl.max_depth_limit ({})",
                self.crawl.default_depth,
                self.crawl.max_depth_limit
            );
        }

        self.default_layout()
            .map_err(|e| anyhow::anyhow!("layout.default_layout: {}", e))?;

        if self.render.node_palette.is_empty() {
            anyhow::bail!("render.node_palette must contain at least one colour");
        }

        if self.http_server.max_sessions == 0 {
            anyhow::bail!("http_server.max_sessions must be greater than 0");
        }

        Ok(())
    }

    /// Default layout algorithm as a typed value
    pub fn default_layout(&self) -> crate::Result<LayoutKind> {
        self.layout.default_layout.parse()
    }
}
