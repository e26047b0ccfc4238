pub mod config;
pub mod error;
pub mod source;
pub mod cache;
pub mod graph;
pub mod layout;
pub mod render;
pub mod session;
pub mod http;

pub use config::Config;
pub use error::{Result, WikigraphError};
pub use graph::{crawl, CrawlOptions, GraphModel};
pub use layout::{layout, LayoutEngine, LayoutKind};
pub use render::{render, RenderAdapter, RenderData};
pub use session::{CrawlStatus, GraphSession, SessionSettings};
pub use source::{ArticleRecord, ArticleSource, Lookup, NotFoundReason};
