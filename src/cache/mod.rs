pub mod article_cache;

pub use article_cache::ArticleCache;
