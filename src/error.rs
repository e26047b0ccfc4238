use thiserror::Error;

/// Main error type for Wikigraph
#[derive(Error, Debug)]
pub enum WikigraphError {
    /// The seed article of a crawl could not be resolved
    #[error("Seed article not found: {0}")]
    SeedNotFound(String),

    /// Layout algorithm name is not one of the supported ones
    #[error("Unknown layout: {0}")]
    UnknownLayout(String),

    /// Edge added before both of its endpoints exist
    #[error("Dangling edge: {from} -> {to}")]
    DanglingEdge { from: String, to: String },

    /// Node or edge mutation after the crawl finished
    #[error("Graph is frozen")]
    GraphFrozen,

    /// Coordinates do not cover exactly the node set
    #[error("Coordinate mismatch: {0}")]
    CoordinateMismatch(String),

    /// Render requested for a node that has not been laid out
    #[error("Missing coordinates for node: {0}")]
    MissingCoordinates(String),

    /// Article source transport errors
    #[error("Article source error: {0}")]
    Source(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A blocking layout task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Unknown graph session id
    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

/// Convenient Result type using WikigraphError
pub type Result<T> = std::result::Result<T, WikigraphError>;
