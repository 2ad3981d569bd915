use thiserror::Error;

/// Main error type for piigraph
#[derive(Error, Debug)]
pub enum PiiGraphError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Entity fetch errors (network or non-success status)
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Quoted literal could not be decoded
    #[error("Literal error: {0}")]
    Literal(String),

    /// Relation protocol errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Node not present in the session
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Relation backend errors
    #[error("Server error: {0}")]
    Server(String),
}

/// Convenient Result type using PiiGraphError
pub type Result<T> = std::result::Result<T, PiiGraphError>;
