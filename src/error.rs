use thiserror::Error;

pub use crate::directory::DirectoryError;

/// Failures that abort a single turn. The caller replies with silence.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("session store error: {0}")]
    Store(#[from] StoreError),

    #[error("node `{from}` routed to `{to}`, which it never declared")]
    UndeclaredTransition { from: String, to: String },

    #[error("node `{0}` is not registered in the dialogue graph")]
    UnknownNode(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Startup failures. Never raised per turn.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Invalid(String),

    #[error("invalid sender address pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node `{0}` registered twice")]
    DuplicateNode(&'static str),

    #[error("start node `{0}` is not registered")]
    MissingStart(&'static str),

    #[error("node `{from}` routes to unregistered node `{to}`")]
    OrphanTarget {
        from: &'static str,
        to: &'static str,
    },

    #[error("choice node `{0}` has no choice source")]
    MissingChoices(&'static str),

    #[error("node `{node}` has an invalid validator: {message}")]
    InvalidValidator { node: &'static str, message: String },
}
