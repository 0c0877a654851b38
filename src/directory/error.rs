//! Error type for directory lookups and submissions.

use std::fmt;

use thiserror::Error;

/// HTTP verb of the failed directory call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verb::Get => write!(f, "GET"),
            Verb::Post => write!(f, "POST"),
        }
    }
}

/// Raw cause of a directory failure.
#[derive(Debug, Error)]
pub enum DirectoryCause {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// The service answered 200 but its own `status` field was not 0.
    #[error("API did not return status OK (got {0} instead)")]
    AppStatus(i64),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A failed directory call, with enough context to diagnose it without
/// retrying.
#[derive(Debug, Error)]
#[error("directory {verb} to {endpoint} failed: {cause}{}", payload_suffix(.payload))]
pub struct DirectoryError {
    pub verb: Verb,
    pub endpoint: String,
    #[source]
    pub cause: DirectoryCause,
    /// JSON body of the failed submission, if any.
    pub payload: Option<String>,
}

fn payload_suffix(payload: &Option<String>) -> String {
    match payload {
        Some(data) => format!("; data: {data}"),
        None => String::new(),
    }
}

impl DirectoryError {
    pub fn new(verb: Verb, endpoint: impl Into<String>, cause: impl Into<DirectoryCause>) -> Self {
        Self {
            verb,
            endpoint: endpoint.into(),
            cause: cause.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Option<String>) -> Self {
        self.payload = payload;
        self
    }
}
