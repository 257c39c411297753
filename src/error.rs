//! Error types for api-dispatcher.
//!
//! Two families live here. `ExecuteError` is produced while running a single
//! request and never escapes the dispatch engine: it is always folded into an
//! `Outcome::Failure`. `Error` covers everything around the engine (reading
//! and decoding a batch, building the HTTP client, binding the listener) and
//! is the only kind of error that can stop the process.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Phase of execution at which a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    RequestConstruction,
    HeaderApplication,
    Transmission,
    ResponseRead,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::RequestConstruction => "request-construction",
            Stage::HeaderApplication => "header-application",
            Stage::Transmission => "transmission",
            Stage::ResponseRead => "response-read",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one request, tagged by the stage it happened in.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecuteError {
    #[error("{0}")]
    Construction(String),

    #[error("{0}")]
    HeaderApplication(String),

    #[error("{0}")]
    Transmission(String),

    #[error("{0}")]
    ResponseRead(String),
}

impl ExecuteError {
    pub fn stage(&self) -> Stage {
        match self {
            ExecuteError::Construction(_) => Stage::RequestConstruction,
            ExecuteError::HeaderApplication(_) => Stage::HeaderApplication,
            ExecuteError::Transmission(_) => Stage::Transmission,
            ExecuteError::ResponseRead(_) => Stage::ResponseRead,
        }
    }

    pub fn into_message(self) -> String {
        match self {
            ExecuteError::Construction(m)
            | ExecuteError::HeaderApplication(m)
            | ExecuteError::Transmission(m)
            | ExecuteError::ResponseRead(m) => m,
        }
    }
}

/// Errors outside the dispatch engine. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read batch from {}: {source}", .path.display())]
    ReadBatch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse batch: {0}")]
    DecodeBatch(#[from] serde_json::Error),

    #[error("invalid proxy url: {0}")]
    ProxyUrl(#[from] url::ParseError),

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Render an error together with its `source()` chain, `outer: inner: root`.
///
/// reqwest keeps the useful part ("Connection refused", "dns error") in the
/// source chain, not in the top-level message.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        let text = source.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        current = source.source();
    }
    message
}
