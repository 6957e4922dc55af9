//! Error types for volagent

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Network Errors ===
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid replica address: {0}")]
    InvalidAddress(String),

    // === Membership Errors ===
    #[error("{0}")]
    Timeout(String),

    #[error("Couldn't find any valid replicas to start with. Original replica set from metadata: {0}")]
    NoAdmissibleReplicas(String),

    #[error("Shutdown requested")]
    Shutdown,

    // === Config Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    // === Generic ===
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Transport-level failure: the peer was unreachable or did not answer in time.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::ConnectionFailed(_) => true,
            Error::Context { source, .. } => source.is_transient(),
            _ => false,
        }
    }

    /// Is this (possibly wrapped) error a probe timeout?
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout(_) => true,
            Error::Context { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    pub fn context(self, context: impl Into<String>) -> Self {
        Error::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Wrap the error of a `Result` with what was being attempted.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(context))
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| e.context(f()))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            Error::Http(format!("{}: {}", status, e))
        } else if e.is_decode() {
            Error::InvalidResponse(e.to_string())
        } else {
            // connect, timeout, send and body errors: the peer went away
            Error::ConnectionFailed(e.to_string())
        }
    }
}
