use std::fmt;

use thiserror::Error;

/// Event produced by a polling stream: any number of `Data`, then exactly one
/// of `End` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent<T, S> {
    Data(T),
    End(S),
    Error(EngineError),
}

impl<T, S> StreamEvent<T, S> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Data(_))
    }
}

/// A failed request. Transport problems and HTTP error statuses are kept
/// apart through [`FailureKind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self.kind, FailureKind::Timeout | FailureKind::Network)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// The server answered but the body could not be understood.
    InvalidBody,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::InvalidBody => write!(f, "invalid response body"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Rejected before any request was made.
    #[error("{0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(
        "Maximum retry attempts reached. Unable to find the build information from the queue item"
    )]
    MaxRetriesExceeded { attempts: u32 },
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error(transparent)]
    Config(#[from] jen_core::ConfigError),
}
