use crate::core::context::CancelReason;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to create request: {}", ErrorChain(.0))]
    BuildRequest(#[source] reqwest::Error),

    #[error("failed to do request: {0}")]
    Transport(#[source] TransportError),

    #[error("failed to read response body: {0}")]
    ReadBody(#[source] TransportError),

    #[error("unexpected server status [{status}]: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("failed to install signal handler: {0}")]
    SignalHandler(#[source] std::io::Error),

    #[error("invalid value for {field} ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Failure of an in-flight exchange, either from the HTTP stack or from the
/// execution context being cancelled.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("{}", ErrorChain(.0))]
    Http(reqwest::Error),

    #[error("context canceled ({0})")]
    Cancelled(CancelReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BuildRequest,
    Transport,
    ReadBody,
    UnexpectedStatus,
    SignalHandler,
    Config,
}

impl ProbeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProbeError::BuildRequest(_) => ErrorKind::BuildRequest,
            ProbeError::Transport(_) => ErrorKind::Transport,
            ProbeError::ReadBody(_) => ErrorKind::ReadBody,
            ProbeError::UnexpectedStatus { .. } => ErrorKind::UnexpectedStatus,
            ProbeError::SignalHandler(_) => ErrorKind::SignalHandler,
            ProbeError::InvalidConfigValue { .. } => ErrorKind::Config,
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            ProbeError::Transport(TransportError::Http(e))
            | ProbeError::ReadBody(TransportError::Http(e)) => e.is_timeout(),
            _ => false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            ProbeError::Transport(TransportError::Cancelled(_))
                | ProbeError::ReadBody(TransportError::Cancelled(_))
        )
    }

    /// Every failure is terminal and reported the same way to the supervisor.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Renders an error followed by its sources, `outer: inner: root`.
struct ErrorChain<'a>(&'a reqwest::Error);

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(cause) = source {
            write!(f, ": {}", cause)?;
            source = cause.source();
        }
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;
