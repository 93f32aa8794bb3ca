//! Remote faults and their classification.

use std::fmt;
use thiserror::Error;

/// Marker the RPC service puts in the message of authentication faults.
const AUTH_FAULT_MARKER: &str = "RemoteAuthenticationException";

/// Kind of a remote failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// The token or credentials were rejected.
    Auth,
    /// Any other failure.
    Operation,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth => write!(f, "authentication"),
            Self::Operation => write!(f, "operation"),
        }
    }
}

/// A failure reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} fault: {message}")]
pub struct RemoteFault {
    pub kind: FaultKind,
    pub message: String,
    /// HTTP status, when the fault came from an HTTP response.
    pub status: Option<u16>,
}

impl RemoteFault {
    /// Build a fault, classifying it from its status and message.
    #[must_use]
    pub fn classified(status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: classify_fault(status, &message),
            message,
            status,
        }
    }

    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Self {
            kind: FaultKind::Auth,
            message: message.into(),
            status: None,
        }
    }

    #[must_use]
    pub fn operation(message: impl Into<String>) -> Self {
        Self {
            kind: FaultKind::Operation,
            message: message.into(),
            status: None,
        }
    }

    #[must_use]
    pub fn is_auth(&self) -> bool {
        self.kind == FaultKind::Auth
    }
}

/// Classify a remote failure.
///
/// HTTP 401 is an authentication fault. The RPC service reports rejected
/// tokens as generic faults, so a message naming its authentication exception
/// is one as well. Everything else is an operation fault.
#[must_use]
pub fn classify_fault(status: Option<u16>, message: &str) -> FaultKind {
    if status == Some(401) || message.contains(AUTH_FAULT_MARKER) {
        FaultKind::Auth
    } else {
        FaultKind::Operation
    }
}
