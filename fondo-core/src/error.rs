use thiserror::Error;

/// Unified error type for the fondo workspace.
///
/// Every acquisition failure is classified into a transport, payload-shape,
/// or page-shape kind so callers can tell a transient network fault from
/// real upstream schema drift. Controllers absorb everything except
/// [`FondoError::PayloadShape`], which signals that a well-formed response
/// lacked fields the domain logic requires.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FondoError {
    /// Network/HTTP failure reported by the fetch layer.
    #[error("transport failure: {msg}")]
    Transport {
        /// HTTP status code, when the server answered at all.
        status: Option<u16>,
        /// Human-readable description.
        msg: String,
    },

    /// A successful response that lacks a JSON subtree the domain requires.
    #[error("unexpected payload shape: {what}")]
    PayloadShape {
        /// The key path that was expected but absent or malformed.
        what: String,
    },

    /// Scraped page markup diverged from the expected section structure.
    #[error("unexpected page shape: {what}")]
    PageShape {
        /// Description of what failed to match.
        what: String,
    },

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl FondoError {
    /// Helper: build a `Transport` error with an optional HTTP status.
    pub fn transport(status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::Transport {
            status,
            msg: msg.into(),
        }
    }

    /// Helper: build a `PayloadShape` error for an expected key path.
    pub fn payload_shape(what: impl Into<String>) -> Self {
        Self::PayloadShape { what: what.into() }
    }

    /// Helper: build a `PageShape` error for a structural mismatch.
    pub fn page_shape(what: impl Into<String>) -> Self {
        Self::PageShape { what: what.into() }
    }

    /// True when the failure happened below the payload level and the caller
    /// may recover by degrading to empty output.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
