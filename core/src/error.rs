//! Error types for building and dispatching a cancellable request.
//!
//! # Design
//! `InvalidUrl` is a construction error and happens before dispatch. The
//! remaining variants come back through the handoff channel. `Cancelled` gets
//! its own variant so callers can tell "the token fired" apart from a
//! transport failure without inspecting error text.

/// Errors returned by `HttpRequest` constructors and `Requester`.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The target could not be parsed or is not http(s).
    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The cancellation token fired before the response was fully read.
    #[error("request cancelled")]
    Cancelled,

    /// Connect, send or body read failed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request task ended without delivering a result.
    #[error("request task ended without a result")]
    Abandoned,
}

impl RequestError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RequestError::Cancelled)
    }
}
