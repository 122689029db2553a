//! Core error types for Ledgerport.
//!
//! Institution gateways and the export orchestrator surface this
//! transport-agnostic taxonomy; reqwest-specific errors are converted at
//! the HTTP layer. Classification problems are absent here: they are
//! diagnostics, not errors (see [`crate::skip`]).

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for an export.
#[derive(Error, Debug)]
pub enum Error {
    /// An institution endpoint answered with a non-success HTTP status.
    /// Carries the raw response body for diagnosis. Fatal to the enclosing
    /// account's export; never retried.
    #[error("institution request failed with HTTP {status}: {body}")]
    Fetch { status: u16, body: String },

    /// The request never produced a response (timeout, DNS, connection).
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered 2xx but the envelope did not decode.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// An export is already in flight on this exporter.
    #[error("an export is already running")]
    Busy,

    /// Internal invariant violation.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_carries_raw_body() {
        let error = Error::Fetch {
            status: 502,
            body: "<html>Bad Gateway</html>".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "institution request failed with HTTP 502: <html>Bad Gateway</html>"
        );
    }

    #[test]
    fn busy_error_display() {
        assert_eq!(format!("{}", Error::Busy), "an export is already running");
    }
}
