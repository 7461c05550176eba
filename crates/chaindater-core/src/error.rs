//! Error types for block fetching.

use thiserror::Error;

/// Errors produced by the injected chain client.
///
/// The search never retries or suppresses these — whichever operation
/// triggered the fetch propagates the error to the caller unchanged.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The network call to the node failed (connection refused, timeout, etc.).
    #[error("network error: {0}")]
    Network(String),

    /// The node has no block at the requested height.
    #[error("no block at height {height}")]
    MissingBlock { height: u64 },

    /// The node's response could not be decoded into a block.
    #[error("undecodable block response: {0}")]
    Decode(String),

    /// An unexpected client-side error.
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Returns `true` if the error is transient (a caller-level retry of the
    /// whole query may succeed).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(FetchError::Network("connection reset".into()).is_transient());
        assert!(!FetchError::MissingBlock { height: 42 }.is_transient());
        assert!(!FetchError::Decode("bad timestamp".into()).is_transient());
    }

    #[test]
    fn display_formats() {
        let e = FetchError::MissingBlock { height: 9 };
        assert_eq!(e.to_string(), "no block at height 9");
    }
}
