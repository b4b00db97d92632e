//! Crate-level error types
//!
//! Fatal errors abort a game before the round loop starts; anything that
//! fails mid-round is degraded to a declined action by the session and
//! never surfaces through these types.

use thiserror::Error;

use crate::client::ClientError;

/// Result type alias for orchestration operations
pub type ArbiterResult<T> = Result<T, ArbiterError>;

/// Errors that abort a game before (or instead of) running it
#[derive(Debug, Error)]
pub enum ArbiterError {
    /// Invalid configuration (player count, round limit, role table violation)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// One or more participants failed the pre-game reachability probe
    #[error("Agents unreachable: {unreachable:?}")]
    Connectivity { unreachable: Vec<String> },

    /// A client failure outside the round loop (role offers, probes)
    #[error("Client error: {0}")]
    Client(#[from] ClientError),
}

impl ArbiterError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a connectivity error from the unreachable player names
    pub fn unreachable(players: Vec<String>) -> Self {
        Self::Connectivity {
            unreachable: players,
        }
    }

    /// Diagnostic string recorded on the error report
    pub fn diagnostic(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ArbiterError::config("unsupported player count 4");
        assert!(err.to_string().contains("unsupported player count 4"));

        let err = ArbiterError::unreachable(vec!["alice".to_string(), "bob".to_string()]);
        assert!(err.to_string().contains("alice"));
        assert!(err.to_string().contains("bob"));
    }

    #[test]
    fn test_error_from_client() {
        let client_err = ClientError::timeout("http://localhost:9000");
        let err: ArbiterError = client_err.into();
        assert!(matches!(err, ArbiterError::Client(_)));
        assert!(err.diagnostic().contains("localhost:9000"));
    }
}
