//! # Chain Errors
//!
//! Error types for chain client operations.
//!
//! This module provides the error taxonomy shared by every chain family:
//! connectivity failures, configuration problems, encoding mismatches,
//! chain-semantic rejections, and missing entities. The set is closed on
//! purpose; callers branch on the category, not on message text.
//!
//! # Examples
//!
//! ```
//! use chain_client::error::ChainError;
//!
//! let error = ChainError::connectivity("endpoint unreachable");
//! assert!(error.is_retryable());
//!
//! let error = ChainError::not_found("abi", "erc721");
//! assert!(error.is_not_found());
//! assert!(!error.is_retryable());
//! ```

use thiserror::Error;

/// Error type for chain client operations.
///
/// Represents errors that can occur when talking to a blockchain endpoint,
/// encoding or decoding payloads, or validating caller input. Retries are
/// the caller's decision; this layer only classifies.
#[derive(Debug, Clone, Error)]
pub enum ChainError {
    /// Endpoint unreachable, request timed out, or the transport returned
    /// a malformed response.
    #[error("chain connectivity error: {message}")]
    Connectivity {
        /// Error message.
        message: String,
    },

    /// Invalid or incomplete configuration (endpoints, ABI text, chain ids).
    #[error("chain configuration error: {message}")]
    Configuration {
        /// Error message.
        message: String,
    },

    /// Argument, payload, or log data did not match the expected shape.
    #[error("chain encoding error: {message}")]
    Encoding {
        /// Error message.
        message: String,
    },

    /// The chain rejected the operation: reverts, invalid addresses,
    /// malformed signatures, fee violations.
    #[error("chain semantic error: {message}")]
    Semantic {
        /// Error message.
        message: String,
    },

    /// A named entity does not exist.
    #[error("{entity} not found: {name}")]
    NotFound {
        /// Kind of entity looked up (abi, method, event, transaction, chain).
        entity: String,
        /// The name or id that was looked up.
        name: String,
    },
}

impl ChainError {
    /// Creates a connectivity error.
    #[must_use]
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an encoding error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Creates a chain-semantic error.
    #[must_use]
    pub fn semantic(message: impl Into<String>) -> Self {
        Self::Semantic {
            message: message.into(),
        }
    }

    /// Creates a not-found error for a named entity.
    #[must_use]
    pub fn not_found(entity: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            name: name.into(),
        }
    }

    /// Returns true if this error is transient and may succeed on retry.
    ///
    /// Only connectivity failures qualify; every other category reflects
    /// input or chain state that a retry will not change.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }

    /// Returns true if this error reports a missing entity.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this error was caused by caller-supplied input
    /// (configuration or encoding) rather than by the chain.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Encoding { .. })
    }
}

/// Result type for chain client operations.
pub type ChainResult<T> = Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_is_retryable() {
        let error = ChainError::connectivity("connection refused");
        assert!(error.is_retryable());
        assert!(!error.is_caller_error());
    }

    #[test]
    fn configuration_is_caller_error() {
        let error = ChainError::configuration("no endpoints");
        assert!(error.is_caller_error());
        assert!(!error.is_retryable());
    }

    #[test]
    fn encoding_is_caller_error() {
        let error = ChainError::encoding("expected uint256");
        assert!(error.is_caller_error());
    }

    #[test]
    fn semantic_is_not_retryable() {
        let error = ChainError::semantic("execution reverted");
        assert!(!error.is_retryable());
        assert!(!error.is_caller_error());
    }

    #[test]
    fn not_found_classification() {
        let error = ChainError::not_found("transaction", "0xabc");
        assert!(error.is_not_found());
        assert!(!error.is_retryable());
    }

    #[test]
    fn display_format() {
        let error = ChainError::not_found("abi", "erc20");
        assert_eq!(error.to_string(), "abi not found: erc20");

        let error = ChainError::semantic("revert");
        let display = error.to_string();
        assert!(display.contains("semantic"));
        assert!(display.contains("revert"));
    }
}
