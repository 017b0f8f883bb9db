//! Error Types for the Fundamental Analyzer

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Identifier could not be resolved against the market-data catalog
    #[error("Cryptocurrency '{0}' not found on CoinMarketCap")]
    NotFound(String),

    /// Upstream responded with a non-success status
    #[error("{provider} returned HTTP {status} for {endpoint}")]
    Upstream {
        provider: &'static str,
        endpoint: String,
        status: u16,
    },

    /// Upstream answered successfully but the payload was unusable
    #[error("Malformed {provider} response: {reason}")]
    MalformedResponse {
        provider: &'static str,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification used in error records
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Upstream,
    Config,
}

/// Structured, serializable failure returned to callers instead of a fault
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub identifier: String,
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl AnalyzerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalyzerError::NotFound(_) => ErrorKind::NotFound,
            AnalyzerError::Config(_) => ErrorKind::Config,
            AnalyzerError::Upstream { .. }
            | AnalyzerError::MalformedResponse { .. }
            | AnalyzerError::Network(_)
            | AnalyzerError::Serialization(_) => ErrorKind::Upstream,
        }
    }

    /// Check if the caller may reasonably retry
    pub fn is_retryable(&self) -> bool {
        match self {
            AnalyzerError::Network(_) => true,
            AnalyzerError::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AnalyzerError::NotFound(name) => format!(
                "Cryptocurrency '{}' was not found. Check the spelling or try its ticker symbol.",
                name
            ),
            AnalyzerError::Upstream {
                provider, status, ..
            } if *status == 401 || *status == 403 => {
                format!("{} rejected the API key (HTTP {}).", provider, status)
            }
            AnalyzerError::Upstream { provider, .. }
            | AnalyzerError::MalformedResponse { provider, .. } => {
                format!("{} is not answering correctly right now. Please try again.", provider)
            }
            AnalyzerError::Network(e) if e.is_timeout() => {
                "The market-data request timed out. Please try again.".into()
            }
            AnalyzerError::Network(_) => "Could not reach the market-data service.".into(),
            AnalyzerError::Config(msg) => format!("Configuration problem: {}", msg),
            AnalyzerError::Serialization(_) => "Received data in an unexpected format.".into(),
        }
    }

    pub fn to_record(&self, identifier: impl Into<String>) -> ErrorRecord {
        ErrorRecord {
            identifier: identifier.into(),
            kind: self.kind(),
            message: self.to_string(),
            retryable: self.is_retryable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_record() {
        let err = AnalyzerError::NotFound("notacoin".into());
        let record = err.to_record("notacoin");

        assert_eq!(record.kind, ErrorKind::NotFound);
        assert!(!record.retryable);
        assert!(record.message.contains("notacoin"));
    }

    #[test]
    fn test_upstream_retryable_by_status() {
        let unavailable = AnalyzerError::Upstream {
            provider: "CoinMarketCap",
            endpoint: "cryptocurrency/map".into(),
            status: 503,
        };
        let unauthorized = AnalyzerError::Upstream {
            provider: "CoinMarketCap",
            endpoint: "cryptocurrency/map".into(),
            status: 401,
        };

        assert!(unavailable.is_retryable());
        assert!(!unauthorized.is_retryable());
        assert_eq!(unauthorized.kind(), ErrorKind::Upstream);
        assert!(unauthorized.user_message().contains("API key"));
    }
}
