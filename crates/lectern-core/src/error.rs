// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Lectern workspace.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across all Lectern adapter traits and core operations.
#[derive(Debug, Error)]
pub enum LecternError {
    /// Configuration errors (invalid roster, weights out of range, missing providers).
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed input handed to the coordinator (bad profile, empty roster,
    /// unsupported section).
    #[error("validation error: {0}")]
    Validation(String),

    /// LLM or embedding provider errors (API failure, auth, rate limiting).
    #[error("provider error ({provider}): {message}")]
    Provider {
        provider: String,
        message: String,
        /// Whether retrying the same request may succeed.
        transient: bool,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A provider call exceeded its deadline.
    #[error("{provider} timed out after {duration:?}")]
    Timeout { provider: String, duration: Duration },

    /// Every candidate across every model scored below the confidence floor.
    #[error("no viable assignment: all {candidates} candidates scored below the floor of {floor}")]
    NoViableAssignment { candidates: usize, floor: f64 },

    /// Every call in a fan-out batch failed.
    #[error("all {attempted} provider calls failed")]
    AllProvidersFailed {
        attempted: usize,
        /// `(label, message)` per failed call, in submission order.
        failures: Vec<(String, String)>,
    },

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LecternError {
    /// Builds a non-transient provider error without an underlying source.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            transient: false,
            source: None,
        }
    }

    /// Returns true for failures worth retrying: transient provider errors and timeouts.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Provider { transient, .. } => *transient,
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

/// Maps an HTTP status code to whether the failure is transient.
///
/// 429 (rate limited), 500, 502, 503, and 529 (overloaded) are retried.
pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 529)
}
