//! Error types for the burn calculation domain.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`ProcessingError`] - Per-validator processing failures
//! - [`PeriodError`] - Invalid or disallowed reporting periods
//! - [`ChainError`] - Chain REST endpoint errors
//! - [`ConfigError`] - Configuration invariant violations
//! - [`ReportError`] - Top-level report generation errors
//!
//! Only [`ReportError`] crosses the service boundary. Per-validator errors
//! are absorbed into the report's failure list by the batch driver.
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

use crate::models::CommissionIssue;

// =============================================================================
// Processing Errors
// =============================================================================

/// Failure to turn one validator's raw chain data into a record.
///
/// These never abort a batch: the batch driver records them against the
/// validator's address and moves on.
#[derive(Debug, Clone, Error)]
pub enum ProcessingError {
    /// Commission rate is non-compliant and the processor runs in strict mode.
    #[error("Commission rate violation for {address}: {details}")]
    CommissionViolation {
        /// Operator address of the offending validator.
        address: String,
        /// Human-readable summary of every issue found.
        details: String,
        /// Structured issues, in evaluation order.
        issues: Vec<CommissionIssue>,
    },

    /// Raw record is structurally unusable (e.g. empty address).
    #[error("Invalid validator record: {0}")]
    InvalidRecord(String),
}

// =============================================================================
// Period Errors
// =============================================================================

/// Reporting period could not be used for a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// Input was not of the form `YYYY-MM`.
    #[error("Invalid period format '{0}', expected YYYY-MM")]
    InvalidFormat(String),

    /// Month component outside 1..=12.
    #[error("Invalid month {month} in period '{input}'")]
    InvalidMonth {
        /// Raw input string.
        input: String,
        /// Parsed month value.
        month: u32,
    },

    /// Period starts after the current time.
    #[error("Cannot calculate burns for future period {0}")]
    FuturePeriod(String),
}

// =============================================================================
// Chain Errors
// =============================================================================

/// Chain REST endpoint and connectivity errors.
#[derive(Debug, Clone, Error)]
pub enum ChainError {
    /// Request could not be sent or the connection dropped.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Endpoint answered with a non-success status.
    #[error("HTTP {status} from {endpoint}: {message}")]
    HttpStatus {
        /// Status code returned.
        status: u16,
        /// Endpoint path that was queried.
        endpoint: String,
        /// Response body excerpt.
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("Decoding error: {0}")]
    DecodingError(String),

    /// Request exceeded its deadline after all retries.
    #[error("Timeout querying {0}")]
    Timeout(String),

    /// Endpoint URL could not be built.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration invariant violations, detected at startup.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A rate was outside `[0, 1]` or not finite.
    #[error("{name} must be within [0, 1], got {value}")]
    RateOutOfRange {
        /// Configuration key.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Keep rate does not complement the burn rate.
    #[error("validator_keep_rate ({keep}) must equal 1 - burn_rate ({burn})")]
    KeepRateMismatch {
        /// Configured burn rate.
        burn: f64,
        /// Configured keep rate.
        keep: f64,
    },

    /// Only 18-decimal tokens are supported by the unit converter.
    #[error("Unsupported token decimals {0}, expected 18")]
    UnsupportedDecimals(u32),

    /// No restricted validators were configured.
    #[error("No restricted validators configured")]
    NoValidators,

    /// Any other invalid value.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Report Errors
// =============================================================================

/// Top-level report generation errors.
///
/// This is the error type returned by [`crate::services::BurnReportService`].
#[derive(Debug, Error)]
pub enum ReportError {
    /// Requested period is unusable.
    #[error("Period error: {0}")]
    Period(#[from] PeriodError),

    /// Chain communication failed for a systemic (not per-validator) call.
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    /// Configuration invariant violated.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connected node serves a different network than configured.
    ///
    /// This is fatal: reports would describe the wrong chain.
    #[error("Chain mismatch: connected to {connected} but configured for {expected}")]
    ChainMismatch {
        /// Network reported by the node.
        connected: String,
        /// Network expected by configuration.
        expected: String,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Result type for per-validator processing.
pub type ProcessingResult<T> = Result<T, ProcessingError>;

/// Result type for period parsing and gating.
pub type PeriodResult<T> = Result<T, PeriodError>;

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;
