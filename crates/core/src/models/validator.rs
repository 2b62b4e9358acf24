//! Per-validator records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::units::Amount;

// =============================================================================
// Bond Status
// =============================================================================

/// Bonding status surfaced by the staking module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorStatus {
    Bonded,
    Unbonded,
    Unbonding,
    Unknown,
}

impl ValidatorStatus {
    /// Map a chain status string (e.g. `BOND_STATUS_BONDED`).
    pub fn from_chain(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "BOND_STATUS_BONDED" | "BONDED" => Self::Bonded,
            "BOND_STATUS_UNBONDED" | "UNBONDED" => Self::Unbonded,
            "BOND_STATUS_UNBONDING" | "UNBONDING" => Self::Unbonding,
            _ => Self::Unknown,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Bonded)
    }
}

// =============================================================================
// Commission Issues
// =============================================================================

/// A commission-rate compliance problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommissionIssue {
    /// Rate differs from the expected rate by more than the tolerance.
    RateMismatch {
        expected: f64,
        actual: f64,
        difference: f64,
    },
    /// Rate is negative or above 1.
    OutOfRange { actual: f64 },
    /// Rate string could not be parsed.
    Unparseable { raw: String },
}

impl fmt::Display for CommissionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateMismatch {
                expected,
                actual,
                difference,
            } => write!(
                f,
                "commission rate {:.2}% differs from required {:.2}% by {:.4}",
                actual * 100.0,
                expected * 100.0,
                difference
            ),
            Self::OutOfRange { actual } => {
                write!(f, "commission rate {actual} is outside [0, 1]")
            }
            Self::Unparseable { raw } => write!(f, "commission rate '{raw}' is not a number"),
        }
    }
}

// =============================================================================
// Validator Details
// =============================================================================

/// Normalized record for one restricted validator.
///
/// `burn_amount + validator_keeps == total_commission_utac` always holds,
/// and `total_commission_utac` is the burn base: claimed plus unclaimed
/// commission, never delegator-facing rewards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorDetails {
    /// Operator address (unique key).
    pub address: String,
    /// Display name, "Unknown" when the chain has none.
    pub moniker: String,
    pub status: ValidatorStatus,
    /// `status == Bonded`.
    pub is_active: bool,
    pub is_jailed: bool,
    /// Parsed commission rate (0 when unparseable).
    pub commission_rate: f64,

    pub outstanding_rewards_utac: Amount,
    pub unclaimed_commission_utac: Amount,
    pub claimed_commission_utac: Amount,
    pub total_commission_utac: Amount,
    pub total_rewards_utac: Amount,
    pub burn_amount: Amount,
    pub validator_keeps: Amount,

    pub outstanding_rewards_tac: String,
    pub unclaimed_commission_tac: String,
    pub claimed_commission_tac: String,
    pub total_commission_tac: String,
    pub total_rewards_tac: String,
    pub burn_amount_tac: String,
    pub validator_keeps_tac: String,

    /// Compliance issues in evaluation order; empty when compliant.
    pub commission_issues: Vec<CommissionIssue>,
    pub has_rewards: bool,
    pub has_commission: bool,
    pub fetched_at: DateTime<Utc>,
}

impl ValidatorDetails {
    pub fn has_commission_issues(&self) -> bool {
        !self.commission_issues.is_empty()
    }
}
