//! Aggregate burn report and alerts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::units::Amount;

use super::period::PeriodSummary;
use super::validator::ValidatorDetails;

// =============================================================================
// Alerts
// =============================================================================

/// Severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Critical,
    Warning,
    Info,
}

/// Area an alert refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCategory {
    Period,
    Commission,
    Rewards,
    Amount,
}

/// Handling priority (lower is more urgent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    High,
    Medium,
    Low,
}

/// Validator referenced by an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedValidator {
    pub address: String,
    pub moniker: String,
    pub current_rate: f64,
}

/// Operational alert derived from a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub category: AlertCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub priority: AlertPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<AffectedValidator>,
}

// =============================================================================
// Failures
// =============================================================================

/// Stage at which a validator dropped out of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Chain data could not be fetched.
    Fetch,
    /// Data was fetched but could not be processed.
    Processing,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Processing => "processing",
        }
    }
}

/// A validator excluded from aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorFailure {
    pub address: String,
    pub kind: FailureKind,
    pub error: String,
}

// =============================================================================
// Report
// =============================================================================

/// Totals and counts across the processed validator set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_validators: usize,
    pub validators_with_rewards: usize,
    pub validators_with_commission_issues: usize,
    pub validators_ready_to_burn: usize,
    pub failed_validators: usize,

    pub total_rewards_utac: Amount,
    pub total_commission_utac: Amount,
    pub total_burn_amount_utac: Amount,
    pub total_validator_keeps_utac: Amount,

    pub total_rewards_tac: String,
    pub total_commission_tac: String,
    pub total_burn_amount_tac: String,
    pub total_validator_keeps_tac: String,
}

/// Configuration values the report was computed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationSnapshot {
    pub burn_rate: f64,
    pub expected_commission_rate: f64,
    pub burn_address: String,
    pub chain_id: String,
    pub token_denom: String,
}

/// Full burn report for one period.
///
/// Built once per calculation and never mutated afterwards. `validators`
/// keeps the order in which raw data was supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnReport {
    pub period: PeriodSummary,
    pub summary: ReportSummary,
    pub validators: Vec<ValidatorDetails>,
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub errors: Vec<ValidatorFailure>,
    pub configuration: ConfigurationSnapshot,
    pub generated_at: DateTime<Utc>,
}

impl BurnReport {
    /// Validators with the largest burn amounts, as a sorted copy.
    ///
    /// Ties are broken by address so the result is deterministic.
    pub fn top_burns(&self, limit: usize) -> Vec<&ValidatorDetails> {
        let mut sorted: Vec<&ValidatorDetails> = self.validators.iter().collect();
        sorted.sort_by(|a, b| {
            b.burn_amount
                .cmp(&a.burn_amount)
                .then_with(|| a.address.cmp(&b.address))
        });
        sorted.truncate(limit);
        sorted
    }

    pub fn has_critical_alerts(&self) -> bool {
        self.alerts
            .iter()
            .any(|a| a.alert_type == AlertType::Critical)
    }
}
