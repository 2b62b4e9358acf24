//! Per-validator record processing and the batch driver.
//!
//! The processor is pure: it turns [`RawValidatorData`] into a
//! [`ValidatorDetails`] record without I/O, so batches can be processed in
//! any order or in parallel and still give identical records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::BurnConfig;
use crate::error::{ProcessingError, ProcessingResult};
use crate::metrics::{record_commission_issues, record_validator_error, record_validator_processed};
use crate::models::{
    CommissionIssue, FailureKind, ValidatorDetails, ValidatorFailure, ValidatorStatus,
};
use crate::ports::{CoinAmount, FetchResults, RawValidatorData};
use crate::units::{Amount, DEFAULT_PRECISION, clean_to_integer, format_units};

use super::split::split;

/// How commission-rate violations are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// A violation fails the validator's record.
    Strict,
    /// A violation is recorded in `commission_issues` and processing continues.
    #[default]
    Lenient,
}

/// Records that made it through processing plus the ones that did not.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Processed records, in input order.
    pub validators: Vec<ValidatorDetails>,
    /// Fetch failures first, then processing failures, each in input order.
    pub failures: Vec<ValidatorFailure>,
}

/// Turns raw chain data into validator records.
#[derive(Debug, Clone)]
pub struct ValidatorProcessor {
    burn_rate: f64,
    expected_rate: f64,
    tolerance: f64,
    denom: String,
}

impl ValidatorProcessor {
    pub fn new(config: &BurnConfig) -> Self {
        Self {
            burn_rate: config.burn_rate,
            expected_rate: config.validator_commission_rate,
            tolerance: config.commission_tolerance,
            denom: config.token_denom.clone(),
        }
    }

    /// Parse a commission rate and list its compliance issues.
    ///
    /// Mismatch is reported before out-of-range. An unparseable rate is
    /// reported alone and treated as 0.
    pub fn check_commission_rate(&self, raw: &str) -> (f64, Vec<CommissionIssue>) {
        let rate = match raw.trim().parse::<f64>() {
            Ok(rate) if rate.is_finite() => rate,
            _ => {
                return (
                    0.0,
                    vec![CommissionIssue::Unparseable {
                        raw: raw.to_string(),
                    }],
                );
            }
        };

        let mut issues = Vec::new();

        let difference = (rate - self.expected_rate).abs();
        if difference > self.tolerance {
            issues.push(CommissionIssue::RateMismatch {
                expected: self.expected_rate,
                actual: rate,
                difference,
            });
        }

        if !(0.0..=1.0).contains(&rate) {
            issues.push(CommissionIssue::OutOfRange { actual: rate });
        }

        (rate, issues)
    }

    /// Amount of the configured denom in a coin list; other denoms are ignored.
    fn select_denom(&self, coins: &[CoinAmount]) -> Amount {
        coins
            .iter()
            .find(|coin| coin.denom == self.denom)
            .map(|coin| clean_to_integer(&coin.amount))
            .unwrap_or_default()
    }

    /// Process one validator.
    ///
    /// In [`ProcessingMode::Strict`] any commission issue fails the record;
    /// in [`ProcessingMode::Lenient`] issues are attached to it.
    pub fn process(
        &self,
        raw: &RawValidatorData,
        mode: ProcessingMode,
        fetched_at: DateTime<Utc>,
    ) -> ProcessingResult<ValidatorDetails> {
        let meta = &raw.validator;
        let address = meta.address.trim();
        if address.is_empty() {
            return Err(ProcessingError::InvalidRecord(
                "validator address is empty".into(),
            ));
        }

        let (commission_rate, commission_issues) = self.check_commission_rate(&meta.commission_rate);
        if !commission_issues.is_empty() {
            record_commission_issues(commission_issues.len() as u64);
            if mode == ProcessingMode::Strict {
                let details = commission_issues
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(ProcessingError::CommissionViolation {
                    address: address.to_string(),
                    details,
                    issues: commission_issues,
                });
            }
        }

        let outstanding_rewards = self.select_denom(&raw.outstanding_rewards);
        let unclaimed_commission = self.select_denom(&raw.commission);
        let claimed_commission = clean_to_integer(&raw.claimed_commission);

        // Burn base is commission only; outstanding rewards belong to delegators.
        let total_commission = &unclaimed_commission + &claimed_commission;
        let total_rewards = &outstanding_rewards + &total_commission;
        let burn_split = split(&total_commission, self.burn_rate);

        let status = ValidatorStatus::from_chain(&meta.status);
        let moniker = meta
            .moniker
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or("Unknown")
            .to_string();

        let fmt = |a: &Amount| format_units(a, DEFAULT_PRECISION);

        Ok(ValidatorDetails {
            address: address.to_string(),
            moniker,
            status,
            is_active: status.is_active(),
            is_jailed: meta.jailed,
            commission_rate,

            outstanding_rewards_tac: fmt(&outstanding_rewards),
            unclaimed_commission_tac: fmt(&unclaimed_commission),
            claimed_commission_tac: fmt(&claimed_commission),
            total_commission_tac: fmt(&total_commission),
            total_rewards_tac: fmt(&total_rewards),
            burn_amount_tac: fmt(&burn_split.burn),
            validator_keeps_tac: fmt(&burn_split.keep),

            has_rewards: !outstanding_rewards.is_zero(),
            has_commission: !total_commission.is_zero(),

            outstanding_rewards_utac: outstanding_rewards,
            unclaimed_commission_utac: unclaimed_commission,
            claimed_commission_utac: claimed_commission,
            total_commission_utac: total_commission,
            total_rewards_utac: total_rewards,
            burn_amount: burn_split.burn,
            validator_keeps: burn_split.keep,

            commission_issues,
            fetched_at,
        })
    }

    /// Process a whole fetch, isolating failures per validator.
    ///
    /// Fetch failures and processing failures are both recorded against the
    /// validator's address; neither aborts the batch.
    pub fn process_batch(
        &self,
        results: &FetchResults,
        mode: ProcessingMode,
        fetched_at: DateTime<Utc>,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            validators: Vec::with_capacity(results.successful.len()),
            failures: Vec::with_capacity(results.failed.len()),
        };

        for failed in &results.failed {
            warn!(validator = %failed.address, error = %failed.error, "⚠️  Validator fetch failed");
            record_validator_error(FailureKind::Fetch);
            outcome.failures.push(ValidatorFailure {
                address: failed.address.clone(),
                kind: FailureKind::Fetch,
                error: failed.error.clone(),
            });
        }

        for raw in &results.successful {
            match self.process(raw, mode, fetched_at) {
                Ok(details) => {
                    debug!(
                        validator = %details.address,
                        burn = %details.burn_amount,
                        issues = details.commission_issues.len(),
                        "Validator processed"
                    );
                    record_validator_processed();
                    outcome.validators.push(details);
                }
                Err(e) => {
                    warn!(validator = %raw.validator.address, error = %e, "⚠️  Validator processing failed");
                    record_validator_error(FailureKind::Processing);
                    outcome.failures.push(ValidatorFailure {
                        address: raw.validator.address.clone(),
                        kind: FailureKind::Processing,
                        error: e.to_string(),
                    });
                }
            }
        }

        outcome
    }
}
