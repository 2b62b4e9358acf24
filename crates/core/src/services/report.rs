//! Burn report service - fetches chain data and assembles reports.
//!
//! Fetching is the only I/O step. Everything after the fan-out
//! ([`build_report`]) is a pure function of the fetched data, the
//! configuration and the clock.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, error, info, instrument, warn};

use crate::config::BurnConfig;
use crate::error::{ReportError, ReportResult};
use crate::metrics::{ReportTimer, record_report_generated};
use crate::models::{BurnReport, Period, ReportSummary, ValidatorDetails};
use crate::ports::{ChainDataProvider, FetchFailure, FetchResults};
use crate::units::{Amount, SUMMARY_PRECISION, format_units};

use super::alerts::AlertEngine;
use super::period::{resolve_period, summarize, validate_period};
use super::processor::{ProcessingMode, ValidatorProcessor};

// =============================================================================
// BurnReportService
// =============================================================================

/// Generates burn reports for the restricted validator set.
///
/// # Flow
///
/// 1. Resolve and gate the period
/// 2. Fetch every restricted validator concurrently
/// 3. Process, aggregate and derive alerts
pub struct BurnReportService<P: ChainDataProvider> {
    config: BurnConfig,
    provider: Arc<P>,
}

impl<P: ChainDataProvider> BurnReportService<P> {
    pub fn new(config: BurnConfig, provider: Arc<P>) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &BurnConfig {
        &self.config
    }

    /// Verify the connected node serves the configured network.
    #[instrument(skip_all, fields(expected = %self.config.chain_id))]
    pub async fn verify_chain_id(&self) -> ReportResult<()> {
        let connected = self.provider.node_chain_id().await?;

        if connected != self.config.chain_id {
            error!(
                connected = %connected,
                expected = %self.config.chain_id,
                "❌ Chain mismatch! Node serves a different network"
            );
            return Err(ReportError::ChainMismatch {
                connected,
                expected: self.config.chain_id.clone(),
            });
        }

        debug!(chain_id = %connected, "Chain id verified");
        Ok(())
    }

    /// Generate a report for `period` (`YYYY-MM`, default current month).
    ///
    /// Only period problems are fatal. Per-validator fetch or processing
    /// failures end up in the report's `errors` list.
    #[instrument(skip(self), fields(validators = self.config.restricted_validators.len()))]
    pub async fn generate(
        &self,
        period: Option<&str>,
        mode: ProcessingMode,
    ) -> ReportResult<BurnReport> {
        let _timer = ReportTimer::new();
        let now = Utc::now();

        let period = resolve_period(period, now)?;
        let warnings = validate_period(&period, now)?;
        for warning in &warnings {
            warn!(period = %period, "⚠️  {warning}");
        }

        let fetched = self.fetch_all(&period).await;
        info!(
            period = %period,
            fetched = fetched.successful.len(),
            failed = fetched.failed.len(),
            "📥 Validator data fetched"
        );

        let report = build_report(&self.config, &period, warnings, &fetched, mode, now);
        record_report_generated();

        info!(
            period = %period,
            validators = report.summary.total_validators,
            errors = report.summary.failed_validators,
            burn = %report.summary.total_burn_amount_tac,
            alerts = report.alerts.len(),
            "🔥 Burn report generated"
        );

        Ok(report)
    }

    /// Fetch all restricted validators concurrently, keeping input order.
    async fn fetch_all(&self, period: &Period) -> FetchResults {
        let fetches = self
            .config
            .restricted_validators
            .iter()
            .map(|address| async move {
                let result = self.provider.fetch_validator(address, period).await;
                (address, result)
            });

        let mut results = FetchResults::default();
        for (address, result) in join_all(fetches).await {
            match result {
                Ok(data) => results.successful.push(data),
                Err(e) => results.failed.push(FetchFailure {
                    address: address.clone(),
                    error: e.to_string(),
                }),
            }
        }
        results
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Assemble a report from already-fetched data.
pub fn build_report(
    config: &BurnConfig,
    period: &Period,
    warnings: Vec<String>,
    fetched: &FetchResults,
    mode: ProcessingMode,
    now: DateTime<Utc>,
) -> BurnReport {
    let processor = ValidatorProcessor::new(config);
    let outcome = processor.process_batch(fetched, mode, now);

    let mut summary = aggregate(&outcome.validators);
    summary.failed_validators = outcome.failures.len();

    let engine = AlertEngine::new(
        config.validator_commission_rate,
        config.large_burn_threshold(),
    );
    let alerts = engine.evaluate(&warnings, &summary, &outcome.validators);

    BurnReport {
        period: summarize(period, now, warnings),
        summary,
        validators: outcome.validators,
        alerts,
        errors: outcome.failures,
        configuration: config.snapshot(),
        generated_at: now,
    }
}

/// Sum totals and count flags, in input order.
fn aggregate(validators: &[ValidatorDetails]) -> ReportSummary {
    let mut total_rewards = Amount::zero();
    let mut total_commission = Amount::zero();
    let mut total_burn = Amount::zero();
    let mut total_keeps = Amount::zero();

    for v in validators {
        total_rewards = &total_rewards + &v.total_rewards_utac;
        // Validators without commission contribute nothing to the burn base.
        if v.has_commission {
            total_commission = &total_commission + &v.total_commission_utac;
            total_burn = &total_burn + &v.burn_amount;
            total_keeps = &total_keeps + &v.validator_keeps;
        }
    }

    let fmt = |a: &Amount| format_units(a, SUMMARY_PRECISION);

    ReportSummary {
        total_validators: validators.len(),
        validators_with_rewards: validators.iter().filter(|v| v.has_rewards).count(),
        validators_with_commission_issues: validators
            .iter()
            .filter(|v| v.has_commission_issues())
            .count(),
        validators_ready_to_burn: validators.iter().filter(|v| v.has_commission).count(),
        failed_validators: 0,

        total_rewards_tac: fmt(&total_rewards),
        total_commission_tac: fmt(&total_commission),
        total_burn_amount_tac: fmt(&total_burn),
        total_validator_keeps_tac: fmt(&total_keeps),

        total_rewards_utac: total_rewards,
        total_commission_utac: total_commission,
        total_burn_amount_utac: total_burn,
        total_validator_keeps_utac: total_keeps,
    }
}
