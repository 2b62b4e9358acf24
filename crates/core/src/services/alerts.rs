//! Operational alerts derived from an aggregated report.

use crate::models::{
    AffectedValidator, Alert, AlertCategory, AlertPriority, AlertType, ReportSummary,
    ValidatorDetails,
};
use crate::units::{Amount, SUMMARY_PRECISION, format_units};

/// Evaluates alert rules over aggregated results.
///
/// Rules run in a fixed order and are independent; several may fire.
#[derive(Debug, Clone)]
pub struct AlertEngine {
    expected_commission_rate: f64,
    large_burn_threshold: Amount,
}

impl AlertEngine {
    pub fn new(expected_commission_rate: f64, large_burn_threshold: Amount) -> Self {
        Self {
            expected_commission_rate,
            large_burn_threshold,
        }
    }

    pub fn evaluate(
        &self,
        period_warnings: &[String],
        summary: &ReportSummary,
        validators: &[ValidatorDetails],
    ) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for warning in period_warnings {
            alerts.push(Alert {
                alert_type: AlertType::Warning,
                category: AlertCategory::Period,
                message: warning.clone(),
                details: None,
                priority: AlertPriority::Medium,
                action: None,
                validators: vec![],
            });
        }

        if summary.validators_with_commission_issues > 0 {
            let affected: Vec<AffectedValidator> = validators
                .iter()
                .filter(|v| v.has_commission_issues())
                .map(|v| AffectedValidator {
                    address: v.address.clone(),
                    moniker: v.moniker.clone(),
                    current_rate: v.commission_rate,
                })
                .collect();

            alerts.push(Alert {
                alert_type: AlertType::Critical,
                category: AlertCategory::Commission,
                message: format!(
                    "{} validator(s) not charging the required {:.0}% commission",
                    summary.validators_with_commission_issues,
                    self.expected_commission_rate * 100.0
                ),
                details: Some(
                    "Restricted validators must keep their commission at the policy rate \
                     for the burn split to apply to all delegator rewards"
                        .into(),
                ),
                priority: AlertPriority::High,
                action: Some(format!(
                    "Contact the affected validators to set their commission rate to {:.0}%",
                    self.expected_commission_rate * 100.0
                )),
                validators: affected,
            });
        }

        let without_rewards = summary
            .total_validators
            .saturating_sub(summary.validators_with_rewards);
        if without_rewards > 0 {
            alerts.push(Alert {
                alert_type: AlertType::Info,
                category: AlertCategory::Rewards,
                message: format!("{without_rewards} validator(s) have no outstanding rewards"),
                details: Some("Inactive or newly bonded validators may not have accrued rewards yet".into()),
                priority: AlertPriority::Low,
                action: None,
                validators: vec![],
            });
        }

        if summary.total_burn_amount_utac > self.large_burn_threshold {
            alerts.push(Alert {
                alert_type: AlertType::Warning,
                category: AlertCategory::Amount,
                message: format!(
                    "Large burn amount: {} TAC",
                    summary.total_burn_amount_tac
                ),
                details: Some(format!(
                    "Aggregate burn exceeds the review threshold of {} TAC",
                    format_units(&self.large_burn_threshold, SUMMARY_PRECISION)
                )),
                priority: AlertPriority::Medium,
                action: Some("Double-check the figures before executing the burn transaction".into()),
                validators: vec![],
            });
        }

        alerts
    }
}
