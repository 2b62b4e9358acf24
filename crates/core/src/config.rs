//! Burn policy configuration.
//!
//! Values are supplied by the binary (CLI flags / environment). The core
//! only validates invariants and snapshots the values into each report.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::ConfigurationSnapshot;
use crate::units::{Amount, TOKEN_DECIMALS, to_base_units};

/// Default share of commission that is burned.
pub const DEFAULT_BURN_RATE: f64 = 0.8;
/// Commission rate restricted validators must charge.
pub const DEFAULT_COMMISSION_RATE: f64 = 0.9;
/// Default share of commission the validator keeps (`1 - DEFAULT_BURN_RATE`).
pub const DEFAULT_KEEP_RATE: f64 = 0.2;
/// Absolute tolerance for commission-rate compliance.
pub const DEFAULT_COMMISSION_TOLERANCE: f64 = 0.001;
/// Aggregate burn (display units) above which a warning is raised.
pub const DEFAULT_LARGE_BURN_THRESHOLD_TAC: &str = "100";

const KEEP_RATE_TOLERANCE: f64 = 1e-9;

/// Configuration consumed by the burn engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BurnConfig {
    pub burn_rate: f64,
    pub validator_commission_rate: f64,
    pub validator_keep_rate: f64,
    pub commission_tolerance: f64,
    pub token_denom: String,
    pub token_decimals: u32,
    /// Operator addresses subject to the burn policy, in report order.
    pub restricted_validators: Vec<String>,
    pub burn_address: String,
    pub chain_id: String,
    pub large_burn_threshold_tac: String,
}

impl Default for BurnConfig {
    fn default() -> Self {
        Self {
            burn_rate: DEFAULT_BURN_RATE,
            validator_commission_rate: DEFAULT_COMMISSION_RATE,
            validator_keep_rate: DEFAULT_KEEP_RATE,
            commission_tolerance: DEFAULT_COMMISSION_TOLERANCE,
            token_denom: "utac".to_string(),
            token_decimals: TOKEN_DECIMALS,
            restricted_validators: Vec::new(),
            burn_address: String::new(),
            chain_id: String::new(),
            large_burn_threshold_tac: DEFAULT_LARGE_BURN_THRESHOLD_TAC.to_string(),
        }
    }
}

impl BurnConfig {
    /// Check configuration invariants.
    ///
    /// The keep rate must complement the burn rate, every rate must lie in
    /// `[0, 1]`, and the token must have 18 decimals.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("burn_rate", self.burn_rate),
            ("validator_commission_rate", self.validator_commission_rate),
            ("validator_keep_rate", self.validator_keep_rate),
            ("commission_tolerance", self.commission_tolerance),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RateOutOfRange { name, value });
            }
        }

        if (self.validator_keep_rate - (1.0 - self.burn_rate)).abs() > KEEP_RATE_TOLERANCE {
            return Err(ConfigError::KeepRateMismatch {
                burn: self.burn_rate,
                keep: self.validator_keep_rate,
            });
        }

        if self.token_decimals != TOKEN_DECIMALS {
            return Err(ConfigError::UnsupportedDecimals(self.token_decimals));
        }

        if self.token_denom.trim().is_empty() {
            return Err(ConfigError::Invalid("token_denom must not be empty".into()));
        }

        if self.restricted_validators.is_empty() {
            return Err(ConfigError::NoValidators);
        }

        if let Some(empty) = self.restricted_validators.iter().position(|a| a.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "restricted validator #{} has an empty address",
                empty + 1
            )));
        }

        Ok(())
    }

    /// Large-burn threshold in base units.
    pub fn large_burn_threshold(&self) -> Amount {
        to_base_units(&self.large_burn_threshold_tac)
    }

    /// Audit snapshot embedded in reports.
    pub fn snapshot(&self) -> ConfigurationSnapshot {
        ConfigurationSnapshot {
            burn_rate: self.burn_rate,
            expected_commission_rate: self.validator_commission_rate,
            burn_address: self.burn_address.clone(),
            chain_id: self.chain_id.clone(),
            token_denom: self.token_denom.clone(),
        }
    }
}
