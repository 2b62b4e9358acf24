//! Port trait for chain data.
//!
//! This trait defines the interface for fetching per-validator staking and
//! distribution data from a Cosmos SDK chain. Implementations live in the
//! infrastructure layer (e.g., `tacburn-cosmos`).

use async_trait::async_trait;

use crate::error::ChainResult;
use crate::models::Period;

/// A `{ denom, amount }` pair as returned by the distribution module.
///
/// `amount` is kept as the raw chain string (often a decimal with 18
/// fractional digits) and cleaned by the unit converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinAmount {
    pub denom: String,
    pub amount: String,
}

impl CoinAmount {
    pub fn new(denom: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

/// Validator metadata from the staking module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValidator {
    /// Operator address.
    pub address: String,
    /// Moniker (`description.moniker`), if set.
    pub moniker: Option<String>,
    /// Bond status string (e.g. `BOND_STATUS_BONDED`).
    pub status: String,
    /// Jailed flag.
    pub jailed: bool,
    /// `commission.commission_rates.rate` as a decimal string.
    pub commission_rate: String,
}

/// Everything needed to process one validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValidatorData {
    pub validator: RawValidator,
    /// Outstanding (delegator-facing) rewards.
    pub outstanding_rewards: Vec<CoinAmount>,
    /// Accumulated, not yet withdrawn commission.
    pub commission: Vec<CoinAmount>,
    /// Commission withdrawn during the period (base units), "0" if unknown.
    pub claimed_commission: String,
}

/// A validator whose chain data could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub address: String,
    pub error: String,
}

/// Partitioned fetch results, both halves in request order.
#[derive(Debug, Clone, Default)]
pub struct FetchResults {
    pub successful: Vec<RawValidatorData>,
    pub failed: Vec<FetchFailure>,
}

impl FetchResults {
    pub fn len(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Port trait for chain data.
#[async_trait]
pub trait ChainDataProvider: Send + Sync {
    /// Network identifier reported by the connected node.
    async fn node_chain_id(&self) -> ChainResult<String>;

    /// Fetch raw data for one validator.
    ///
    /// `period` bounds the claimed-commission history query.
    async fn fetch_validator(&self, address: &str, period: &Period)
    -> ChainResult<RawValidatorData>;
}
