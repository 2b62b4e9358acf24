//! Response shapes of the Cosmos SDK REST (gRPC-gateway) endpoints.
//!
//! Only the fields the burn engine reads are modelled. Everything is
//! `#[serde(default)]` because gateway versions differ in what they omit.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use tacburn_core::ports::{CoinAmount, RawValidator};

// =============================================================================
// Node info
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct NodeInfoResponse {
    pub default_node_info: DefaultNodeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DefaultNodeInfo {
    pub network: String,
}

// =============================================================================
// Staking
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct ValidatorResponse {
    pub validator: ValidatorInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ValidatorInfo {
    pub operator_address: String,
    pub jailed: bool,
    pub status: String,
    pub description: Description,
    pub commission: Commission,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Description {
    pub moniker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Commission {
    pub commission_rates: CommissionRates,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CommissionRates {
    pub rate: String,
}

impl ValidatorInfo {
    pub fn into_raw(self, requested: &str) -> RawValidator {
        let address = if self.operator_address.is_empty() {
            requested.to_string()
        } else {
            self.operator_address
        };

        RawValidator {
            address,
            moniker: self.description.moniker,
            status: self.status,
            jailed: self.jailed,
            commission_rate: self.commission.commission_rates.rate,
        }
    }
}

// =============================================================================
// Distribution
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DecCoin {
    pub denom: String,
    pub amount: String,
}

impl From<DecCoin> for CoinAmount {
    fn from(coin: DecCoin) -> Self {
        CoinAmount::new(coin.denom, coin.amount)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct OutstandingRewardsResponse {
    pub rewards: DecCoins,
}

/// `{ "rewards": [...] }` wrapper used by outstanding rewards.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DecCoins {
    pub rewards: Vec<DecCoin>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CommissionResponse {
    pub commission: ValidatorCommission,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ValidatorCommission {
    pub commission: Vec<DecCoin>,
}

// =============================================================================
// Tx search
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct TxSearchResponse {
    pub tx_responses: Vec<TxResponse>,
    /// Total matches, as a decimal string.
    pub total: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct TxResponse {
    pub txhash: String,
    pub code: u32,
    pub timestamp: Option<DateTime<Utc>>,
    pub events: Vec<TxEvent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct TxEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: Vec<EventAttribute>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct EventAttribute {
    pub key: String,
    pub value: String,
}

impl TxEvent {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validator_response_maps_to_raw() {
        let body = json!({
            "validator": {
                "operator_address": "tacvaloper1abc",
                "jailed": false,
                "status": "BOND_STATUS_BONDED",
                "description": { "moniker": "Alpha", "website": "" },
                "commission": {
                    "commission_rates": {
                        "rate": "0.900000000000000000",
                        "max_rate": "1.000000000000000000"
                    },
                    "update_time": "2024-01-01T00:00:00Z"
                },
                "tokens": "1000"
            }
        });

        let resp: ValidatorResponse = serde_json::from_value(body).unwrap();
        let raw = resp.validator.into_raw("tacvaloper1abc");
        assert_eq!(raw.address, "tacvaloper1abc");
        assert_eq!(raw.moniker.as_deref(), Some("Alpha"));
        assert_eq!(raw.status, "BOND_STATUS_BONDED");
        assert_eq!(raw.commission_rate, "0.900000000000000000");
    }

    #[test]
    fn test_distribution_responses() {
        let rewards: OutstandingRewardsResponse = serde_json::from_value(json!({
            "rewards": { "rewards": [{ "denom": "utac", "amount": "12.5" }] }
        }))
        .unwrap();
        assert_eq!(rewards.rewards.rewards[0].amount, "12.5");

        let commission: CommissionResponse = serde_json::from_value(json!({
            "commission": { "commission": [] }
        }))
        .unwrap();
        assert!(commission.commission.commission.is_empty());

        // Missing wrapper degrades to empty.
        let empty: OutstandingRewardsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.rewards.rewards.is_empty());
    }

    #[test]
    fn test_tx_response_parsing() {
        let body = json!({
            "txs": [],
            "tx_responses": [{
                "height": "100",
                "txhash": "ABC",
                "code": 0,
                "timestamp": "2026-09-15T10:00:00Z",
                "events": [{
                    "type": "withdraw_commission",
                    "attributes": [
                        { "key": "amount", "value": "500utac", "index": true },
                        { "key": "validator", "value": "tacvaloper1abc", "index": true }
                    ]
                }]
            }],
            "pagination": null,
            "total": "1"
        });

        let resp: TxSearchResponse = serde_json::from_value(body).unwrap();
        assert_eq!(resp.total.as_deref(), Some("1"));
        let event = &resp.tx_responses[0].events[0];
        assert_eq!(event.kind, "withdraw_commission");
        assert_eq!(event.attribute("amount"), Some("500utac"));
        assert_eq!(event.attribute("missing"), None);
    }
}
