//! Cosmos SDK REST client implementing the chain data port.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace, warn};
use url::Url;

use tacburn_core::error::{ChainError, ChainResult};
use tacburn_core::models::Period;
use tacburn_core::ports::{ChainDataProvider, RawValidatorData};
use tacburn_core::units::{Amount, clean_to_integer};

use crate::types::{
    CommissionResponse, NodeInfoResponse, OutstandingRewardsResponse, TxResponse,
    TxSearchResponse, ValidatorResponse,
};

/// Event emitted by `MsgWithdrawValidatorCommission`.
const WITHDRAW_COMMISSION_EVENT: &str = "withdraw_commission";

/// Configuration for the REST client.
#[derive(Debug, Clone)]
pub struct CosmosClientConfig {
    /// REST endpoint (e.g., "http://localhost:1317").
    pub rest_url: String,
    /// Token denom used for claimed-commission sums.
    pub denom: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries after the first attempt for transient failures.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each further retry.
    pub retry_delay: Duration,
    /// Page size for the tx search.
    pub tx_page_limit: u32,
    /// Upper bound on tx search pages per validator.
    pub max_tx_pages: u32,
}

impl Default for CosmosClientConfig {
    fn default() -> Self {
        Self {
            rest_url: "http://127.0.0.1:1317".to_string(),
            denom: "utac".to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
            tx_page_limit: 100,
            max_tx_pages: 10,
        }
    }
}

/// REST client adapter implementing the ChainDataProvider port.
pub struct CosmosRestClient {
    http: reqwest::Client,
    base: Url,
    config: CosmosClientConfig,
}

impl CosmosRestClient {
    /// Build a client. No request is made until the first query.
    #[instrument(skip_all, fields(url = %config.rest_url))]
    pub fn new(config: CosmosClientConfig) -> ChainResult<Self> {
        let base = Url::parse(&config.rest_url)
            .map_err(|e| ChainError::InvalidUrl(format!("{}: {e}", config.rest_url)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ChainError::InvalidUrl(format!(
                "{}: unsupported scheme '{}'",
                config.rest_url,
                base.scheme()
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChainError::ConnectionFailed(e.to_string()))?;

        debug!("REST client ready");

        Ok(Self { http, base, config })
    }

    fn endpoint(&self, path: &str) -> ChainResult<Url> {
        let joined = format!("{}{}", self.base.as_str().trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|e| ChainError::InvalidUrl(format!("{joined}: {e}")))
    }

    /// GET a JSON document, retrying transient failures with backoff.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ChainResult<T> {
        let mut attempt = 0;
        loop {
            match self.get_once(&url).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.config.max_retries && is_transient(&e) => {
                    let delay = self.config.retry_delay * 2u32.saturating_pow(attempt);
                    warn!(
                        endpoint = url.path(),
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &Url) -> ChainResult<T> {
        trace!(url = %url, "GET");
        let endpoint = url.path().to_string();

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, &endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChainError::HttpStatus {
                status: status.as_u16(),
                endpoint,
                message: body.chars().take(200).collect(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| map_reqwest_error(e, &endpoint))
    }

    /// Commission withdrawn by `address` during `period`, in base units.
    #[instrument(skip(self, period), fields(period = %period))]
    async fn claimed_commission(&self, address: &str, period: &Period) -> ChainResult<Amount> {
        let query = format!("{WITHDRAW_COMMISSION_EVENT}.validator='{address}'");
        let mut claimed = Amount::zero();
        let mut seen = 0usize;
        let mut exhausted = true;

        for page in 1..=self.config.max_tx_pages {
            let mut url = self.endpoint("/cosmos/tx/v1beta1/txs")?;
            url.query_pairs_mut()
                .append_pair("query", &query)
                .append_pair("page", &page.to_string())
                .append_pair("limit", &self.config.tx_page_limit.to_string())
                .append_pair("order_by", "ORDER_BY_DESC");

            let resp: TxSearchResponse = self.get_json(url).await?;
            let count = resp.tx_responses.len();
            seen += count;

            claimed = &claimed
                + &sum_withdrawn_commission(&resp.tx_responses, &self.config.denom, address, period);

            let total = resp.total.as_deref().and_then(|t| t.parse::<usize>().ok());
            let oldest = resp.tx_responses.last().and_then(|tx| tx.timestamp);

            if !has_more_pages(count, self.config.tx_page_limit, seen, total, oldest, period) {
                exhausted = false;
                break;
            }
        }

        if exhausted {
            warn!(
                validator = address,
                pages = self.config.max_tx_pages,
                seen,
                claimed = %claimed,
                "⚠️  Tx search page limit reached, claimed commission may be incomplete"
            );
        }

        debug!(validator = address, claimed = %claimed, "Claimed commission summed");
        Ok(claimed)
    }
}

#[async_trait]
impl ChainDataProvider for CosmosRestClient {
    async fn node_chain_id(&self) -> ChainResult<String> {
        let url = self.endpoint("/cosmos/base/tendermint/v1beta1/node_info")?;
        let info: NodeInfoResponse = self.get_json(url).await?;
        if info.default_node_info.network.is_empty() {
            return Err(ChainError::DecodingError(
                "node_info has no network field".into(),
            ));
        }
        Ok(info.default_node_info.network)
    }

    #[instrument(skip(self, period), fields(period = %period))]
    async fn fetch_validator(
        &self,
        address: &str,
        period: &Period,
    ) -> ChainResult<RawValidatorData> {
        let validator_url = self.endpoint(&format!("/cosmos/staking/v1beta1/validators/{address}"))?;
        let rewards_url = self.endpoint(&format!(
            "/cosmos/distribution/v1beta1/validators/{address}/outstanding_rewards"
        ))?;
        let commission_url = self.endpoint(&format!(
            "/cosmos/distribution/v1beta1/validators/{address}/commission"
        ))?;

        let (validator, rewards, commission) = tokio::try_join!(
            self.get_json::<ValidatorResponse>(validator_url),
            self.get_json::<OutstandingRewardsResponse>(rewards_url),
            self.get_json::<CommissionResponse>(commission_url),
        )?;

        // History may be pruned or the tx index disabled; treat as nothing claimed.
        let claimed = match self.claimed_commission(address, period).await {
            Ok(amount) => amount,
            Err(e) => {
                warn!(validator = address, error = %e, "⚠️  Claimed commission unavailable, using 0");
                Amount::zero()
            }
        };

        Ok(RawValidatorData {
            validator: validator.validator.into_raw(address),
            outstanding_rewards: rewards.rewards.rewards.into_iter().map(Into::into).collect(),
            commission: commission
                .commission
                .commission
                .into_iter()
                .map(Into::into)
                .collect(),
            claimed_commission: claimed.to_string(),
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn map_reqwest_error(e: reqwest::Error, endpoint: &str) -> ChainError {
    if e.is_timeout() {
        ChainError::Timeout(endpoint.to_string())
    } else if e.is_decode() {
        ChainError::DecodingError(format!("{endpoint}: {e}"))
    } else {
        ChainError::ConnectionFailed(format!("{endpoint}: {e}"))
    }
}

/// Whether a retry has a chance of succeeding.
fn is_transient(e: &ChainError) -> bool {
    match e {
        ChainError::ConnectionFailed(_) | ChainError::Timeout(_) => true,
        ChainError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
        ChainError::DecodingError(_) | ChainError::InvalidUrl(_) => false,
    }
}

/// Whether the tx search should fetch another page.
///
/// Results are newest first, so a page whose oldest tx predates the period
/// ends the search. A short page ends it too, even when `total` is absent.
fn has_more_pages(
    count: usize,
    page_limit: u32,
    seen: usize,
    total: Option<usize>,
    oldest: Option<DateTime<Utc>>,
    period: &Period,
) -> bool {
    if count == 0 || count < page_limit as usize {
        return false;
    }
    if total.is_some_and(|total| seen >= total) {
        return false;
    }
    !oldest.is_some_and(|ts| ts < period.start_date())
}

/// Amount of `denom` in a coins string such as `"500utac,20ibc/ABC"`.
fn coins_amount(coins: &str, denom: &str) -> Amount {
    coins
        .split(',')
        .map(str::trim)
        .filter_map(|coin| {
            let split = coin.find(|c: char| !c.is_ascii_digit() && c != '.')?;
            let (amount, coin_denom) = coin.split_at(split);
            (coin_denom == denom).then(|| clean_to_integer(amount))
        })
        .fold(Amount::zero(), |acc, a| &acc + &a)
}

/// Sum `withdraw_commission` amounts for `validator` inside `period`.
///
/// Failed txs and txs without a timestamp are skipped.
fn sum_withdrawn_commission(
    txs: &[TxResponse],
    denom: &str,
    validator: &str,
    period: &Period,
) -> Amount {
    let mut total = Amount::zero();

    for tx in txs {
        if tx.code != 0 {
            continue;
        }
        let Some(ts) = tx.timestamp else {
            trace!(tx = %tx.txhash, "Skipping tx without timestamp");
            continue;
        };
        if !period.contains(ts) {
            continue;
        }

        for event in tx.events.iter().filter(|e| e.kind == WITHDRAW_COMMISSION_EVENT) {
            if let Some(v) = event.attribute("validator")
                && v != validator
            {
                continue;
            }
            if let Some(amount) = event.attribute("amount") {
                total = &total + &coins_amount(amount, denom);
            }
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    const TXS_PATH: &str = "/cosmos/tx/v1beta1/txs";

    fn client_for(server: &ServerGuard, max_retries: u32, page_limit: u32, max_pages: u32) -> CosmosRestClient {
        CosmosRestClient::new(CosmosClientConfig {
            rest_url: server.url(),
            max_retries,
            retry_delay: Duration::from_millis(1),
            tx_page_limit: page_limit,
            max_tx_pages: max_pages,
            ..Default::default()
        })
        .unwrap()
    }

    fn page(n: u32) -> Matcher {
        Matcher::UrlEncoded("page".into(), n.to_string())
    }

    fn txs(value: serde_json::Value) -> Vec<TxResponse> {
        serde_json::from_value::<TxSearchResponse>(value)
            .unwrap()
            .tx_responses
    }

    fn withdraw(hash: &str, ts: &str, validator: &str, amount: &str, code: u32) -> serde_json::Value {
        json!({
            "txhash": hash,
            "code": code,
            "timestamp": ts,
            "events": [
                { "type": "message", "attributes": [{ "key": "action", "value": "withdraw" }] },
                {
                    "type": "withdraw_commission",
                    "attributes": [
                        { "key": "amount", "value": amount },
                        { "key": "validator", "value": validator }
                    ]
                }
            ]
        })
    }

    #[test]
    fn test_coins_amount_selects_denom() {
        assert_eq!(coins_amount("500utac", "utac").to_string(), "500");
        assert_eq!(coins_amount("20ibc/ABC,500utac", "utac").to_string(), "500");
        assert_eq!(coins_amount("20ibc/ABC", "utac").to_string(), "0");
        assert_eq!(coins_amount("", "utac").to_string(), "0");
        assert_eq!(coins_amount("12.9utac", "utac").to_string(), "12");
    }

    #[test]
    fn test_sum_withdrawn_commission_respects_period() {
        let period = Period::parse("2026-09").unwrap();
        let txs = txs(json!({
            "tx_responses": [
                withdraw("A", "2026-09-30T23:59:59Z", "tacvaloper1a", "300utac", 0),
                withdraw("B", "2026-09-01T00:00:00Z", "tacvaloper1a", "200utac", 0),
                withdraw("C", "2026-10-01T00:00:00Z", "tacvaloper1a", "1000utac", 0),
                withdraw("D", "2026-08-31T23:59:59Z", "tacvaloper1a", "1000utac", 0),
            ]
        }));

        let total = sum_withdrawn_commission(&txs, "utac", "tacvaloper1a", &period);
        assert_eq!(total.to_string(), "500");
    }

    #[test]
    fn test_sum_withdrawn_commission_skips_failed_and_foreign() {
        let period = Period::parse("2026-09").unwrap();
        let txs = txs(json!({
            "tx_responses": [
                withdraw("A", "2026-09-10T00:00:00Z", "tacvaloper1a", "100utac", 0),
                withdraw("B", "2026-09-11T00:00:00Z", "tacvaloper1a", "100utac", 5),
                withdraw("C", "2026-09-12T00:00:00Z", "tacvaloper1b", "100utac", 0),
                { "txhash": "D", "events": [] }
            ]
        }));

        let total = sum_withdrawn_commission(&txs, "utac", "tacvaloper1a", &period);
        assert_eq!(total.to_string(), "100");
    }

    #[test]
    fn test_transient_errors() {
        assert!(is_transient(&ChainError::Timeout("/x".into())));
        assert!(is_transient(&ChainError::HttpStatus {
            status: 503,
            endpoint: "/x".into(),
            message: String::new(),
        }));
        assert!(!is_transient(&ChainError::HttpStatus {
            status: 404,
            endpoint: "/x".into(),
            message: String::new(),
        }));
        assert!(!is_transient(&ChainError::DecodingError("bad".into())));
    }

    #[test]
    fn test_endpoint_building() {
        let client = CosmosRestClient::new(CosmosClientConfig {
            rest_url: "https://rest.example.org/api/".into(),
            ..Default::default()
        })
        .unwrap();
        let url = client
            .endpoint("/cosmos/staking/v1beta1/validators/tacvaloper1a")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://rest.example.org/api/cosmos/staking/v1beta1/validators/tacvaloper1a"
        );

        assert!(matches!(
            CosmosRestClient::new(CosmosClientConfig {
                rest_url: "ws://node:26657".into(),
                ..Default::default()
            }),
            Err(ChainError::InvalidUrl(_))
        ));
        assert!(CosmosRestClient::new(CosmosClientConfig {
            rest_url: "not a url".into(),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_has_more_pages_stop_conditions() {
        let period = Period::parse("2026-09").unwrap();
        let inside = Some(Utc.with_ymd_and_hms(2026, 9, 10, 0, 0, 0).unwrap());
        let before = Some(Utc.with_ymd_and_hms(2026, 8, 31, 23, 59, 59).unwrap());

        // Full page, more matches, still inside the period.
        assert!(has_more_pages(2, 2, 2, Some(5), inside, &period));
        assert!(has_more_pages(2, 2, 2, None, None, &period));

        assert!(!has_more_pages(0, 2, 0, Some(5), None, &period));
        assert!(!has_more_pages(1, 2, 3, None, inside, &period));
        assert!(!has_more_pages(2, 2, 4, Some(4), inside, &period));
        assert!(!has_more_pages(2, 2, 2, Some(5), before, &period));
    }

    #[tokio::test]
    async fn test_claimed_commission_follows_pages() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", TXS_PATH)
            .match_query(page(1))
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "tx_responses": [
                        withdraw("A", "2026-09-20T00:00:00Z", "tacvaloper1a", "300utac", 0),
                        withdraw("B", "2026-09-15T00:00:00Z", "tacvaloper1a", "200utac", 0),
                    ],
                    "total": "3"
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", TXS_PATH)
            .match_query(page(2))
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "tx_responses": [
                        withdraw("C", "2026-09-10T00:00:00Z", "tacvaloper1a", "100utac", 0),
                    ],
                    "total": "3"
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        let third = server
            .mock("GET", TXS_PATH)
            .match_query(page(3))
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server, 0, 2, 3);
        let period = Period::parse("2026-09").unwrap();
        let claimed = client.claimed_commission("tacvaloper1a", &period).await.unwrap();

        assert_eq!(claimed.to_string(), "600");
        first.assert_async().await;
        second.assert_async().await;
        third.assert_async().await;
    }

    #[tokio::test]
    async fn test_claimed_commission_stops_at_page_limit() {
        let mut server = Server::new_async().await;
        let txs = server
            .mock("GET", TXS_PATH)
            .match_query(Matcher::Any)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "tx_responses": [
                        withdraw("A", "2026-09-20T00:00:00Z", "tacvaloper1a", "100utac", 0),
                    ],
                    "total": "50"
                })
                .to_string(),
            )
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server, 0, 1, 2);
        let period = Period::parse("2026-09").unwrap();
        let claimed = client.claimed_commission("tacvaloper1a", &period).await.unwrap();

        // Only the pages within the limit are summed.
        assert_eq!(claimed.to_string(), "200");
        txs.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_validator_falls_back_when_tx_search_fails() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/cosmos/staking/v1beta1/validators/tacvaloper1a")
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "validator": {
                        "operator_address": "tacvaloper1a",
                        "status": "BOND_STATUS_BONDED",
                        "description": { "moniker": "Alpha" },
                        "commission": { "commission_rates": { "rate": "0.900000000000000000" } }
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", "/cosmos/distribution/v1beta1/validators/tacvaloper1a/outstanding_rewards")
            .with_header("content-type", "application/json")
            .with_body(
                json!({ "rewards": { "rewards": [{ "denom": "utac", "amount": "1000.5" }] } })
                    .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", "/cosmos/distribution/v1beta1/validators/tacvaloper1a/commission")
            .with_header("content-type", "application/json")
            .with_body(
                json!({ "commission": { "commission": [{ "denom": "utac", "amount": "900" }] } })
                    .to_string(),
            )
            .create_async()
            .await;
        let txs = server
            .mock("GET", TXS_PATH)
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("tx indexing is disabled")
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server, 0, 100, 10);
        let period = Period::parse("2026-09").unwrap();
        let data = client.fetch_validator("tacvaloper1a", &period).await.unwrap();

        assert_eq!(data.claimed_commission, "0");
        assert_eq!(data.validator.moniker.as_deref(), Some("Alpha"));
        assert_eq!(data.outstanding_rewards[0].amount, "1000.5");
        assert_eq!(data.commission[0].amount, "900");
        txs.assert_async().await;
    }

    #[tokio::test]
    async fn test_transient_status_is_retried() {
        let mut server = Server::new_async().await;
        let node_info = server
            .mock("GET", "/cosmos/base/tendermint/v1beta1/node_info")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let client = client_for(&server, 2, 100, 10);
        let err = client.node_chain_id().await.unwrap_err();

        assert!(matches!(err, ChainError::HttpStatus { status: 503, .. }));
        node_info.assert_async().await;
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let mut server = Server::new_async().await;
        let node_info = server
            .mock("GET", "/cosmos/base/tendermint/v1beta1/node_info")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server, 3, 100, 10);
        let err = client.node_chain_id().await.unwrap_err();

        assert!(matches!(err, ChainError::HttpStatus { status: 404, .. }));
        node_info.assert_async().await;
    }
}
