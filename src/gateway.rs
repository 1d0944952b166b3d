//! Upstream data gateway for the UnleashNFTs API.
//!
//! The provider's API surface is only partially documented, so every
//! capability except balance keeps an ordered list of guessed candidate
//! endpoints and walks them until one answers 200. Failures never leave
//! this module: callers always get a well-typed, possibly-empty result.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::config::UnleashConfig;
use crate::types::{NftHolding, WalletBalance};

/// Outcome of a gateway fetch. There is deliberately no error arm:
/// transport and schema failures all degrade to `Empty` before they
/// reach a caller, trading fidelity for availability. Failure detail
/// lives in the log at the failing candidate, not in this type.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayResult<T> {
    Success(T),
    Empty,
}

impl<T> GatewayResult<T> {
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            GatewayResult::Success(v) => v,
            GatewayResult::Empty => default,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, GatewayResult::Empty)
    }
}

/// Where a candidate endpoint expects the wallet address.
#[derive(Debug, Clone, Copy)]
pub enum AddressPlacement {
    /// `?address=0x…` query parameter.
    Query,
    /// Substituted into the `{address}` segment of the path.
    Path,
}

/// One guessed URL path for a capability. Candidates are data so new
/// guesses can be appended without touching the fetch loop.
#[derive(Debug, Clone, Copy)]
pub struct EndpointCandidate {
    pub path: &'static str,
    pub address_in: AddressPlacement,
}

const BALANCE_ENDPOINT: &str = "wallet/balance/token";

const NFT_ENDPOINTS: &[EndpointCandidate] = &[
    EndpointCandidate { path: "wallet/nft", address_in: AddressPlacement::Query },
    EndpointCandidate { path: "wallet/nfts", address_in: AddressPlacement::Query },
    EndpointCandidate { path: "nft/wallet/{address}", address_in: AddressPlacement::Path },
    EndpointCandidate { path: "wallet/{address}/nfts", address_in: AddressPlacement::Path },
];

const TRANSACTION_ENDPOINTS: &[EndpointCandidate] = &[
    EndpointCandidate { path: "wallet/transactions", address_in: AddressPlacement::Query },
    EndpointCandidate { path: "wallet/history", address_in: AddressPlacement::Query },
    EndpointCandidate { path: "transactions/{address}", address_in: AddressPlacement::Path },
    EndpointCandidate { path: "wallet/{address}/transactions", address_in: AddressPlacement::Path },
];

const RISK_ENDPOINTS: &[EndpointCandidate] = &[
    EndpointCandidate { path: "wallet/risk", address_in: AddressPlacement::Query },
    EndpointCandidate { path: "security/{address}", address_in: AddressPlacement::Path },
    EndpointCandidate { path: "wallet/{address}/risk", address_in: AddressPlacement::Path },
];

const WHALE_ENDPOINTS: &[EndpointCandidate] = &[
    EndpointCandidate { path: "wallet/whale", address_in: AddressPlacement::Query },
    EndpointCandidate { path: "analytics/{address}", address_in: AddressPlacement::Path },
    EndpointCandidate { path: "wallet/{address}/analytics", address_in: AddressPlacement::Path },
];

const CONTRACT_ENDPOINTS: &[EndpointCandidate] = &[
    EndpointCandidate { path: "contract/verify", address_in: AddressPlacement::Query },
    EndpointCandidate { path: "security/contract/{address}", address_in: AddressPlacement::Path },
    EndpointCandidate { path: "contract/{address}/verify", address_in: AddressPlacement::Path },
];

/// Normalized NFT holdings for one wallet.
#[derive(Debug, Clone, Serialize)]
pub struct NftHoldings {
    pub nfts: Vec<NftHolding>,
    pub total_count: usize,
    pub address: String,
}

impl NftHoldings {
    pub fn empty(address: &str) -> Self {
        Self {
            nfts: Vec::new(),
            total_count: 0,
            address: address.to_string(),
        }
    }
}

/// Normalized transaction history. Individual transactions stay loose
/// JSON; no candidate endpoint has a confirmed shape yet.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionHistory {
    pub transactions: Vec<Value>,
    pub total_count: usize,
    pub address: String,
}

impl TransactionHistory {
    pub fn empty(address: &str) -> Self {
        Self {
            transactions: Vec::new(),
            total_count: 0,
            address: address.to_string(),
        }
    }
}

/// Result of the connection probe used by the diagnostics endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub status: String,
    pub endpoint: Option<String>,
    pub status_code: Option<u16>,
}

#[derive(Clone)]
pub struct UnleashClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl UnleashClient {
    pub fn new(config: &UnleashConfig) -> Self {
        tracing::debug!(base_url = %config.base_url, "Creating UnleashNFTs client");
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn candidate_url(&self, candidate: &EndpointCandidate, address: &str) -> String {
        match candidate.address_in {
            AddressPlacement::Query => format!("{}/{}", self.base_url, candidate.path),
            AddressPlacement::Path => format!(
                "{}/{}",
                self.base_url,
                candidate.path.replace("{address}", address)
            ),
        }
    }

    /// GET one URL; Some(body) on HTTP 200 with a JSON body, None on any
    /// failure. No retries: a failed candidate is abandoned.
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Option<Value> {
        let response = match self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("x-api-key", &self.api_key)
            .query(query)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Candidate endpoint request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(url = %url, status = %response.status(), "Candidate endpoint returned non-200");
            return None;
        }

        match response.json::<Value>().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Candidate endpoint body was not JSON");
                None
            }
        }
    }

    /// Walk a capability's candidate list in order; first 200 wins.
    async fn try_candidates(
        &self,
        capability: &str,
        candidates: &[EndpointCandidate],
        address: &str,
    ) -> Option<Value> {
        let start = Instant::now();
        for candidate in candidates {
            let url = self.candidate_url(candidate, address);
            let query: Vec<(&str, &str)> = match candidate.address_in {
                AddressPlacement::Query => vec![("address", address)],
                AddressPlacement::Path => Vec::new(),
            };
            tracing::debug!(capability = %capability, url = %url, "Trying candidate endpoint");
            if let Some(body) = self.get_json(&url, &query).await {
                tracing::info!(
                    capability = %capability,
                    url = %url,
                    duration_ms = %start.elapsed().as_millis(),
                    "Candidate endpoint answered"
                );
                return Some(body);
            }
        }
        tracing::warn!(
            capability = %capability,
            duration_ms = %start.elapsed().as_millis(),
            "All candidate endpoints failed"
        );
        None
    }

    /// Fetch token balances. This is the one known-good endpoint, so the
    /// 200 body is validated strictly: a response that does not match the
    /// documented schema is discarded rather than half-read.
    pub async fn wallet_balance(&self, address: &str) -> GatewayResult<WalletBalance> {
        let url = format!("{}/{}", self.base_url, BALANCE_ENDPOINT);
        let query = [("address", address), ("offset", "0"), ("limit", "10")];

        let Some(body) = self.get_json(&url, &query).await else {
            return GatewayResult::Empty;
        };

        match serde_json::from_value::<WalletBalance>(body) {
            Ok(balance) => {
                tracing::info!(
                    wallet = %address,
                    tokens = %balance.token.len(),
                    "Fetched wallet balance"
                );
                GatewayResult::Success(balance)
            }
            Err(e) => {
                tracing::warn!(wallet = %address, error = %e, "Balance response failed schema validation");
                GatewayResult::Empty
            }
        }
    }

    pub async fn nft_holdings(&self, address: &str) -> GatewayResult<NftHoldings> {
        let Some(body) = self.try_candidates("nft", NFT_ENDPOINTS, address).await else {
            return GatewayResult::Empty;
        };

        let items = extract_items(&body, &["nfts", "tokens"]);
        let nfts: Vec<NftHolding> = items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect();
        tracing::info!(wallet = %address, count = %nfts.len(), "Fetched NFT holdings");
        GatewayResult::Success(NftHoldings {
            total_count: nfts.len(),
            nfts,
            address: address.to_string(),
        })
    }

    pub async fn transaction_history(&self, address: &str) -> GatewayResult<TransactionHistory> {
        let Some(body) = self
            .try_candidates("transactions", TRANSACTION_ENDPOINTS, address)
            .await
        else {
            return GatewayResult::Empty;
        };

        let transactions = extract_items(&body, &["transactions"]);
        tracing::info!(wallet = %address, count = %transactions.len(), "Fetched transaction history");
        GatewayResult::Success(TransactionHistory {
            total_count: transactions.len(),
            transactions,
            address: address.to_string(),
        })
    }

    pub async fn risk_score(&self, address: &str) -> GatewayResult<Value> {
        match self.try_candidates("risk", RISK_ENDPOINTS, address).await {
            Some(body) => GatewayResult::Success(body),
            None => GatewayResult::Empty,
        }
    }

    pub async fn whale_analytics(&self, address: &str) -> GatewayResult<Value> {
        match self.try_candidates("whale", WHALE_ENDPOINTS, address).await {
            Some(body) => GatewayResult::Success(body),
            None => GatewayResult::Empty,
        }
    }

    pub async fn contract_verification(&self, address: &str) -> GatewayResult<Value> {
        match self
            .try_candidates("contract", CONTRACT_ENDPOINTS, address)
            .await
        {
            Some(body) => GatewayResult::Success(body),
            None => GatewayResult::Empty,
        }
    }

    /// Probe the provider: report the first endpoint that answers at all.
    pub async fn probe(&self) -> ProbeResult {
        const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
        let attempts = [
            (format!("{}/health", self.base_url), false),
            (format!("{}/status", self.base_url), false),
            (format!("{}/{}", self.base_url, BALANCE_ENDPOINT), true),
        ];

        for (url, with_address) in &attempts {
            let query: &[(&str, &str)] = if *with_address {
                &[("address", ZERO_ADDRESS)]
            } else {
                &[]
            };
            let result = self
                .client
                .get(url)
                .header("Accept", "application/json")
                .header("x-api-key", &self.api_key)
                .query(query)
                .send()
                .await;
            match result {
                Ok(response) => {
                    tracing::info!(url = %url, status = %response.status(), "Probe endpoint answered");
                    return ProbeResult {
                        status: "connected".to_string(),
                        endpoint: Some(url.clone()),
                        status_code: Some(response.status().as_u16()),
                    };
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Probe endpoint failed");
                }
            }
        }

        ProbeResult {
            status: "failed".to_string(),
            endpoint: None,
            status_code: None,
        }
    }
}

/// Pull the item list out of a provider body, tolerating the known shape
/// variants: top-level `data` list, `data` nested under one of `keys`,
/// a top-level key from `keys`, or a bare top-level list.
fn extract_items(body: &Value, keys: &[&str]) -> Vec<Value> {
    if let Some(data) = body.get("data") {
        if let Some(arr) = data.as_array() {
            return arr.clone();
        }
        for key in keys {
            if let Some(arr) = data.get(key).and_then(Value::as_array) {
                return arr.clone();
            }
        }
    }
    for key in keys {
        if let Some(arr) = body.get(key).and_then(Value::as_array) {
            return arr.clone();
        }
    }
    if let Some(arr) = body.as_array() {
        return arr.clone();
    }
    Vec::new()
}

/// Zero-valued risk payload used when every candidate fails.
pub fn default_risk_score() -> Value {
    serde_json::json!({
        "overall_risk_score": 1.0,
        "risk_level": "Low",
        "factors": [
            {
                "name": "API Analysis Unavailable",
                "risk_level": 1,
                "description": "Unable to fetch detailed risk analysis from API"
            }
        ]
    })
}

/// Zero-valued whale payload used when every candidate fails.
pub fn default_whale_analytics() -> Value {
    serde_json::json!({
        "total_value": 0.0,
        "diversity_score": 0,
        "activity_level": "Unknown",
        "is_whale": false
    })
}

/// Zero-valued contract payload used when every candidate fails.
pub fn default_contract_verification() -> Value {
    serde_json::json!({
        "status": "Unknown",
        "verified": false,
        "audit_status": "Not Available"
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_items_handles_data_list() {
        let body = json!({"data": [{"name": "a"}, {"name": "b"}]});
        assert_eq!(extract_items(&body, &["nfts"]).len(), 2);
    }

    #[test]
    fn extract_items_handles_nested_keys() {
        let body = json!({"data": {"nfts": [{"name": "a"}]}});
        assert_eq!(extract_items(&body, &["nfts", "tokens"]).len(), 1);

        let body = json!({"data": {"tokens": [{"name": "a"}, {"name": "b"}]}});
        assert_eq!(extract_items(&body, &["nfts", "tokens"]).len(), 2);
    }

    #[test]
    fn extract_items_handles_top_level_key_and_bare_list() {
        let body = json!({"transactions": [{"hash": "0xabc"}]});
        assert_eq!(extract_items(&body, &["transactions"]).len(), 1);

        let body = json!([{"hash": "0xabc"}, {"hash": "0xdef"}]);
        assert_eq!(extract_items(&body, &["transactions"]).len(), 2);
    }

    #[test]
    fn extract_items_returns_empty_for_unknown_shapes() {
        let body = json!({"unexpected": {"shape": true}});
        assert!(extract_items(&body, &["nfts"]).is_empty());
        assert!(extract_items(&json!(null), &["nfts"]).is_empty());
    }

    #[test]
    fn balance_schema_is_strict() {
        // Missing `pagination` must not produce a half-populated value
        let body = json!({"token": []});
        assert!(serde_json::from_value::<crate::types::WalletBalance>(body).is_err());

        let body = json!({
            "token": [{
                "blockchain": "polygon",
                "chain_id": 137,
                "decimal": 18,
                "quantity": 14500.0,
                "token_address": "0x0000000000000000000000000000000000001010",
                "token_name": "Polygon",
                "token_symbol": "MATIC"
            }],
            "pagination": {"total_items": 1, "offset": 0, "limit": 10, "has_next": false}
        });
        let parsed = serde_json::from_value::<crate::types::WalletBalance>(body).unwrap();
        assert_eq!(parsed.token.len(), 1);
        assert_eq!(parsed.token[0].token_symbol, "MATIC");
    }

    #[test]
    fn nft_items_tolerate_missing_fields() {
        let item = json!({"name": "Cool Cat #1"});
        let nft: NftHolding = serde_json::from_value(item).unwrap();
        assert_eq!(nft.name.as_deref(), Some("Cool Cat #1"));
        assert!(nft.collection_name.is_none());

        // Entirely unknown shape degrades to the default, not an error
        let item = json!("not an object");
        let nft: NftHolding = serde_json::from_value(item).unwrap_or_default();
        assert!(nft.name.is_none());
    }

    #[test]
    fn candidate_urls_place_the_address_correctly() {
        let client = UnleashClient::new(&crate::config::UnleashConfig {
            api_key: "test".into(),
            base_url: "https://api.example.com/api/v1".into(),
            timeout_seconds: 10,
        });
        let addr = "0x9656911585799e7129668a1e79a0C8b43dbB7EA9";

        let query = &NFT_ENDPOINTS[0];
        assert_eq!(
            client.candidate_url(query, addr),
            "https://api.example.com/api/v1/wallet/nft"
        );

        let path = &NFT_ENDPOINTS[2];
        assert_eq!(
            client.candidate_url(path, addr),
            format!("https://api.example.com/api/v1/nft/wallet/{addr}")
        );
    }

    #[test]
    fn default_payloads_are_zero_valued() {
        assert_eq!(default_whale_analytics()["is_whale"], json!(false));
        assert_eq!(default_risk_score()["risk_level"], json!("Low"));
        assert_eq!(default_contract_verification()["verified"], json!(false));
    }

    #[test]
    fn gateway_result_unwraps_to_default_when_empty() {
        let empty: GatewayResult<WalletBalance> = GatewayResult::Empty;
        assert!(empty.is_empty());
        assert!(empty.unwrap_or(WalletBalance::empty()).token.is_empty());
    }
}
