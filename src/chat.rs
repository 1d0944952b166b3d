//! Chat orchestrator: extraction, intent routing, data fetch, formatting.
//!
//! `respond` never fails. Every internal error resolves to the uniform
//! error document, so the HTTP layer always has a document to return.

use serde::Serialize;

use crate::completion::CompletionClient;
use crate::gateway::{NftHoldings, UnleashClient};
use crate::render;
use crate::types::{extract_wallet_address, Intent, WalletAddress, WalletBalance};

/// The formatted reply for one chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseDocument {
    pub html: String,
}

#[derive(Clone)]
pub struct ChatService {
    gateway: UnleashClient,
    completion: CompletionClient,
}

impl ChatService {
    pub fn new(gateway: UnleashClient, completion: CompletionClient) -> Self {
        Self { gateway, completion }
    }

    pub fn gateway(&self) -> &UnleashClient {
        &self.gateway
    }

    pub fn completion(&self) -> &CompletionClient {
        &self.completion
    }

    /// Sole entry point: one inbound message, one outbound document.
    pub async fn respond(&self, message: &str) -> ResponseDocument {
        let address = extract_wallet_address(message).and_then(WalletAddress::parse);

        let html = match address {
            Some(address) => self.handle_wallet_query(message, &address).await,
            None => self.handle_general_query(message).await,
        };

        ResponseDocument { html }
    }

    async fn handle_wallet_query(&self, message: &str, address: &WalletAddress) -> String {
        let intent = Intent::classify(message);
        tracing::info!(wallet = %address, intent = %intent, "Routing wallet query");

        match intent {
            Intent::TokenAnalysis => {
                // Gateway failures degrade to an empty balance, so this
                // always renders a well-formed document
                let balance = self
                    .gateway
                    .wallet_balance(address.as_str())
                    .await
                    .unwrap_or(WalletBalance::empty());
                render::wallet_analysis(address, &balance)
            }
            Intent::NftAnalysis => {
                let holdings = self
                    .gateway
                    .nft_holdings(address.as_str())
                    .await
                    .unwrap_or(NftHoldings::empty(address.as_str()));
                render::nft_holdings(address, &holdings)
            }
            // The remaining intents render placeholder documents and do
            // not consult the gateway (known capability gap)
            Intent::TransactionHistory => render::transaction_history(address, 0),
            Intent::RiskAssessment => render::risk_assessment(address),
            Intent::WhaleAnalysis => render::whale_analysis(address),
            Intent::ContractVerification => render::contract_verification(address),
        }
    }

    async fn handle_general_query(&self, message: &str) -> String {
        match self.completion.complete(message).await {
            Ok(content) => render::general_response(&content),
            Err(e) => {
                tracing::error!(error = %e, "General query failed");
                render::error_document("Failed to process your request", &e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GroqConfig, UnleashConfig};

    const ADDR: &str = "0x9656911585799e7129668a1e79a0C8b43dbB7EA9";

    /// Service pointed at a loopback port with no listener: every
    /// outbound call fails fast with connection refused.
    fn unreachable_service() -> ChatService {
        let gateway = UnleashClient::new(&UnleashConfig {
            api_key: "test-key".into(),
            base_url: "http://127.0.0.1:9/api/v1".into(),
            timeout_seconds: 1,
        });
        let completion = CompletionClient::new(&GroqConfig {
            api_key: "test-key".into(),
            base_url: "http://127.0.0.1:9/openai/v1".into(),
            model: "llama3-70b-8192".into(),
            timeout_seconds: 1,
        });
        ChatService::new(gateway, completion)
    }

    #[tokio::test]
    async fn failed_balance_fetch_still_yields_zero_token_document() {
        let doc = unreachable_service()
            .respond(&format!("Show all tokens for {}", ADDR))
            .await;
        assert!(doc.html.contains("Wallet Analysis"));
        assert!(doc.html.contains("No tokens found in this wallet."));
        assert!(doc.html.contains(ADDR));
    }

    #[tokio::test]
    async fn failed_nft_fetch_renders_empty_holdings() {
        let doc = unreachable_service()
            .respond(&format!("Show NFT collection for {}", ADDR))
            .await;
        assert!(doc.html.contains("No NFTs found in this wallet"));
    }

    #[tokio::test]
    async fn placeholder_intents_skip_the_gateway() {
        let service = unreachable_service();
        let history = service.respond(&format!("tx history for {}", ADDR)).await;
        assert!(history.html.contains("Transaction History"));

        let risk = service.respond(&format!("check risks for {}", ADDR)).await;
        assert!(risk.html.contains("Security Risk Assessment"));

        let whale = service.respond(&format!("whale status of {}", ADDR)).await;
        assert!(whale.html.contains("Whale Wallet Analysis"));

        let contract = service.respond(&format!("verify {}", ADDR)).await;
        assert!(contract.html.contains("Contract Verification"));
    }

    #[tokio::test]
    async fn addressless_message_routes_to_completion_provider() {
        // The provider is unreachable, so this exercises the
        // completion-failure path: a uniform error document, no panic
        let doc = unreachable_service().respond("hello").await;
        assert!(doc.html.contains("Failed to process your request"));
        assert!(doc.html.contains("valid Ethereum wallet address"));
    }

    #[tokio::test]
    async fn malformed_address_routes_to_general_path() {
        // 39 hex digits: extraction finds nothing, so this is a general
        // query, not a wallet query
        let doc = unreachable_service()
            .respond("analyze 0x965691158579e7129668a1e79a0C8b43dbB7EA")
            .await;
        assert!(doc.html.contains("Failed to process your request"));
    }
}
