use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use std::time::Instant;

use super::dto::*;
use crate::chat::ResponseDocument;
use crate::error::{AppError, AppResult};
use crate::gateway::{
    default_contract_verification, default_risk_score, default_whale_analytics, GatewayResult,
    NftHoldings, TransactionHistory,
};
use crate::types::{WalletAddress, WalletBalance};
use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    fn provider_status(configured: bool) -> String {
        if configured {
            "configured".to_string()
        } else {
            "missing-key".to_string()
        }
    }

    tracing::info!(model = %state.config.groq.model, "Processing health check request");
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data_provider: provider_status(state.chat.gateway().has_api_key()),
        completion_provider: provider_status(state.chat.completion().has_api_key()),
    })
}

/// The conversational entry point. Always answers 200 with a document;
/// error paths inside `respond` render the uniform error template.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ResponseDocument> {
    let start = Instant::now();
    tracing::info!(chars = %request.message.len(), "Processing chat message");

    let document = state.chat.respond(&request.message).await;

    tracing::info!(
        duration_ms = %start.elapsed().as_millis(),
        html_chars = %document.html.len(),
        "Chat response generated"
    );
    Json(document)
}

fn parse_wallet(wallet: &str) -> AppResult<WalletAddress> {
    WalletAddress::parse(wallet).ok_or_else(|| AppError::InvalidWallet(wallet.to_string()))
}

pub async fn get_wallet_balance(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> AppResult<Json<WalletBalance>> {
    let address = parse_wallet(&wallet)?;
    let balance = state
        .chat
        .gateway()
        .wallet_balance(address.as_str())
        .await
        .unwrap_or(WalletBalance::empty());
    Ok(Json(balance))
}

pub async fn get_wallet_nfts(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> AppResult<Json<NftHoldings>> {
    let address = parse_wallet(&wallet)?;
    let holdings = state
        .chat
        .gateway()
        .nft_holdings(address.as_str())
        .await
        .unwrap_or(NftHoldings::empty(address.as_str()));
    Ok(Json(holdings))
}

pub async fn get_wallet_transactions(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> AppResult<Json<TransactionHistory>> {
    let address = parse_wallet(&wallet)?;
    let history = state
        .chat
        .gateway()
        .transaction_history(address.as_str())
        .await
        .unwrap_or(TransactionHistory::empty(address.as_str()));
    Ok(Json(history))
}

pub async fn get_wallet_risk(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> AppResult<Json<Value>> {
    let address = parse_wallet(&wallet)?;
    let score = state
        .chat
        .gateway()
        .risk_score(address.as_str())
        .await
        .unwrap_or(default_risk_score());
    Ok(Json(score))
}

pub async fn get_wallet_whale(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> AppResult<Json<Value>> {
    let address = parse_wallet(&wallet)?;
    let analytics = state
        .chat
        .gateway()
        .whale_analytics(address.as_str())
        .await
        .unwrap_or(default_whale_analytics());
    Ok(Json(analytics))
}

pub async fn get_wallet_contract(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> AppResult<Json<Value>> {
    let address = parse_wallet(&wallet)?;
    let verification = state
        .chat
        .gateway()
        .contract_verification(address.as_str())
        .await
        .unwrap_or(default_contract_verification());
    Ok(Json(verification))
}

/// Diagnostics: probe the provider and exercise the balance and NFT
/// capabilities for one wallet.
pub async fn debug_api(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> AppResult<Json<Value>> {
    let address = parse_wallet(&wallet)?;
    let gateway = state.chat.gateway();

    let probe = gateway.probe().await;

    let balance_summary = match gateway.wallet_balance(address.as_str()).await {
        GatewayResult::Success(b) => json!({
            "status": "success",
            "token_count": b.token.len()
        }),
        GatewayResult::Empty => json!({"status": "empty"}),
    };

    let nft_summary = match gateway.nft_holdings(address.as_str()).await {
        GatewayResult::Success(h) => json!({
            "status": "success",
            "count": h.total_count
        }),
        GatewayResult::Empty => json!({"status": "empty"}),
    };

    Ok(Json(json!({
        "wallet_address": address.as_str(),
        "api_connection": probe,
        "wallet_balance": balance_summary,
        "nft_holdings": nft_summary,
        "api_key_configured": gateway.has_api_key(),
    })))
}
