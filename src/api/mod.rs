pub mod dto;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Conversational entry point
        .route("/chat", post(handlers::chat))
        // Per-capability data endpoints
        .route("/api/v1/wallet/{wallet}/balance", get(handlers::get_wallet_balance))
        .route("/api/v1/wallet/{wallet}/nfts", get(handlers::get_wallet_nfts))
        .route("/api/v1/wallet/{wallet}/transactions", get(handlers::get_wallet_transactions))
        .route("/api/v1/wallet/{wallet}/risk", get(handlers::get_wallet_risk))
        .route("/api/v1/wallet/{wallet}/whale", get(handlers::get_wallet_whale))
        .route("/api/v1/wallet/{wallet}/contract", get(handlers::get_wallet_contract))
        // Diagnostics
        .route("/debug/api/{wallet}", get(handlers::debug_api))
}
