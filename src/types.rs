use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

fn address_search_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"0x[a-fA-F0-9]{40}").expect("address regex must compile"))
}

fn address_exact_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("address regex must compile"))
}

/// Find the first EVM-style address embedded in free text.
/// Only the first match is used; messages carrying several addresses are
/// a known limitation.
pub fn extract_wallet_address(text: &str) -> Option<&str> {
    address_search_re().find(text).map(|m| m.as_str())
}

/// Full-string validation: `0x` + exactly 40 hex digits, any case.
/// Surrounding whitespace is tolerated, partial matches are not.
pub fn is_valid_wallet_address(candidate: &str) -> bool {
    address_exact_re().is_match(candidate.trim())
}

/// A validated EVM wallet address (42 chars, `0x` + 40 hex digits).
/// Construction goes through [`WalletAddress::parse`]; original casing is
/// preserved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn parse(candidate: &str) -> Option<Self> {
        let trimmed = candidate.trim();
        if is_valid_wallet_address(trimmed) {
            Some(Self(trimmed.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The analysis pathway a wallet-bearing message resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    TokenAnalysis,
    NftAnalysis,
    TransactionHistory,
    RiskAssessment,
    WhaleAnalysis,
    ContractVerification,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::TokenAnalysis => write!(f, "token_analysis"),
            Intent::NftAnalysis => write!(f, "nft_analysis"),
            Intent::TransactionHistory => write!(f, "transaction_history"),
            Intent::RiskAssessment => write!(f, "risk_assessment"),
            Intent::WhaleAnalysis => write!(f, "whale_analysis"),
            Intent::ContractVerification => write!(f, "contract_verification"),
        }
    }
}

/// Keyword tables, tested in order; the first set with a hit wins.
/// Precedence matters: "token" outranks "nft" when both appear.
const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (Intent::TokenAnalysis, &["analyze", "show all tokens", "token", "balance"]),
    (Intent::NftAnalysis, &["nft", "collection", "show nft"]),
    (Intent::TransactionHistory, &["history", "transaction", "tx"]),
    (Intent::RiskAssessment, &["risk", "security", "check risks"]),
    (Intent::WhaleAnalysis, &["whale", "analyze whale"]),
    (Intent::ContractVerification, &["verify", "contract"]),
];

impl Intent {
    /// Classify a message by ordered keyword lookup. Unmatched input is
    /// not an error; it defaults to token analysis.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        for (intent, keywords) in INTENT_KEYWORDS {
            if keywords.iter().any(|kw| lower.contains(kw)) {
                return *intent;
            }
        }
        Intent::TokenAnalysis
    }
}

/// One fungible-token position as the provider reports it. Field names
/// follow the wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBalance {
    pub blockchain: String,
    pub chain_id: i64,
    pub decimal: i64,
    pub quantity: f64,
    pub token_address: String,
    pub token_name: String,
    pub token_symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub total_items: i64,
    pub offset: i64,
    pub limit: i64,
    pub has_next: bool,
}

/// Strictly validated balance payload. A 200 response that does not
/// deserialize into this shape is discarded wholesale by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletBalance {
    pub token: Vec<TokenBalance>,
    pub pagination: Pagination,
}

impl WalletBalance {
    pub fn empty() -> Self {
        Self {
            token: Vec::new(),
            pagination: Pagination {
                total_items: 0,
                offset: 0,
                limit: 0,
                has_next: false,
            },
        }
    }
}

/// One NFT position. Every field is optional: the provider's NFT surface
/// is guessed, so nothing beyond what we explicitly read is assumed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NftHolding {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub collection_name: Option<String>,
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x9656911585799e7129668a1e79a0C8b43dbB7EA9";

    #[test]
    fn extracts_first_address_only() {
        let msg = format!(
            "compare {} with 0x0000000000000000000000000000000000000001",
            ADDR
        );
        assert_eq!(extract_wallet_address(&msg), Some(ADDR));
    }

    #[test]
    fn extraction_returns_none_without_address() {
        assert_eq!(extract_wallet_address("what can you do?"), None);
        assert_eq!(extract_wallet_address("0x123 is too short"), None);
        assert_eq!(extract_wallet_address(""), None);
    }

    #[test]
    fn validates_exact_form() {
        assert!(is_valid_wallet_address(ADDR));
        assert!(is_valid_wallet_address(&ADDR.to_lowercase()));
        // Surrounding whitespace is trimmed before matching
        assert!(is_valid_wallet_address(&format!("  {}\n", ADDR)));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_wallet_address(""));
        assert!(!is_valid_wallet_address("0x123"));
        // 41 hex digits
        assert!(!is_valid_wallet_address(&format!("{}a", ADDR)));
        // missing prefix
        assert!(!is_valid_wallet_address(&ADDR[2..]));
        // embedded in a longer string: anchored match must fail
        assert!(!is_valid_wallet_address(&format!("wallet {} ok", ADDR)));
        // non-hex character
        assert!(!is_valid_wallet_address(
            "0xZ656911585799e7129668a1e79a0C8b43dbB7EA9"
        ));
    }

    #[test]
    fn wallet_address_parse_preserves_casing() {
        let parsed = WalletAddress::parse(&format!(" {} ", ADDR)).unwrap();
        assert_eq!(parsed.as_str(), ADDR);
        assert!(WalletAddress::parse("nope").is_none());
    }

    #[test]
    fn classifies_token_analysis() {
        assert_eq!(
            Intent::classify(&format!("Show all tokens for {}", ADDR)),
            Intent::TokenAnalysis
        );
    }

    #[test]
    fn classifies_nft_analysis() {
        assert_eq!(
            Intent::classify(&format!("Show NFT collection for {}", ADDR)),
            Intent::NftAnalysis
        );
    }

    #[test]
    fn classifies_remaining_intents() {
        assert_eq!(Intent::classify("show tx history"), Intent::TransactionHistory);
        assert_eq!(Intent::classify("check risks please"), Intent::RiskAssessment);
        assert_eq!(Intent::classify("is this a whale?"), Intent::WhaleAnalysis);
        assert_eq!(Intent::classify("verify this please"), Intent::ContractVerification);
    }

    #[test]
    fn token_keywords_outrank_nft_keywords() {
        // Precedence: the token set is tested before the nft set
        assert_eq!(
            Intent::classify("show token and nft holdings"),
            Intent::TokenAnalysis
        );
    }

    #[test]
    fn unmatched_message_defaults_to_token_analysis() {
        assert_eq!(Intent::classify(ADDR), Intent::TokenAnalysis);
    }
}
