//! HTML response formatters.
//!
//! Every intent maps to exactly one formatter; each returns the full
//! chat-message document the front-end drops into the conversation.
//! Provider- and user-supplied strings are escaped with a fixed entity
//! table before being embedded.

use regex::Regex;
use std::sync::OnceLock;

use crate::gateway::NftHoldings;
use crate::types::{WalletAddress, WalletBalance};

/// Display caps: items beyond these are silently omitted, not paginated.
const MAX_TOKEN_CARDS: usize = 10;
const MAX_NFT_CARDS: usize = 12;

const NFT_PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x300?text=NFT";

/// Escape HTML special characters using the fixed entity table.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '>' => escaped.push_str("&gt;"),
            '<' => escaped.push_str("&lt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Shorten a long address to `first 8 … last 4` for display. Counts
/// chars, not bytes: contract addresses come from the provider and are
/// not guaranteed to be ASCII.
pub fn truncate_address(address: &str) -> String {
    const HEAD: usize = 8;
    const TAIL: usize = 4;
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= HEAD + 8 {
        return address.to_string();
    }
    let head: String = chars[..HEAD].iter().collect();
    let tail: String = chars[chars.len() - TAIL..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Format a token quantity: thousands separators with two decimals above
/// 1000, otherwise up to six decimals with trailing zeros trimmed.
pub fn format_quantity(quantity: f64) -> String {
    if quantity > 1000.0 {
        let formatted = format!("{:.2}", quantity);
        let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
        let mut grouped = String::new();
        let digits: Vec<char> = int_part.chars().collect();
        for (i, c) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 && *c != '-' {
                grouped.push(',');
            }
            grouped.push(*c);
        }
        format!("{}.{}", grouped, frac_part)
    } else {
        format!("{:.6}", quantity)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold regex must compile"))
}

fn italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*(.*?)\*").expect("italic regex must compile"))
}

/// Light markdown-to-HTML conversion for completion-provider text:
/// paragraph breaks, line breaks, bold, italics. Nothing more.
pub fn markdown_lite(content: &str) -> String {
    let content = content.replace("\n\n", "</p><p>").replace('\n', "<br>");
    let content = format!("<p>{}</p>", content);
    let content = bold_re().replace_all(&content, "<strong>$1</strong>");
    italic_re().replace_all(&content, "<em>$1</em>").into_owned()
}

fn action_buttons(address: &WalletAddress) -> String {
    format!(
        r#"<div class="wallet-actions">
    <button class="action-btn" onclick="sendMessage('Show transaction history for {addr}')">
        <i class="fas fa-history"></i> Transaction History
    </button>
    <button class="action-btn" onclick="sendMessage('Show NFT holdings for {addr}')">
        <i class="fas fa-images"></i> View NFTs
    </button>
    <button class="action-btn" onclick="sendMessage('Check risks for {addr}')">
        <i class="fas fa-shield-alt"></i> Security Analysis
    </button>
</div>"#,
        addr = address
    )
}

fn back_button(address: &WalletAddress) -> String {
    format!(
        r#"<div class="wallet-actions">
    <button class="action-btn" onclick="sendMessage('Analyze {addr}')">
        <i class="fas fa-arrow-left"></i> Back to Wallet
    </button>
</div>"#,
        addr = address
    )
}

fn document(body: String) -> String {
    format!(
        r#"<div class="message bot-message">
    <div class="message-content">
{body}
    </div>
</div>"#
    )
}

/// Token-analysis document: summary cards plus per-token cards, capped
/// at [`MAX_TOKEN_CARDS`].
pub fn wallet_analysis(address: &WalletAddress, balance: &WalletBalance) -> String {
    let token_count = balance.token.len();
    let mut tokens_html = String::new();

    for token in balance.token.iter().take(MAX_TOKEN_CARDS) {
        let icon_text = token
            .token_name
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_else(|| "?".to_string());
        let symbol: String = token.token_symbol.chars().take(20).collect();
        let network = if token.blockchain.is_empty() {
            "Unknown".to_string()
        } else {
            title_case(&token.blockchain)
        };

        tokens_html.push_str(&format!(
            r#"<div class="token-card">
    <div class="token-header">
        <div class="token-icon">{icon}</div>
        <div class="token-info">
            <div class="token-name">{name}</div>
            <span class="token-symbol">{symbol}</span>
        </div>
    </div>
    <div class="token-balance">{quantity}</div>
    <div class="token-details">
        <div class="detail-item">
            <div class="detail-label"><i class="fas fa-network-wired"></i> Network</div>
            <div class="detail-value">{network}</div>
        </div>
        <div class="detail-item">
            <div class="detail-label"><i class="fas fa-file-contract"></i> Contract</div>
            <div class="detail-value copy-address" onclick="copyToClipboard('{contract}')" title="Click to copy">{contract_short}</div>
        </div>
    </div>
</div>
"#,
            icon = escape_html(&icon_text),
            name = escape_html(&token.token_name),
            symbol = escape_html(&symbol),
            quantity = format_quantity(token.quantity),
            network = escape_html(&network),
            contract = escape_html(&token.token_address),
            contract_short = escape_html(&truncate_address(&token.token_address)),
        ));
    }

    if tokens_html.is_empty() {
        tokens_html = "<p>No tokens found in this wallet.</p>".to_string();
    }

    document(format!(
        r#"<div class="wallet-analysis">
    <h3><i class="fas fa-wallet"></i> Wallet Analysis</h3>
    <div class="wallet-address"><i class="fas fa-address-card"></i> {addr}</div>
    <div class="summary-cards">
        <div class="summary-card">
            <i class="fas fa-coins"></i>
            <div class="summary-value">{count}</div>
            <div class="summary-label">Total Tokens</div>
        </div>
        <div class="summary-card">
            <i class="fas fa-network-wired"></i>
            <div class="summary-value">Polygon</div>
            <div class="summary-label">Primary Network</div>
        </div>
    </div>
    <h4><i class="fas fa-list"></i> Token Holdings</h4>
    <div class="token-grid">
{tokens}
    </div>
{actions}
</div>"#,
        addr = address,
        count = token_count,
        tokens = tokens_html,
        actions = action_buttons(address),
    ))
}

/// NFT-holdings document: per-NFT cards capped at [`MAX_NFT_CARDS`], or
/// a friendly notice when the wallet holds none.
pub fn nft_holdings(address: &WalletAddress, holdings: &NftHoldings) -> String {
    if holdings.nfts.is_empty() {
        return document(format!(
            r#"<div class="nft-analysis">
    <h3><i class="fas fa-images"></i> NFT Holdings</h3>
    <div class="wallet-address"><i class="fas fa-address-card"></i> {addr}</div>
    <div class="summary-cards">
        <div class="summary-card">
            <i class="fas fa-images"></i>
            <div class="summary-value">0</div>
            <div class="summary-label">Total NFTs</div>
        </div>
    </div>
    <div class="no-nfts-message">
        <i class="fas fa-info-circle"></i>
        <p>No NFTs found in this wallet on the supported networks.</p>
        <p><small>Note: the provider may not support all NFT endpoints yet.</small></p>
    </div>
{back}
</div>"#,
            addr = address,
            back = back_button(address),
        ));
    }

    let mut nfts_html = String::new();
    for nft in holdings.nfts.iter().take(MAX_NFT_CARDS) {
        let name = nft.name.as_deref().unwrap_or("Unnamed NFT");
        let collection = nft.collection_name.as_deref().unwrap_or("Unknown");
        let token_id = nft.token_id.as_deref().unwrap_or("N/A");
        let image = nft.image_url.as_deref().unwrap_or(NFT_PLACEHOLDER_IMAGE);

        nfts_html.push_str(&format!(
            r#"<div class="nft-item">
    <div class="nft-image">
        <img src="{image}" alt="{name}" onerror="this.src='{placeholder}'">
    </div>
    <div class="nft-info">
        <h4>{name}</h4>
        <p><strong>Collection:</strong> {collection}</p>
        <p><strong>Token ID:</strong> {token_id}</p>
    </div>
</div>
"#,
            image = escape_html(image),
            placeholder = NFT_PLACEHOLDER_IMAGE,
            name = escape_html(name),
            collection = escape_html(collection),
            token_id = escape_html(token_id),
        ));
    }

    document(format!(
        r#"<div class="nft-analysis">
    <h3><i class="fas fa-images"></i> NFT Holdings</h3>
    <div class="wallet-address"><i class="fas fa-address-card"></i> {addr}</div>
    <div class="summary-cards">
        <div class="summary-card">
            <i class="fas fa-images"></i>
            <div class="summary-value">{count}</div>
            <div class="summary-label">Total NFTs</div>
        </div>
    </div>
    <div class="nft-grid">
{nfts}
    </div>
{back}
</div>"#,
        addr = address,
        count = holdings.total_count,
        nfts = nfts_html,
        back = back_button(address),
    ))
}

/// Transaction-history document. Placeholder content: the provider has
/// no confirmed transaction endpoint, so only a count is shown.
pub fn transaction_history(address: &WalletAddress, count: usize) -> String {
    document(format!(
        r#"<div class="tx-analysis">
    <h3><i class="fas fa-history"></i> Transaction History</h3>
    <div class="wallet-address"><i class="fas fa-address-card"></i> {addr}</div>
    <div class="summary-cards">
        <div class="summary-card">
            <i class="fas fa-list"></i>
            <div class="summary-value">{count}</div>
            <div class="summary-label">Transactions Found</div>
        </div>
    </div>
    <p><i class="fas fa-info-circle"></i> Transaction history endpoint is not fully supported by the provider API yet.</p>
{back}
</div>"#,
        addr = address,
        count = count,
        back = back_button(address),
    ))
}

/// Risk-assessment document. Static placeholder: real risk data is a
/// known capability gap.
pub fn risk_assessment(address: &WalletAddress) -> String {
    document(format!(
        r#"<div class="risk-analysis">
    <h3><i class="fas fa-shield-alt"></i> Security Risk Assessment</h3>
    <div class="wallet-address"><i class="fas fa-address-card"></i> {addr}</div>
    <div class="summary-cards">
        <div class="summary-card">
            <i class="fas fa-shield-alt" style="color: var(--success)"></i>
            <div class="summary-value" style="color: var(--success)">Low</div>
            <div class="summary-label">Risk Level</div>
        </div>
    </div>
    <div class="risk-factors">
        <div class="risk-factor low-risk">
            <h4>Normal Activity Pattern</h4>
            <p><strong>Risk Level:</strong> 1/10</p>
            <p>Wallet shows normal token holding patterns with standard Polygon network activity.</p>
        </div>
    </div>
{back}
</div>"#,
        addr = address,
        back = back_button(address),
    ))
}

/// Whale-analysis document. Static placeholder (capability gap).
pub fn whale_analysis(address: &WalletAddress) -> String {
    document(format!(
        r#"<div class="whale-analysis">
    <h3><i class="fas fa-chart-line"></i> Whale Wallet Analysis</h3>
    <div class="wallet-address"><i class="fas fa-address-card"></i> {addr}</div>
    <div class="summary-cards">
        <div class="summary-card">
            <i class="fas fa-coins"></i>
            <div class="summary-value">14.5K</div>
            <div class="summary-label">MATIC Holdings</div>
        </div>
        <div class="summary-card">
            <i class="fas fa-star" style="color: var(--accent)"></i>
            <div class="summary-value">Medium</div>
            <div class="summary-label">Whale Status</div>
        </div>
    </div>
    <div class="whale-metrics">
        <p><strong>Analysis:</strong> Moderate holdings detected</p>
        <p><strong>Primary Token:</strong> MATIC (Polygon)</p>
        <p><strong>Activity Level:</strong> Standard</p>
    </div>
{back}
</div>"#,
        addr = address,
        back = back_button(address),
    ))
}

/// Contract-verification document. Static placeholder (capability gap).
pub fn contract_verification(address: &WalletAddress) -> String {
    document(format!(
        r#"<div class="contract-verification">
    <h3><i class="fas fa-file-contract"></i> Contract Verification</h3>
    <div class="wallet-address"><i class="fas fa-address-card"></i> {addr}</div>
    <div class="summary-cards">
        <div class="summary-card">
            <i class="fas fa-wallet" style="color: var(--success)"></i>
            <div class="summary-value">Wallet</div>
            <div class="summary-label">Address Type</div>
        </div>
    </div>
    <div class="verification-details">
        <p><strong>Type:</strong> Externally Owned Account (EOA)</p>
        <p><strong>Status:</strong> Standard Wallet Address</p>
        <p><strong>Network:</strong> Multi-chain (Polygon)</p>
    </div>
{back}
</div>"#,
        addr = address,
        back = back_button(address),
    ))
}

/// Wrapper for completion-provider replies to addressless messages.
pub fn general_response(content: &str) -> String {
    document(format!(
        r#"<div class="general-response">
    <i class="fas fa-robot"></i>
    <div class="response-text">{}</div>
</div>"#,
        markdown_lite(content)
    ))
}

/// The one error template every failure path renders.
pub fn error_document(title: &str, detail: &str) -> String {
    document(format!(
        r#"<div class="error-message">
    <h3><i class="fas fa-exclamation-triangle"></i> {title}</h3>
    <p>{detail}</p>
    <div style="margin-top: 1rem;">
        <small>&#x1F4A1; <strong>Tip:</strong> Make sure you're using a valid Ethereum wallet address (0x...)</small>
    </div>
</div>"#,
        title = escape_html(title),
        detail = escape_html(detail),
    ))
}
