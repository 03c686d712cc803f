//! Token reference data

#[derive(Debug, Clone, PartialEq)]
pub struct TokenRef {
    pub symbol: &'static str,
    pub display_name: &'static str,
    pub balance: Option<f64>,
}

impl TokenRef {
    /// "Available: 1245.78 SEI"
    pub fn available_text(&self) -> String {
        match self.balance {
            Some(balance) => format!("Available: {:.2} {}", balance, self.symbol),
            None => format!("Available: 0 {}", self.symbol),
        }
    }

    /// Amount filled in by the MAX shortcut
    pub fn max_amount(&self) -> String {
        self.balance.unwrap_or(0.0).to_string()
    }
}

/// Tokens selectable in transfer and stream forms
pub const TOKENS: [TokenRef; 4] = [
    TokenRef { symbol: "SEI", display_name: "Sei", balance: Some(1245.78) },
    TokenRef { symbol: "ETH", display_name: "Ethereum", balance: Some(0.5) },
    TokenRef { symbol: "USDC", display_name: "USD Coin", balance: Some(500.45) },
    TokenRef { symbol: "ATOM", display_name: "Cosmos", balance: Some(25.32) },
];

/// Faucet tokens carry no balance
pub const FAUCET_TOKENS: [TokenRef; 4] = [
    TokenRef { symbol: "SEI", display_name: "Sei", balance: None },
    TokenRef { symbol: "ETH", display_name: "Ethereum", balance: None },
    TokenRef { symbol: "USDC", display_name: "USD Coin", balance: None },
    TokenRef { symbol: "ATOM", display_name: "Cosmos", balance: None },
];

pub fn default_token() -> TokenRef {
    TOKENS[0].clone()
}

pub fn find_token(symbol: &str) -> Option<TokenRef> {
    find_in(&TOKENS, symbol)
}

pub fn find_faucet_token(symbol: &str) -> Option<TokenRef> {
    find_in(&FAUCET_TOKENS, symbol)
}

fn find_in(list: &[TokenRef], symbol: &str) -> Option<TokenRef> {
    list.iter()
        .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
        .cloned()
}
