//! Profile and registration models

use serde::{Deserialize, Serialize};

/// JSON blob encoded in a profile QR code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilePayload {
    pub address: String,
    pub username: String,
    pub timestamp: String,
}

/// A username bound to a generated wallet
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredIdentity {
    pub username: String,
    pub wallet_address: String,
}

impl RegisteredIdentity {
    pub fn handle(&self) -> String {
        format!("@{}.sei", self.username)
    }
}

/// Result of a faucet drip
#[derive(Debug, Clone, PartialEq)]
pub struct FaucetResult {
    pub symbol: String,
    pub amount: u32,
}
