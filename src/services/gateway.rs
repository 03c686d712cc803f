//! Chain-facing operations.
//!
//! Every "blockchain" action the bot performs goes through [`PaymentGateway`].
//! [`SimulatedGateway`] fakes network latency with timers; a real chain client
//! only needs to implement the trait.

use std::time::Duration;

use serenity::async_trait;
use tracing::debug;

use crate::models::TransferType;
use crate::utils::errors::GatewayError;
use crate::utils::links;

/// Password every protected mock claim is locked with
pub const DEMO_CLAIM_PASSWORD: &str = "truststream";
pub const FAUCET_DRIP: u32 = 10;

const RESERVED_USERNAMES: [&str; 3] = ["admin", "system", "truststream"];

#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub recipient: String,
    pub amount: String,
    pub token: String,
    pub transfer_type: TransferType,
    pub timeout_seconds: Option<u64>,
    pub password_protected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub transfer_id: String,
    pub claim_id: String,
    pub claim_link: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn submit_transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, GatewayError>;

    /// True when `password` unlocks claim `claim_id`
    async fn verify_claim_password(&self, claim_id: &str, password: &str) -> Result<bool, GatewayError>;

    /// Returns the amount dripped
    async fn claim_faucet(&self, symbol: &str) -> Result<u32, GatewayError>;

    async fn check_username(&self, username: &str) -> Result<bool, GatewayError>;

    async fn generate_wallet(&self) -> Result<String, GatewayError>;
}

/// Per-operation fake latency
#[derive(Debug, Clone, Copy)]
pub struct Latency {
    pub transfer: Duration,
    pub password: Duration,
    pub faucet: Duration,
    pub username: Duration,
    pub wallet: Duration,
}

impl Latency {
    pub fn realistic() -> Self {
        Latency {
            transfer: Duration::ZERO,
            password: Duration::from_millis(1500),
            faucet: Duration::from_millis(2000),
            username: Duration::from_millis(1000),
            wallet: Duration::from_millis(2000),
        }
    }

    pub fn none() -> Self {
        Latency {
            transfer: Duration::ZERO,
            password: Duration::ZERO,
            faucet: Duration::ZERO,
            username: Duration::ZERO,
            wallet: Duration::ZERO,
        }
    }
}

pub struct SimulatedGateway {
    app_host: String,
    latency: Latency,
}

impl SimulatedGateway {
    pub fn new(app_host: impl Into<String>, simulate_latency: bool) -> Self {
        SimulatedGateway {
            app_host: app_host.into(),
            latency: if simulate_latency { Latency::realistic() } else { Latency::none() },
        }
    }

    pub fn app_host(&self) -> &str {
        &self.app_host
    }

    async fn wait(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn submit_transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, GatewayError> {
        self.wait(self.latency.transfer).await;

        let claim_id = links::opaque_claim_id();
        let receipt = TransferReceipt {
            transfer_id: links::transfer_id(),
            claim_link: links::claim_link(&self.app_host, &claim_id),
            claim_id,
        };
        debug!(
            "Simulated {} transfer of {} {} to {} -> {}",
            request.transfer_type, request.amount, request.token, request.recipient, receipt.transfer_id
        );
        Ok(receipt)
    }

    async fn verify_claim_password(&self, claim_id: &str, password: &str) -> Result<bool, GatewayError> {
        self.wait(self.latency.password).await;
        debug!("Simulated password check for claim {}", claim_id);
        Ok(password == DEMO_CLAIM_PASSWORD)
    }

    async fn claim_faucet(&self, symbol: &str) -> Result<u32, GatewayError> {
        self.wait(self.latency.faucet).await;
        debug!("Simulated faucet drip of {} {}", FAUCET_DRIP, symbol);
        Ok(FAUCET_DRIP)
    }

    async fn check_username(&self, username: &str) -> Result<bool, GatewayError> {
        self.wait(self.latency.username).await;
        Ok(username.len() >= 3 && !RESERVED_USERNAMES.contains(&username.to_lowercase().as_str()))
    }

    async fn generate_wallet(&self) -> Result<String, GatewayError> {
        self.wait(self.latency.wallet).await;
        Ok(links::wallet_address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> SimulatedGateway {
        SimulatedGateway::new("truststream.app", false)
    }

    #[tokio::test]
    async fn test_submit_builds_claim_link() {
        let request = TransferRequest {
            recipient: "@mark.sei".to_string(),
            amount: "10".to_string(),
            token: "SEI".to_string(),
            transfer_type: TransferType::Claim,
            timeout_seconds: None,
            password_protected: false,
        };
        let receipt = gateway().submit_transfer(&request).await.unwrap();
        assert_eq!(
            receipt.claim_link,
            format!("https://truststream.app/claim/{}", receipt.claim_id)
        );
        assert_eq!(receipt.transfer_id.len(), 36);
    }

    #[tokio::test]
    async fn test_password_must_match_exactly() {
        let gw = gateway();
        assert!(gw.verify_claim_password("tx5678", "truststream").await.unwrap());
        assert!(!gw.verify_claim_password("tx5678", "TrustStream").await.unwrap());
        assert!(!gw.verify_claim_password("tx5678", "truststream ").await.unwrap());
        assert!(!gw.verify_claim_password("tx5678", "").await.unwrap());
    }

    #[tokio::test]
    async fn test_reserved_usernames() {
        let gw = gateway();
        assert!(gw.check_username("alice").await.unwrap());
        assert!(!gw.check_username("Admin").await.unwrap());
        assert!(!gw.check_username("ab").await.unwrap());
    }
}
