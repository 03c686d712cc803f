use std::collections::HashMap;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use lazy_static::lazy_static;
use serenity::builder::CreateEmbed;
use serenity::model::id::UserId;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::duration::format_seconds;
use crate::models::token::find_faucet_token;
use crate::models::{FaucetResult, Operation};
use crate::services::gateway::PaymentGateway;
use crate::utils::errors::FaucetError;

lazy_static! {
    static ref FAUCET: Mutex<FaucetLedger> = Mutex::new(FaucetLedger::default());
}

const CLAIM_WINDOW_HOURS: i64 = 24;

/// Last claim per (user, token) and the in-flight drip per user
#[derive(Debug, Default)]
pub struct FaucetLedger {
    last_claims: HashMap<(UserId, String), DateTime<Utc>>,
    in_flight: HashMap<UserId, Operation<FaucetResult>>,
}

impl FaucetLedger {
    /// Reserve a drip for `symbol`; fails while cooling down or already claiming
    pub fn begin(&mut self, user_id: UserId, symbol: &str, now: DateTime<Utc>) -> Result<(), FaucetError> {
        if let Some(last) = self.last_claims.get(&(user_id, symbol.to_string())) {
            let next_allowed = *last + ChronoDuration::hours(CLAIM_WINDOW_HOURS);
            if now < next_allowed {
                let remaining = (next_allowed - now).num_seconds().max(0) as u64;
                return Err(FaucetError::CoolingDown {
                    symbol: symbol.to_string(),
                    remaining: format_seconds(remaining),
                });
            }
        }

        let op = self.in_flight.entry(user_id).or_insert(Operation::Idle);
        if !op.begin() {
            return Err(FaucetError::AlreadyClaiming);
        }
        Ok(())
    }

    pub fn finish(&mut self, user_id: UserId, result: &Result<FaucetResult, FaucetError>, now: DateTime<Utc>) {
        if let Ok(drip) = result {
            self.last_claims.insert((user_id, drip.symbol.clone()), now);
        }
        if let Some(op) = self.in_flight.get_mut(&user_id) {
            op.finish(result.clone());
        }
    }
}

/// Claim testnet tokens for `symbol` (defaults to SEI)
pub async fn claim<G: PaymentGateway + ?Sized>(
    user_id: UserId,
    gateway: &G,
    symbol: Option<&str>,
) -> Result<FaucetResult, FaucetError> {
    claim_with(&FAUCET, user_id, gateway, symbol).await
}

async fn claim_with<G: PaymentGateway + ?Sized>(
    ledger: &Mutex<FaucetLedger>,
    user_id: UserId,
    gateway: &G,
    symbol: Option<&str>,
) -> Result<FaucetResult, FaucetError> {
    let requested = symbol.unwrap_or("SEI");
    let token = find_faucet_token(requested)
        .ok_or_else(|| FaucetError::UnknownToken(requested.to_uppercase()))?;

    ledger.lock().await.begin(user_id, token.symbol, Utc::now())?;

    // The drip itself runs without holding the ledger
    let result = gateway
        .claim_faucet(token.symbol)
        .await
        .map(|amount| FaucetResult { symbol: token.symbol.to_string(), amount })
        .map_err(FaucetError::from);

    ledger.lock().await.finish(user_id, &result, Utc::now());

    if let Ok(drip) = &result {
        info!("User {} claimed {} {} from the faucet", user_id, drip.amount, drip.symbol);
    }
    result
}

pub fn create_faucet_embed(result: &FaucetResult) -> CreateEmbed {
    CreateEmbed::default()
        .title("💧 Claim Successful")
        .description(format!("You've claimed {} {} from the faucet", result.amount, result.symbol))
        .field(
            "Note",
            "Testnet tokens have no real value. You can claim once every 24 hours per token.",
            false,
        )
        .color(0x00ff00)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::gateway::SimulatedGateway;

    #[tokio::test]
    async fn test_claim_then_cooldown_per_token() {
        let ledger = Mutex::new(FaucetLedger::default());
        let gw = SimulatedGateway::new("truststream.app", false);
        let user = UserId::new(42);

        let drip = claim_with(&ledger, user, &gw, None).await.unwrap();
        assert_eq!(drip, FaucetResult { symbol: "SEI".to_string(), amount: 10 });

        let err = claim_with(&ledger, user, &gw, Some("sei")).await.unwrap_err();
        assert!(matches!(err, FaucetError::CoolingDown { ref symbol, .. } if symbol == "SEI"));

        // other tokens and other users are unaffected
        assert!(claim_with(&ledger, user, &gw, Some("ETH")).await.is_ok());
        assert!(claim_with(&ledger, UserId::new(43), &gw, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let ledger = Mutex::new(FaucetLedger::default());
        let gw = SimulatedGateway::new("truststream.app", false);
        let err = claim_with(&ledger, UserId::new(1), &gw, Some("doge")).await.unwrap_err();
        assert_eq!(err, FaucetError::UnknownToken("DOGE".to_string()));
    }

    #[test]
    fn test_overlapping_claims_are_refused() {
        let mut ledger = FaucetLedger::default();
        let user = UserId::new(7);
        let now = Utc::now();
        ledger.begin(user, "SEI", now).unwrap();
        assert_eq!(ledger.begin(user, "ETH", now), Err(FaucetError::AlreadyClaiming));
    }

    #[test]
    fn test_window_expires_after_a_day() {
        let mut ledger = FaucetLedger::default();
        let user = UserId::new(8);
        let then = Utc::now() - ChronoDuration::hours(25);
        ledger.begin(user, "SEI", then).unwrap();
        let drip = Ok(FaucetResult { symbol: "SEI".to_string(), amount: 10 });
        ledger.finish(user, &drip, then);

        assert!(ledger.begin(user, "SEI", Utc::now()).is_ok());
    }
}
