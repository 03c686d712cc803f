use std::collections::HashMap;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use lazy_static::lazy_static;
use serenity::builder::CreateEmbed;
use serenity::model::id::UserId;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::models::{ClaimResult, Operation, PendingClaim, ProfilePayload, ScanResult};
use crate::services::gateway::PaymentGateway;
use crate::utils::errors::{ClaimError, GatewayError};
use crate::utils::links;

lazy_static! {
    static ref CLAIM_DESKS: Mutex<HashMap<UserId, ClaimDesk>> = Mutex::new(HashMap::new());
}

/// Claims waiting for the caller. Rebuilt on every view, so expiry counts
/// down from "now" and claiming never removes an entry.
pub fn pending_claims(now: DateTime<Utc>) -> Vec<PendingClaim> {
    vec![
        PendingClaim {
            id: "tx1234".to_string(),
            sender: "@mark.sei".to_string(),
            amount: "50.00".to_string(),
            note: Some("For dinner last week".to_string()),
            expires_at: now + ChronoDuration::hours(24),
            password_protected: false,
        },
        PendingClaim {
            id: "tx5678".to_string(),
            sender: "@alice.sei".to_string(),
            amount: "25.50".to_string(),
            note: None,
            expires_at: now + ChronoDuration::hours(12),
            password_protected: true,
        },
    ]
}

pub fn find_claim(id: &str) -> Result<PendingClaim, ClaimError> {
    pending_claims(Utc::now())
        .into_iter()
        .find(|c| c.id == id)
        .ok_or(ClaimError::NotFound)
}

/// Classify a scanned QR payload: claim URL, profile JSON, or neither
pub fn parse_scanned(text: &str) -> Result<ScanResult, ClaimError> {
    match links::claim_id_from_url(text) {
        Ok(Some(id)) => Ok(ScanResult::Claim(id)),
        Ok(None) => Err(ClaimError::NotAPaymentCode),
        Err(()) => serde_json::from_str::<ProfilePayload>(text.trim())
            .map(ScanResult::Profile)
            .map_err(|_| ClaimError::InvalidQrCode),
    }
}

/// What happened when the user pressed "Claim"
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimAttempt {
    Claimed(ClaimResult),
    /// Password dialog opened (or kept open) for this claim
    PasswordRequired(PendingClaim),
}

/// Per-user claim page state: the active transfer and its password dialog
#[derive(Debug, Clone)]
pub struct ClaimDesk {
    active: Option<PendingClaim>,
    dialog_open: bool,
    verification: Operation<()>,
}

impl Default for ClaimDesk {
    fn default() -> Self {
        ClaimDesk {
            active: None,
            dialog_open: false,
            verification: Operation::Idle,
        }
    }
}

impl ClaimDesk {
    pub fn active(&self) -> Option<&PendingClaim> {
        self.active.as_ref()
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog_open
    }

    pub fn password_error(&self) -> Option<&str> {
        self.verification.error()
    }

    /// Press "Claim" on a card. Protected claims open the password dialog.
    /// Refused while a password check for the open dialog is still running.
    pub fn press_claim(&mut self, claim: PendingClaim) -> Result<ClaimAttempt, ClaimError> {
        if self.verification.is_pending() {
            return Err(ClaimError::VerificationPending);
        }
        if claim.password_protected {
            self.active = Some(claim.clone());
            self.dialog_open = true;
            self.verification.reset();
            return Ok(ClaimAttempt::PasswordRequired(claim));
        }
        self.close();
        Ok(ClaimAttempt::Claimed(claimed(&claim)))
    }

    /// Reserve the password check for the open dialog
    pub fn begin_verification(&mut self) -> Result<PendingClaim, ClaimError> {
        let claim = match (&self.active, self.dialog_open) {
            (Some(claim), true) => claim.clone(),
            _ => return Err(ClaimError::NotFound),
        };
        if !self.verification.begin() {
            return Err(ClaimError::VerificationPending);
        }
        Ok(claim)
    }

    /// Record the gateway's answer. A wrong password keeps the dialog open.
    pub fn finish_verification(
        &mut self,
        claim: &PendingClaim,
        verified: Result<bool, GatewayError>,
    ) -> Result<ClaimResult, ClaimError> {
        match verified {
            Ok(true) => {
                self.verification.finish::<String>(Ok(()));
                self.close();
                Ok(claimed(claim))
            }
            Ok(false) => {
                self.verification.finish(Err(ClaimError::IncorrectPassword));
                Err(ClaimError::IncorrectPassword)
            }
            Err(e) => {
                self.verification.finish(Err(e.clone()));
                Err(e.into())
            }
        }
    }

    /// Submit the password dialog on a desk the caller owns
    pub async fn submit_password<G: PaymentGateway + ?Sized>(
        &mut self,
        gateway: &G,
        password: &str,
    ) -> Result<ClaimResult, ClaimError> {
        let claim = self.begin_verification()?;
        let verified = gateway.verify_claim_password(&claim.id, password).await;
        self.finish_verification(&claim, verified)
    }

    fn close(&mut self) {
        self.active = None;
        self.dialog_open = false;
    }
}

fn claimed(claim: &PendingClaim) -> ClaimResult {
    ClaimResult {
        claim_id: claim.id.clone(),
        sender: claim.sender.clone(),
        amount: claim.amount.clone(),
    }
}

/// Run the password check without holding the shared desk map
async fn verify_in<G: PaymentGateway + ?Sized>(
    desks: &Mutex<HashMap<UserId, ClaimDesk>>,
    user_id: UserId,
    gateway: &G,
    claim: PendingClaim,
    password: &str,
) -> Result<ClaimResult, ClaimError> {
    let verified = gateway.verify_claim_password(&claim.id, password).await;
    let mut desks = desks.lock().await;
    let desk = desks.entry(user_id).or_default();
    let result = desk.finish_verification(&claim, verified);
    if result == Err(ClaimError::IncorrectPassword) {
        warn!("User {} entered a wrong password for claim {}", user_id, claim.id);
    }
    result
}

/// Claim by id, optionally answering the password dialog in the same command
pub async fn claim<G: PaymentGateway + ?Sized>(
    user_id: UserId,
    gateway: &G,
    claim_id: &str,
    password: Option<&str>,
) -> Result<ClaimAttempt, ClaimError> {
    claim_in(&CLAIM_DESKS, user_id, gateway, claim_id, password).await
}

/// Answer the currently open password dialog
pub async fn submit_password<G: PaymentGateway + ?Sized>(
    user_id: UserId,
    gateway: &G,
    password: &str,
) -> Result<ClaimResult, ClaimError> {
    submit_password_in(&CLAIM_DESKS, user_id, gateway, password).await
}

async fn claim_in<G: PaymentGateway + ?Sized>(
    desks: &Mutex<HashMap<UserId, ClaimDesk>>,
    user_id: UserId,
    gateway: &G,
    claim_id: &str,
    password: Option<&str>,
) -> Result<ClaimAttempt, ClaimError> {
    let pending = find_claim(claim_id)?;

    let reserved = {
        let mut guard = desks.lock().await;
        let desk = guard.entry(user_id).or_default();
        match (desk.press_claim(pending)?, password) {
            (ClaimAttempt::PasswordRequired(_), Some(password)) => Ok((desk.begin_verification()?, password)),
            (attempt, _) => Err(attempt),
        }
    };

    let result = match reserved {
        Ok((claim, password)) => ClaimAttempt::Claimed(verify_in(desks, user_id, gateway, claim, password).await?),
        Err(attempt) => attempt,
    };

    if let ClaimAttempt::Claimed(ref r) = result {
        info!("User {} claimed {} ({} SEI from {})", user_id, r.claim_id, r.amount, r.sender);
    } else {
        debug!("Password dialog opened for user {} on claim {}", user_id, claim_id);
    }
    Ok(result)
}

async fn submit_password_in<G: PaymentGateway + ?Sized>(
    desks: &Mutex<HashMap<UserId, ClaimDesk>>,
    user_id: UserId,
    gateway: &G,
    password: &str,
) -> Result<ClaimResult, ClaimError> {
    let claim = desks.lock().await.entry(user_id).or_default().begin_verification()?;
    verify_in(desks, user_id, gateway, claim, password).await
}

pub fn create_contact_embed(profile: &ProfilePayload) -> CreateEmbed {
    CreateEmbed::default()
        .title("👤 Contact Found")
        .field("Username", &profile.username, true)
        .field("Address", links::truncate_address(&profile.address), true)
        .color(0x00b0f4)
}

pub fn create_claims_embed(claims: &[PendingClaim], now: DateTime<Utc>) -> CreateEmbed {
    if claims.is_empty() {
        return CreateEmbed::default()
            .title("No Pending Claims")
            .description("You don't have any protected transfers to claim")
            .color(0xffa500);
    }

    let mut embed = CreateEmbed::default()
        .title("🛡️ Pending Claims")
        .color(0x00b0f4);

    for claim in claims {
        let mut body = format!(
            "**From**: {}\n**Amount**: {} SEI\n**Expires in**: {}",
            claim.sender,
            claim.amount,
            claim.time_remaining(now)
        );
        if let Some(note) = &claim.note {
            body.push_str(&format!("\n**Note**: {}", note));
        }
        let action = if claim.password_protected {
            format!("\n🔒 `$claim {} <password>`", claim.id)
        } else {
            format!("\n`$claim {}`", claim.id)
        };
        body.push_str(&action);

        let title = if claim.password_protected {
            format!("Protected Transfer `{}` (Password)", claim.id)
        } else {
            format!("Protected Transfer `{}`", claim.id)
        };
        embed = embed.field(title, body, false);
    }

    embed.footer(serenity::builder::CreateEmbedFooter::new(
        "$claim link <id> • $claim qr <id> • $claim scan <payload>",
    ))
}

pub fn create_claimed_embed(result: &ClaimResult) -> CreateEmbed {
    CreateEmbed::default()
        .title("✅ Transfer Claimed")
        .description("Funds have been added to your wallet")
        .field("From", &result.sender, true)
        .field("Amount", format!("{} SEI", result.amount), true)
        .footer(serenity::builder::CreateEmbedFooter::new(format!("Claim: {}", result.claim_id)))
        .color(0x00ff00)
}

pub fn create_password_prompt_embed(claim: &PendingClaim) -> CreateEmbed {
    CreateEmbed::default()
        .title("🔒 Enter Password")
        .description(format!(
            "This transfer from {} for {} SEI is password protected",
            claim.sender, claim.amount
        ))
        .field("Verify & Claim", format!("`$claim {} <password>`", claim.id), false)
        .color(0xffa500)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::gateway::SimulatedGateway;

    fn gateway() -> SimulatedGateway {
        SimulatedGateway::new("truststream.app", false)
    }

    #[test]
    fn test_time_remaining() {
        let now = Utc::now();
        let claims = pending_claims(now);
        assert_eq!(claims[0].time_remaining(now), "24h 0m");
        assert_eq!(claims[1].time_remaining(now), "12h 0m");
        assert_eq!(claims[1].time_remaining(now + ChronoDuration::minutes(90)), "10h 30m");
    }

    #[test]
    fn test_parse_scanned() {
        assert_eq!(
            parse_scanned("https://truststream.app/claim/tx5678"),
            Ok(ScanResult::Claim("tx5678".to_string()))
        );
        assert_eq!(parse_scanned("https://truststream.app/app"), Err(ClaimError::NotAPaymentCode));
        assert_eq!(parse_scanned("hello there"), Err(ClaimError::InvalidQrCode));

        let blob = r#"{"address":"sei1abc","username":"@trustuser.sei","timestamp":"2026-10-19T10:00:00Z"}"#;
        match parse_scanned(blob) {
            Ok(ScanResult::Profile(p)) => assert_eq!(p.username, "@trustuser.sei"),
            other => panic!("expected profile, got {:?}", other),
        }
    }

    #[test]
    fn test_unprotected_claim_goes_through() {
        let mut desk = ClaimDesk::default();
        let claim = find_claim("tx1234").unwrap();
        match desk.press_claim(claim).unwrap() {
            ClaimAttempt::Claimed(r) => assert_eq!(r.amount, "50.00"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(!desk.is_dialog_open());
    }

    #[tokio::test]
    async fn test_wrong_password_keeps_dialog_open() {
        let gw = gateway();
        let mut desk = ClaimDesk::default();
        let attempt = desk.press_claim(find_claim("tx5678").unwrap()).unwrap();
        assert!(matches!(attempt, ClaimAttempt::PasswordRequired(_)));

        let err = desk.submit_password(&gw, "letmein").await.unwrap_err();
        assert_eq!(err, ClaimError::IncorrectPassword);
        assert!(desk.is_dialog_open());
        assert_eq!(desk.password_error(), Some("Incorrect password"));
        assert_eq!(desk.active().map(|c| c.id.as_str()), Some("tx5678"));

        let result = desk.submit_password(&gw, "truststream").await.unwrap();
        assert_eq!(result.claim_id, "tx5678");
        assert!(!desk.is_dialog_open());
        assert!(desk.password_error().is_none());
    }

    #[tokio::test]
    async fn test_password_without_dialog_is_rejected() {
        let gw = gateway();
        let mut desk = ClaimDesk::default();
        assert_eq!(
            desk.submit_password(&gw, "truststream").await.unwrap_err(),
            ClaimError::NotFound
        );
    }

    #[tokio::test]
    async fn test_claim_by_id_with_password() {
        let gw = gateway();
        let user = UserId::new(9_001);

        let opened = claim(user, &gw, "tx5678", None).await.unwrap();
        assert!(matches!(opened, ClaimAttempt::PasswordRequired(_)));

        assert_eq!(
            claim(user, &gw, "tx5678", Some("nope")).await.unwrap_err(),
            ClaimError::IncorrectPassword
        );
        let done = claim(user, &gw, "tx5678", Some("truststream")).await.unwrap();
        assert!(matches!(done, ClaimAttempt::Claimed(_)));

        // claiming does not remove the mock entry
        assert!(find_claim("tx5678").is_ok());
        assert_eq!(claim(user, &gw, "tx0000", None).await.unwrap_err(), ClaimError::NotFound);
    }

    #[test]
    fn test_scanned_profile_with_non_ascii_address() {
        let blob = r#"{"address":"aéééééééééé","username":"@zoë.sei","timestamp":"2026-10-19T10:00:00Z"}"#;
        let profile = match parse_scanned(blob) {
            Ok(ScanResult::Profile(p)) => p,
            other => panic!("expected profile, got {:?}", other),
        };
        assert_eq!(links::truncate_address(&profile.address), "aééééé...éééé");
        let _ = create_contact_embed(&profile);
    }

    /// Holds every password check until released
    struct HeldGateway {
        release: tokio::sync::Notify,
    }

    #[serenity::async_trait]
    impl PaymentGateway for HeldGateway {
        async fn submit_transfer(
            &self,
            _request: &crate::services::gateway::TransferRequest,
        ) -> Result<crate::services::gateway::TransferReceipt, GatewayError> {
            unreachable!()
        }

        async fn verify_claim_password(&self, _claim_id: &str, _password: &str) -> Result<bool, GatewayError> {
            self.release.notified().await;
            Ok(false)
        }

        async fn claim_faucet(&self, _symbol: &str) -> Result<u32, GatewayError> {
            unreachable!()
        }

        async fn check_username(&self, _username: &str) -> Result<bool, GatewayError> {
            unreachable!()
        }

        async fn generate_wallet(&self) -> Result<String, GatewayError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn test_password_check_does_not_block_other_users() {
        let desks = Mutex::new(HashMap::new());
        let gw = HeldGateway { release: tokio::sync::Notify::new() };
        let (a, b) = (UserId::new(9_101), UserId::new(9_102));

        claim_in(&desks, a, &gw, "tx5678", None).await.unwrap();

        let checking = submit_password_in(&desks, a, &gw, "letmein");
        let other_user = async {
            let attempt = claim_in(&desks, b, &gw, "tx1234", None).await;
            gw.release.notify_one();
            attempt
        };
        let (checked, attempt) = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            async { tokio::join!(checking, other_user) },
        )
        .await
        .expect("claim desk stayed locked during a password check");

        assert_eq!(checked.unwrap_err(), ClaimError::IncorrectPassword);
        assert!(matches!(attempt, Ok(ClaimAttempt::Claimed(_))));
        assert!(desks.lock().await.get(&a).map_or(false, |d| d.is_dialog_open()));
    }

    #[test]
    fn test_claim_refused_while_check_pending() {
        let mut desk = ClaimDesk::default();
        desk.press_claim(find_claim("tx5678").unwrap()).unwrap();
        desk.begin_verification().unwrap();

        assert_eq!(desk.begin_verification().unwrap_err(), ClaimError::VerificationPending);
        assert_eq!(
            desk.press_claim(find_claim("tx1234").unwrap()).unwrap_err(),
            ClaimError::VerificationPending
        );
    }
}
