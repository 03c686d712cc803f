use std::collections::HashMap;

use lazy_static::lazy_static;
use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use serenity::model::id::UserId;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::models::session::TRANSFER_FEE;
use crate::models::{TransferSession, TransferType};
use crate::services::gateway::PaymentGateway;
use crate::services::wizard::{ConfirmOutcome, Notice, Step, TransferWizard};
use crate::utils::errors::WizardError;

lazy_static! {
    static ref WIZARDS: Mutex<HashMap<UserId, TransferWizard>> = Mutex::new(HashMap::new());
}

/// Open the wizard for a user, keeping one that is already running
pub async fn start(user_id: UserId) -> TransferWizard {
    let mut wizards = WIZARDS.lock().await;
    wizards
        .entry(user_id)
        .or_insert_with(|| {
            debug!("Opening transfer wizard for user {}", user_id);
            TransferWizard::new()
        })
        .clone()
}

/// Drop the wizard and its session
pub async fn cancel(user_id: UserId) -> bool {
    let removed = WIZARDS.lock().await.remove(&user_id).is_some();
    if removed {
        debug!("Closed transfer wizard for user {}", user_id);
    }
    removed
}

/// Run `f` against the user's live wizard
pub async fn with_wizard<T>(
    user_id: UserId,
    f: impl FnOnce(&mut TransferWizard) -> Result<T, WizardError>,
) -> Result<T, WizardError> {
    with_wizard_in(&WIZARDS, user_id, f).await
}

async fn with_wizard_in<T>(
    wizards: &Mutex<HashMap<UserId, TransferWizard>>,
    user_id: UserId,
    f: impl FnOnce(&mut TransferWizard) -> Result<T, WizardError>,
) -> Result<T, WizardError> {
    let mut wizards = wizards.lock().await;
    let wizard = wizards.get_mut(&user_id).ok_or(WizardError::NoSession)?;
    if wizard.is_submitting() {
        return Err(WizardError::SubmissionPending);
    }
    f(wizard)
}

/// Edit a session field; only allowed while the step that owns the field is showing
pub async fn edit_session(
    user_id: UserId,
    owner: Step,
    f: impl FnOnce(&mut TransferSession) -> Result<(), WizardError>,
) -> Result<TransferWizard, WizardError> {
    with_wizard(user_id, |wizard| {
        if wizard.step() != owner {
            return Err(WizardError::WrongStep { action: "edit", step: wizard.step().number() });
        }
        f(wizard.session_mut())?;
        Ok(wizard.clone())
    })
    .await
}

pub async fn confirm<G: PaymentGateway + ?Sized>(
    user_id: UserId,
    gateway: &G,
) -> Result<(TransferWizard, ConfirmOutcome), WizardError> {
    confirm_in(&WIZARDS, user_id, gateway).await
}

/// The submission runs without holding the shared wizard map
async fn confirm_in<G: PaymentGateway + ?Sized>(
    wizards: &Mutex<HashMap<UserId, TransferWizard>>,
    user_id: UserId,
    gateway: &G,
) -> Result<(TransferWizard, ConfirmOutcome), WizardError> {
    let request = with_wizard_in(wizards, user_id, |wizard| wizard.begin_confirm()).await?;

    let receipt = gateway.submit_transfer(&request).await;

    let mut wizards = wizards.lock().await;
    let wizard = wizards.get_mut(&user_id).ok_or(WizardError::NoSession)?;
    let outcome = wizard.finish_confirm(&request, receipt)?;
    info!("User {} confirmed transfer {}", user_id, outcome.receipt.transfer_id);
    Ok((wizard.clone(), outcome))
}

pub fn create_step_embed(wizard: &TransferWizard) -> CreateEmbed {
    let step = wizard.step();
    let session = wizard.session();
    let embed = match step {
        Step::RecipientDetails => recipient_details_embed(session),
        Step::ProtectionOptions => protection_options_embed(session),
        Step::Confirm => confirm_embed(session),
        Step::Success => success_embed(session),
    };

    let mut controls = Vec::new();
    if wizard.can_go_back() {
        controls.push("`$transfer back`");
    }
    match step {
        Step::RecipientDetails | Step::ProtectionOptions => controls.push("`$transfer next`"),
        Step::Confirm => controls.push("`$transfer confirm`"),
        Step::Success => controls.push("`$transfer reset`"),
    }

    embed.footer(CreateEmbedFooter::new(format!(
        "Step {}/4 • {} • {}",
        step.number(),
        step.title(),
        controls.join(" ")
    )))
}

fn recipient_details_embed(session: &TransferSession) -> CreateEmbed {
    let token = session.selected_token();
    CreateEmbed::default()
        .title("🛡️ Recipient Details")
        .field("Recipient Username", or_dash(session.recipient()), true)
        .field("Token", format!("{} ({})", token.symbol, token.display_name), true)
        .field(
            "Amount",
            format!("{}\n{}", or_dash(session.amount()), token.available_text()),
            true,
        )
        .field("Note (Optional)", session.note().unwrap_or("-"), true)
        .field("Transfer Method", session.transfer_type().method_label(), true)
        .field(
            "Edit",
            "`$transfer to <@username.sei>`\n\
             `$transfer amount <value|max>`\n\
             `$transfer token <SYMBOL>`\n\
             `$transfer note <text>`\n\
             `$transfer method <direct|claim>`",
            false,
        )
        .color(0x00b0f4)
}

fn protection_options_embed(session: &TransferSession) -> CreateEmbed {
    let timeout = if session.with_timeout() {
        let helper = session
            .timeout()
            .helper_text()
            .map(|h| format!(" ({})", h))
            .unwrap_or_default();
        format!(
            "On: {}{}\nAfter this time expires, funds will be automatically returned to your wallet",
            session.format_timeout(),
            helper
        )
    } else {
        "Off".to_string()
    };
    let password = if session.with_password() { "On" } else { "Off" };

    CreateEmbed::default()
        .title("🛡️ Protection Options")
        .field(
            "⏱️ Auto-refund Timeout",
            format!("Get your funds back if the recipient doesn't claim in time\n**{}**", timeout),
            false,
        )
        .field(
            "🔒 Password Protection",
            format!("{}\n**{}**", session.transfer_type().password_hint(), password),
            false,
        )
        .field(
            "Edit",
            "`$transfer timeout <off | value unit>`\n\
             `$transfer password <off | text>`",
            false,
        )
        .color(0x00b0f4)
}

fn confirm_embed(session: &TransferSession) -> CreateEmbed {
    let symbol = session.selected_token().symbol;
    let mut embed = CreateEmbed::default()
        .title("🛡️ Confirm Transfer")
        .field("Recipient", session.recipient(), true)
        .field("Amount", format!("{} {}", session.amount(), symbol), true)
        .field("Method", session.transfer_type().method_label(), true);

    if let Some(note) = session.note() {
        embed = embed.field("Note", note, true);
    }
    if session.with_timeout() {
        embed = embed.field("Timeout", session.format_timeout(), true);
    }
    if session.with_password() {
        embed = embed.field("Password Protected", "Yes", true);
    }

    let total = session.total_with_fee().unwrap_or_else(|| "-".to_string());
    embed
        .field("Transfer Fee", format!("{} {}", TRANSFER_FEE, symbol), true)
        .field("Total", format!("{} {}", total, symbol), true)
        .color(0xffa500)
}

fn success_embed(session: &TransferSession) -> CreateEmbed {
    let (kind, verb) = session.transfer_type().success_summary();
    let mut embed = CreateEmbed::default()
        .title("✅ Transfer Created!")
        .description(format!(
            "Your {} of {} {} to {} has been {}.",
            kind,
            session.amount(),
            session.selected_token().symbol,
            session.recipient(),
            verb
        ))
        .color(0x00ff00);

    if session.transfer_type() == TransferType::Claim {
        if let Some(link) = session.transfer_link() {
            embed = embed
                .field("Share this link with the recipient", link, false)
                .field("QR Payload", format!("`{}`", link), false);
        }
        if session.with_timeout() {
            embed = embed.field(
                "⏱️ Auto-refund enabled",
                format!(
                    "If not claimed within {}, funds will be automatically returned to your wallet.",
                    session.format_timeout()
                ),
                false,
            );
        }
    }
    embed
}

pub fn create_notice_embed(notice: &Notice) -> CreateEmbed {
    CreateEmbed::default()
        .title(&notice.title)
        .description(&notice.description)
        .color(0x00ff00)
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::gateway::SimulatedGateway;
    use crate::utils::errors::GatewayError;

    #[tokio::test]
    async fn test_session_requires_live_wizard() {
        let user = UserId::new(5_001);
        let err = with_wizard(user, |_| Ok(())).await.unwrap_err();
        assert_eq!(err, WizardError::NoSession);
    }

    #[tokio::test]
    async fn test_fields_are_owned_by_their_step() {
        let user = UserId::new(5_002);
        start(user).await;

        edit_session(user, Step::RecipientDetails, |s| {
            s.set_recipient("@mark.sei");
            s.set_amount("10");
            Ok(())
        })
        .await
        .unwrap();

        let err = edit_session(user, Step::ProtectionOptions, |s| {
            s.set_with_password(true);
            Ok(())
        })
        .await
        .unwrap_err();
        assert_eq!(err, WizardError::WrongStep { action: "edit", step: 1 });

        with_wizard(user, |w| w.proceed()).await.unwrap();
        let wizard = edit_session(user, Step::ProtectionOptions, |s| {
            s.set_with_password(true);
            s.set_password(Some("pw".to_string()));
            Ok(())
        })
        .await
        .unwrap();
        assert!(wizard.session().with_password());
        assert!(cancel(user).await);
    }

    #[tokio::test]
    async fn test_start_keeps_running_wizard() {
        let user = UserId::new(5_003);
        start(user).await;
        with_wizard(user, |w| {
            w.next();
            Ok(())
        })
        .await
        .unwrap();
        assert_eq!(start(user).await.step(), Step::ProtectionOptions);
        cancel(user).await;
        assert_eq!(start(user).await.step(), Step::RecipientDetails);
        cancel(user).await;
    }

    #[tokio::test]
    async fn test_confirm_through_store() {
        let gw = SimulatedGateway::new("truststream.app", false);
        let user = UserId::new(5_004);
        start(user).await;
        edit_session(user, Step::RecipientDetails, |s| {
            s.set_recipient("@alice.sei");
            s.set_amount("10");
            s.set_transfer_type(TransferType::Direct);
            Ok(())
        })
        .await
        .unwrap();
        with_wizard(user, |w| w.proceed()).await.unwrap();
        with_wizard(user, |w| w.proceed()).await.unwrap();

        let (wizard, outcome) = confirm(user, &gw).await.unwrap();
        assert_eq!(wizard.step(), Step::Success);
        assert!(outcome.notice.is_some());
        assert_eq!(wizard.session().total_with_fee().as_deref(), Some("10.001"));
        cancel(user).await;
    }

    struct HeldGateway {
        release: tokio::sync::Notify,
    }

    #[serenity::async_trait]
    impl PaymentGateway for HeldGateway {
        async fn submit_transfer(
            &self,
            _request: &crate::services::gateway::TransferRequest,
        ) -> Result<crate::services::gateway::TransferReceipt, GatewayError> {
            self.release.notified().await;
            Ok(crate::services::gateway::TransferReceipt {
                transfer_id: "held".to_string(),
                claim_id: "held".to_string(),
                claim_link: "https://truststream.app/claim/held".to_string(),
            })
        }

        async fn verify_claim_password(&self, _claim_id: &str, _password: &str) -> Result<bool, GatewayError> {
            unreachable!()
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

    fn wizard_on_confirm() -> TransferWizard {
        let mut wizard = TransferWizard::new();
        wizard.session_mut().set_recipient("@alice.sei");
        wizard.session_mut().set_amount("10");
        wizard.proceed().unwrap();
        wizard.proceed().unwrap();
        wizard
    }

    #[tokio::test]
    async fn test_submission_does_not_block_other_users() {
        let (a, b) = (UserId::new(5_101), UserId::new(5_102));
        let wizards = Mutex::new(HashMap::from([(a, wizard_on_confirm()), (b, TransferWizard::new())]));
        let gw = HeldGateway { release: tokio::sync::Notify::new() };

        let confirming = confirm_in(&wizards, a, &gw);
        let other_user = async {
            let edited = with_wizard_in(&wizards, b, |w| {
                w.session_mut().set_recipient("@bob.sei");
                Ok(w.session().recipient().to_string())
            })
            .await;
            let own = with_wizard_in(&wizards, a, |_| Ok(())).await;
            gw.release.notify_one();
            (edited, own)
        };
        let (confirmed, (edited, own)) = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            async { tokio::join!(confirming, other_user) },
        )
        .await
        .expect("wizard store stayed locked during a submission");

        assert_eq!(edited.unwrap(), "@bob.sei");
        assert_eq!(own.unwrap_err(), WizardError::SubmissionPending);
        let (wizard, outcome) = confirmed.unwrap();
        assert_eq!(wizard.step(), Step::Success);
        assert_eq!(outcome.receipt.transfer_id, "held");
        assert!(!wizard.is_submitting());
    }
}
