//! Four-step protected transfer wizard
//!
//! The controller owns the step index and the [`TransferSession`]; step views
//! receive the session explicitly and the controller decides what happens on
//! continue/back/confirm.

use tracing::{debug, info};

use crate::models::TransferSession;
use crate::models::{Operation, TransferType};
use crate::services::gateway::{PaymentGateway, TransferReceipt, TransferRequest};
use crate::utils::errors::{GatewayError, WizardError};

pub const MIN_AMOUNT: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    RecipientDetails = 1,
    ProtectionOptions = 2,
    Confirm = 3,
    Success = 4,
}

impl Step {
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::RecipientDetails => "Protected Transfer",
            Step::ProtectionOptions => "Protection Options",
            Step::Confirm => "Confirm Transfer",
            Step::Success => "Transfer Created",
        }
    }

    fn following(self) -> Option<Step> {
        match self {
            Step::RecipientDetails => Some(Step::ProtectionOptions),
            Step::ProtectionOptions => Some(Step::Confirm),
            Step::Confirm => Some(Step::Success),
            Step::Success => None,
        }
    }

    fn preceding(self) -> Option<Step> {
        match self {
            Step::ProtectionOptions => Some(Step::RecipientDetails),
            Step::Confirm => Some(Step::ProtectionOptions),
            Step::RecipientDetails | Step::Success => None,
        }
    }
}

/// Toast raised by the controller
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmOutcome {
    pub receipt: TransferReceipt,
    /// Only direct transfers notify; claim transfers show their link on the success step
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone)]
pub struct TransferWizard {
    step: Step,
    session: TransferSession,
    submission: Operation<()>,
}

impl Default for TransferWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferWizard {
    pub fn new() -> Self {
        TransferWizard {
            step: Step::RecipientDetails,
            session: TransferSession::new(),
            submission: Operation::Idle,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn session(&self) -> &TransferSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut TransferSession {
        &mut self.session
    }

    /// Back control is shown on steps 2 and 3 only
    pub fn can_go_back(&self) -> bool {
        self.step().preceding().is_some()
    }

    /// Move one step forward. Returns false at the last step.
    pub fn next(&mut self) -> bool {
        match self.step().following() {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    /// Move one step back. A no-op outside steps 2-3.
    pub fn prev(&mut self) -> bool {
        match self.step().preceding() {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    /// Start over at step 1. The session keeps whatever was entered.
    pub fn reset(&mut self) {
        self.step = Step::RecipientDetails;
    }

    /// The "Continue" control on steps 1 and 2
    pub fn proceed(&mut self) -> Result<Step, WizardError> {
        match self.step() {
            Step::RecipientDetails => validate_recipient_details(&self.session)?,
            Step::ProtectionOptions => validate_protection_options(&self.session)?,
            step => {
                return Err(WizardError::WrongStep { action: "next", step: step.number() });
            }
        }
        self.next();
        debug!("Transfer wizard advanced to step {}", self.step().number());
        Ok(self.step())
    }

    /// True while a confirmed transfer is waiting on the gateway
    pub fn is_submitting(&self) -> bool {
        self.submission.is_pending()
    }

    /// Reserve the submission and build the request from the confirmation step
    pub fn begin_confirm(&mut self) -> Result<TransferRequest, WizardError> {
        if self.step() != Step::Confirm {
            return Err(WizardError::WrongStep { action: "confirm", step: self.step().number() });
        }
        if !self.submission.begin() {
            return Err(WizardError::SubmissionPending);
        }
        Ok(TransferRequest {
            recipient: self.session.recipient().to_string(),
            amount: self.session.amount().to_string(),
            token: self.session.selected_token().symbol.to_string(),
            transfer_type: self.session.transfer_type(),
            timeout_seconds: self.session.effective_timeout().map(|d| d.as_seconds()),
            password_protected: self.session.effective_password().is_some(),
        })
    }

    /// Store the gateway's receipt and move to the success step
    pub fn finish_confirm(
        &mut self,
        request: &TransferRequest,
        receipt: Result<TransferReceipt, GatewayError>,
    ) -> Result<ConfirmOutcome, WizardError> {
        let receipt = match receipt {
            Ok(receipt) => receipt,
            Err(e) => {
                self.submission.finish(Err(e.clone()));
                return Err(e.into());
            }
        };
        self.submission.finish::<String>(Ok(()));
        self.session.set_transfer_link(Some(receipt.claim_link.clone()));

        let notice = match self.session.transfer_type() {
            TransferType::Direct => Some(Notice {
                title: "Transfer Successful".to_string(),
                description: "Your direct transfer has been sent".to_string(),
            }),
            TransferType::Claim => None,
        };

        info!(
            "Transfer {} created ({} {} to {})",
            receipt.transfer_id, request.amount, request.token, request.recipient
        );
        self.next();
        Ok(ConfirmOutcome { receipt, notice })
    }

    /// Submit the transfer from the confirmation step and move to success
    pub async fn confirm<G: PaymentGateway + ?Sized>(&mut self, gateway: &G) -> Result<ConfirmOutcome, WizardError> {
        let request = self.begin_confirm()?;
        let receipt = gateway.submit_transfer(&request).await;
        self.finish_confirm(&request, receipt)
    }
}

fn validate_recipient_details(session: &TransferSession) -> Result<(), WizardError> {
    if session.recipient().trim().is_empty() {
        return Err(WizardError::MissingRecipient);
    }
    let amount = parse_amount(session.amount())?;
    if amount < MIN_AMOUNT {
        return Err(WizardError::AmountTooSmall);
    }
    Ok(())
}

fn validate_protection_options(session: &TransferSession) -> Result<(), WizardError> {
    if session.with_timeout() && session.timeout_value() == 0 {
        return Err(WizardError::TimeoutTooShort);
    }
    if session.with_password() && session.password().map_or(true, |p| p.is_empty()) {
        return Err(WizardError::MissingPassword);
    }
    Ok(())
}

fn parse_amount(amount: &str) -> Result<f64, WizardError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(WizardError::AmountTooSmall);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite())
        .ok_or_else(|| WizardError::InvalidAmount(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::gateway::SimulatedGateway;

    fn filled_wizard(transfer_type: TransferType) -> TransferWizard {
        let mut wizard = TransferWizard::new();
        let session = wizard.session_mut();
        session.set_recipient("@mark.sei");
        session.set_amount("10");
        session.set_transfer_type(transfer_type);
        wizard
    }

    #[test]
    fn test_next_three_times_reaches_success() {
        let mut wizard = TransferWizard::new();
        assert_eq!(wizard.step(), Step::RecipientDetails);
        assert!(wizard.next());
        assert!(wizard.next());
        assert!(wizard.next());
        assert_eq!(wizard.step(), Step::Success);
        assert!(!wizard.next());
    }

    #[test]
    fn test_prev_only_on_middle_steps() {
        let mut wizard = TransferWizard::new();
        assert!(!wizard.can_go_back());
        assert!(!wizard.prev());
        assert_eq!(wizard.step(), Step::RecipientDetails);

        wizard.next();
        wizard.next();
        assert!(wizard.can_go_back());
        assert!(wizard.prev());
        assert_eq!(wizard.step(), Step::ProtectionOptions);

        wizard.next();
        wizard.next();
        assert!(!wizard.can_go_back());
        assert!(!wizard.prev());
        assert_eq!(wizard.step(), Step::Success);
    }

    #[test]
    fn test_continue_requires_recipient_and_amount() {
        let mut wizard = TransferWizard::new();
        assert_eq!(wizard.proceed(), Err(WizardError::MissingRecipient));

        wizard.session_mut().set_recipient("@alice.sei");
        assert_eq!(wizard.proceed(), Err(WizardError::AmountTooSmall));

        wizard.session_mut().set_amount("0.009");
        assert_eq!(wizard.proceed(), Err(WizardError::AmountTooSmall));

        wizard.session_mut().set_amount("ten");
        assert_eq!(wizard.proceed(), Err(WizardError::InvalidAmount("ten".to_string())));

        wizard.session_mut().set_amount("0.01");
        assert_eq!(wizard.proceed(), Ok(Step::ProtectionOptions));
    }

    #[test]
    fn test_protection_options_are_orthogonal() {
        let mut wizard = filled_wizard(TransferType::Claim);
        wizard.proceed().unwrap();

        wizard.session_mut().set_with_password(true);
        assert_eq!(wizard.proceed(), Err(WizardError::MissingPassword));
        wizard.session_mut().set_password(Some("secret".to_string()));

        wizard.session_mut().set_with_timeout(true);
        wizard.session_mut().set_timeout_value(0);
        assert_eq!(wizard.proceed(), Err(WizardError::TimeoutTooShort));
        wizard.session_mut().set_timeout_value(2);

        assert_eq!(wizard.proceed(), Ok(Step::Confirm));
        assert!(wizard.session().effective_password().is_some());
        assert!(wizard.session().effective_timeout().is_some());
    }

    #[test]
    fn test_continue_not_offered_on_confirm() {
        let mut wizard = filled_wizard(TransferType::Claim);
        wizard.proceed().unwrap();
        wizard.proceed().unwrap();
        assert_eq!(
            wizard.proceed(),
            Err(WizardError::WrongStep { action: "next", step: 3 })
        );
    }

    #[tokio::test]
    async fn test_confirm_direct_notifies() {
        let gateway = SimulatedGateway::new("truststream.app", false);
        let mut wizard = filled_wizard(TransferType::Direct);
        wizard.proceed().unwrap();
        wizard.proceed().unwrap();

        let outcome = wizard.confirm(&gateway).await.unwrap();
        assert_eq!(wizard.step(), Step::Success);
        assert_eq!(outcome.notice.map(|n| n.title), Some("Transfer Successful".to_string()));
        assert_eq!(wizard.session().transfer_link(), Some(outcome.receipt.claim_link.as_str()));
    }

    #[tokio::test]
    async fn test_confirm_claim_stores_link_without_notice() {
        let gateway = SimulatedGateway::new("truststream.app", false);
        let mut wizard = filled_wizard(TransferType::Claim);
        wizard.proceed().unwrap();
        wizard.proceed().unwrap();

        let outcome = wizard.confirm(&gateway).await.unwrap();
        assert!(outcome.notice.is_none());
        let link = wizard.session().transfer_link().unwrap();
        assert!(link.starts_with("https://truststream.app/claim/"));
    }

    #[tokio::test]
    async fn test_confirm_only_from_confirm_step() {
        let gateway = SimulatedGateway::new("truststream.app", false);
        let mut wizard = filled_wizard(TransferType::Claim);
        let err = wizard.confirm(&gateway).await.unwrap_err();
        assert_eq!(err, WizardError::WrongStep { action: "confirm", step: 1 });
        assert!(wizard.session().transfer_link().is_none());
    }

    #[test]
    fn test_second_confirm_refused_while_submitting() {
        let mut wizard = filled_wizard(TransferType::Direct);
        wizard.proceed().unwrap();
        wizard.proceed().unwrap();

        let request = wizard.begin_confirm().unwrap();
        assert!(wizard.is_submitting());
        assert_eq!(wizard.begin_confirm().unwrap_err(), WizardError::SubmissionPending);

        let err = wizard
            .finish_confirm(&request, Err(GatewayError::Unavailable("timeout".to_string())))
            .unwrap_err();
        assert!(matches!(err, WizardError::Gateway(_)));
        assert!(!wizard.is_submitting());
        assert_eq!(wizard.step(), Step::Confirm);
        assert!(wizard.begin_confirm().is_ok());
    }

    #[tokio::test]
    async fn test_reset_keeps_session() {
        let gateway = SimulatedGateway::new("truststream.app", false);
        let mut wizard = filled_wizard(TransferType::Claim);
        wizard.proceed().unwrap();
        wizard.proceed().unwrap();
        wizard.confirm(&gateway).await.unwrap();

        wizard.reset();
        assert_eq!(wizard.step(), Step::RecipientDetails);
        assert_eq!(wizard.session().recipient(), "@mark.sei");
        assert!(wizard.session().transfer_link().is_some());
    }
}
