//! Transfer session state shared by the wizard steps

use std::fmt;
use std::str::FromStr;

use super::duration::{Duration, DurationUnit};
use super::token::{default_token, TokenRef};

pub const TRANSFER_FEE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Direct,
    Claim,
}

impl TransferType {
    pub fn method_label(self) -> &'static str {
        match self {
            TransferType::Direct => "Direct Transfer",
            TransferType::Claim => "Claim via Link/QR",
        }
    }

    pub fn password_hint(self) -> &'static str {
        match self {
            TransferType::Direct => "Recipient must enter a password to receive funds",
            TransferType::Claim => "Recipient must enter a password to claim funds",
        }
    }

    pub fn success_summary(self) -> (&'static str, &'static str) {
        match self {
            TransferType::Direct => ("direct transfer", "sent"),
            TransferType::Claim => ("protected transfer", "created"),
        }
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferType::Direct => f.write_str("direct"),
            TransferType::Claim => f.write_str("claim"),
        }
    }
}

impl FromStr for TransferType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "direct" => Ok(TransferType::Direct),
            "claim" | "link" | "qr" => Ok(TransferType::Claim),
            other => Err(format!("Unknown transfer method '{}'. Use `direct` or `claim`", other)),
        }
    }
}

/// Field-by-field state of one transfer. No validation happens here;
/// each wizard step checks what it needs before moving on.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferSession {
    recipient: String,
    amount: String,
    note: Option<String>,
    with_timeout: bool,
    timeout_value: u32,
    timeout_unit: DurationUnit,
    with_password: bool,
    password: Option<String>,
    selected_token: TokenRef,
    transfer_type: TransferType,
    transfer_link: Option<String>,
}

impl Default for TransferSession {
    fn default() -> Self {
        TransferSession {
            recipient: String::new(),
            amount: String::new(),
            note: None,
            with_timeout: false,
            timeout_value: 24,
            timeout_unit: DurationUnit::Hours,
            with_password: false,
            password: None,
            selected_token: default_token(),
            transfer_type: TransferType::Claim,
            transfer_link: None,
        }
    }
}

impl TransferSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn set_recipient(&mut self, value: impl Into<String>) {
        self.recipient = value.into();
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn set_amount(&mut self, value: impl Into<String>) {
        self.amount = value.into();
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn set_note(&mut self, value: Option<String>) {
        self.note = value.filter(|n| !n.is_empty());
    }

    pub fn with_timeout(&self) -> bool {
        self.with_timeout
    }

    pub fn set_with_timeout(&mut self, value: bool) {
        self.with_timeout = value;
    }

    pub fn timeout_value(&self) -> u32 {
        self.timeout_value
    }

    pub fn set_timeout_value(&mut self, value: u32) {
        self.timeout_value = value;
    }

    pub fn timeout_unit(&self) -> DurationUnit {
        self.timeout_unit
    }

    pub fn set_timeout_unit(&mut self, unit: DurationUnit) {
        self.timeout_unit = unit;
    }

    pub fn with_password(&self) -> bool {
        self.with_password
    }

    pub fn set_with_password(&mut self, value: bool) {
        self.with_password = value;
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn set_password(&mut self, value: Option<String>) {
        self.password = value;
    }

    pub fn selected_token(&self) -> &TokenRef {
        &self.selected_token
    }

    pub fn set_selected_token(&mut self, token: TokenRef) {
        self.selected_token = token;
    }

    pub fn transfer_type(&self) -> TransferType {
        self.transfer_type
    }

    pub fn set_transfer_type(&mut self, value: TransferType) {
        self.transfer_type = value;
    }

    pub fn transfer_link(&self) -> Option<&str> {
        self.transfer_link.as_deref()
    }

    pub fn set_transfer_link(&mut self, link: Option<String>) {
        self.transfer_link = link;
    }

    pub fn timeout(&self) -> Duration {
        Duration::new(self.timeout_value, self.timeout_unit)
    }

    /// "1 hour" / "24 hours"
    pub fn format_timeout(&self) -> String {
        self.timeout().pluralized()
    }

    /// Timeout only when the auto-refund toggle is on
    pub fn effective_timeout(&self) -> Option<Duration> {
        self.with_timeout.then(|| self.timeout())
    }

    /// Password only when protection is on
    pub fn effective_password(&self) -> Option<&str> {
        if self.with_password {
            self.password()
        } else {
            None
        }
    }

    /// `amount + fee` to three decimals, e.g. "10" -> "10.001"
    pub fn total_with_fee(&self) -> Option<String> {
        let amount: f64 = self.amount.trim().parse().ok()?;
        Some(format!("{:.3}", amount + TRANSFER_FEE))
    }
}
