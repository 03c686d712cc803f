//! Pending claim models

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct PendingClaim {
    pub id: String,
    pub sender: String,
    pub amount: String,
    pub note: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub password_protected: bool,
}

impl PendingClaim {
    /// "23h 59m" until expiry
    pub fn time_remaining(&self, now: DateTime<Utc>) -> String {
        let remaining = self.expires_at - now;
        let hours = remaining.num_hours();
        let minutes = remaining.num_minutes() % 60;
        format!("{}h {}m", hours, minutes)
    }
}

/// What a scanned QR payload turned out to be
#[derive(Debug, Clone, PartialEq)]
pub enum ScanResult {
    Claim(String),
    Profile(super::profile::ProfilePayload),
}

/// Result of a successful claim
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimResult {
    pub claim_id: String,
    pub sender: String,
    pub amount: String,
}
