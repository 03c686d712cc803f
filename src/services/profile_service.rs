use chrono::{DateTime, SecondsFormat, Utc};
use serenity::builder::CreateEmbed;

use crate::models::{ProfilePayload, RegisteredIdentity};
use crate::utils::links::truncate_address;

const GUEST_USERNAME: &str = "@trustuser.sei";
const NOT_CONNECTED: &str = "Not connected";

/// Data encoded in the profile QR code
pub fn profile_payload(identity: Option<&RegisteredIdentity>, now: DateTime<Utc>) -> ProfilePayload {
    let (address, username) = match identity {
        Some(id) => (id.wallet_address.clone(), id.handle()),
        None => (NOT_CONNECTED.to_string(), GUEST_USERNAME.to_string()),
    };
    ProfilePayload {
        address,
        username,
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

pub fn qr_value(payload: &ProfilePayload) -> Result<String, String> {
    serde_json::to_string(payload).map_err(|e| format!("Failed to encode profile: {}", e))
}

pub fn create_profile_embed(payload: &ProfilePayload, qr: &str) -> CreateEmbed {
    let address = if payload.address == NOT_CONNECTED {
        payload.address.clone()
    } else {
        truncate_address(&payload.address)
    };

    let mut embed = CreateEmbed::default()
        .title(format!("👤 {}", payload.username))
        .field("Wallet", address, true)
        .field("QR Payload", format!("```json\n{}\n```", qr), false)
        .color(0x00b0f4);

    if payload.address == NOT_CONNECTED {
        embed = embed.footer(serenity::builder::CreateEmbedFooter::new(
            "Register a username with `$register <username>` to get a wallet",
        ));
    }
    embed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_payload_json_shape() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap();
        let identity = RegisteredIdentity {
            username: "carol".to_string(),
            wallet_address: "sei1deadbeef".to_string(),
        };
        let payload = profile_payload(Some(&identity), now);
        let json = qr_value(&payload).unwrap();
        assert_eq!(
            json,
            r#"{"address":"sei1deadbeef","username":"@carol.sei","timestamp":"2026-10-19T09:30:00.000Z"}"#
        );

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["username"], "@carol.sei");
    }

    #[test]
    fn test_guest_payload() {
        let payload = profile_payload(None, Utc::now());
        assert_eq!(payload.username, "@trustuser.sei");
        assert_eq!(payload.address, "Not connected");
    }
}
