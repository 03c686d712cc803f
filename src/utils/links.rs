//! Client-generated identifiers and claim links.
//!
//! None of these are verifiable or guaranteed unique; they only stand in for
//! what a chain client would hand back.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;

/// Opaque claim id: 6 random bytes, URL-safe base64 (8 chars)
pub fn opaque_claim_id() -> String {
    let mut bytes = [0u8; 6];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn transfer_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// `https://<host>/claim/<id>`
pub fn claim_link(host: &str, claim_id: &str) -> String {
    format!("https://{}/claim/{}", host.trim_end_matches('/'), claim_id)
}

/// Mock bech32-looking wallet address: `sei1` + 38 hex chars
pub fn wallet_address() -> String {
    let mut bytes = [0u8; 19];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("sei1{}", hex::encode(bytes))
}

/// "sei14z...8xct"
pub fn truncate_address(address: &str) -> String {
    let len = address.chars().count();
    if len <= 10 {
        return address.to_string();
    }
    let head: String = address.chars().take(6).collect();
    let tail: String = address.chars().skip(len - 4).collect();
    format!("{}...{}", head, tail)
}

/// Extract the claim id from a URL shaped like `<scheme>://<host>/.../claim/<id>`.
///
/// `Err(())` means the text is not a URL at all, `Ok(None)` that it is a
/// URL without a claim path.
pub fn claim_id_from_url(text: &str) -> Result<Option<String>, ()> {
    let text = text.trim();
    let rest = text
        .strip_prefix("https://")
        .or_else(|| text.strip_prefix("http://"))
        .ok_or(())?;

    let (host, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, "/"),
    };
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(());
    }

    // Query and fragment are not part of the path
    let path = path.split(['?', '#']).next().unwrap_or("");

    match path.split_once("/claim/") {
        Some((_, id)) => {
            let id = id.trim_end_matches('/');
            Ok((!id.is_empty()).then(|| id.to_string()))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_link_shape() {
        let id = opaque_claim_id();
        assert_eq!(id.len(), 8);
        let link = claim_link("truststream.app/", &id);
        assert_eq!(link, format!("https://truststream.app/claim/{}", id));
    }

    #[test]
    fn test_wallet_address_shape() {
        let addr = wallet_address();
        assert!(addr.starts_with("sei1"));
        assert_eq!(addr.len(), 42);
        assert_eq!(truncate_address(&addr).len(), 13);
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate_address("aéééééééééé"), "aééééé...éééé");
        assert_eq!(truncate_address("sei1ü"), "sei1ü");
    }

    #[test]
    fn test_claim_id_from_url() {
        assert_eq!(
            claim_id_from_url("https://truststream.app/claim/tx1234"),
            Ok(Some("tx1234".to_string()))
        );
        assert_eq!(
            claim_id_from_url("http://localhost:8080/app/claim/abc?ref=qr"),
            Ok(Some("abc".to_string()))
        );
        assert_eq!(claim_id_from_url("https://truststream.app/streams"), Ok(None));
        assert_eq!(claim_id_from_url("https://truststream.app/claim/"), Ok(None));
        assert_eq!(claim_id_from_url("not a url"), Err(()));
        assert_eq!(claim_id_from_url("{\"address\":\"sei1\"}"), Err(()));
    }
}
