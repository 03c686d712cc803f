use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use serenity::model::id::UserId;
use tokio::sync::Mutex;

const DEFAULT_COOLDOWN_SECONDS: u64 = 2;
const GLOBAL_RATE_LIMIT: usize = 50; // requests per second
const RATE_WINDOW_MS: u64 = 1000;

static COOLDOWN_SECONDS: OnceLock<u64> = OnceLock::new();

lazy_static! {
    static ref THROTTLE: Mutex<Throttle> = Mutex::new(Throttle::default());
}

/// Per-user command cooldowns plus a sliding one-second window shared by everyone
#[derive(Debug, Default)]
pub struct Throttle {
    last_used: HashMap<(UserId, String), u64>,
    // Last time a user was told about a cooldown, so retries stay silent
    warned: HashMap<(UserId, String), u64>,
    requests: Vec<u64>,
}

impl Throttle {
    /// `Err((remaining_seconds, should_warn))` while the key is cooling down.
    /// Only the first violation in a cooldown period asks for a warning.
    pub fn check_cooldown(
        &mut self,
        user_id: UserId,
        command: &str,
        cooldown: u64,
        now_secs: u64,
    ) -> Result<(), (u64, bool)> {
        let key = (user_id, command.to_string());

        if let Some(&last) = self.last_used.get(&key) {
            let elapsed = now_secs.saturating_sub(last);
            if elapsed < cooldown {
                let should_warn = self.warned.get(&key).map_or(true, |&w| w < last);
                if should_warn {
                    self.warned.insert(key, now_secs);
                }
                return Err((cooldown - elapsed, should_warn));
            }
        }

        self.last_used.insert(key, now_secs);
        Ok(())
    }

    /// `Err(remaining_ms)` once the window already holds the global limit
    pub fn check_global(&mut self, now_ms: u64) -> Result<(), u64> {
        let window_start = now_ms.saturating_sub(RATE_WINDOW_MS);
        self.requests.retain(|&t| t > window_start);

        if let Some(&oldest) = self.requests.first() {
            if self.requests.len() >= GLOBAL_RATE_LIMIT {
                return Err((oldest + RATE_WINDOW_MS).saturating_sub(now_ms));
            }
        }
        self.requests.push(now_ms);
        Ok(())
    }
}

/// Set the per-command cooldown once at startup
pub fn configure_cooldown(seconds: u64) {
    let _ = COOLDOWN_SECONDS.set(seconds);
}

pub fn get_cooldown_seconds() -> u64 {
    COOLDOWN_SECONDS.get().copied().unwrap_or(DEFAULT_COOLDOWN_SECONDS)
}

fn now() -> std::time::Duration {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default()
}

pub async fn check_cooldown(user_id: UserId, command: &str) -> Result<(), (u64, bool)> {
    THROTTLE
        .lock()
        .await
        .check_cooldown(user_id, command, get_cooldown_seconds(), now().as_secs())
}

pub async fn check_global_rate_limit() -> Result<(), u64> {
    THROTTLE.lock().await.check_global(now().as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_warns_once_per_period() {
        let mut throttle = Throttle::default();
        let user = UserId::new(11);

        assert!(throttle.check_cooldown(user, "stream", 2, 100).is_ok());
        assert_eq!(throttle.check_cooldown(user, "stream", 2, 100), Err((2, true)));
        assert_eq!(throttle.check_cooldown(user, "stream", 2, 101), Err((1, false)));

        // a different command is tracked separately
        assert!(throttle.check_cooldown(user, "claims", 2, 101).is_ok());

        assert!(throttle.check_cooldown(user, "stream", 2, 102).is_ok());
        assert_eq!(throttle.check_cooldown(user, "stream", 2, 102), Err((2, true)));
    }

    #[test]
    fn test_global_window() {
        let mut throttle = Throttle::default();
        for i in 0..GLOBAL_RATE_LIMIT as u64 {
            assert!(throttle.check_global(10_000 + i).is_ok());
        }
        assert_eq!(throttle.check_global(10_100), Err(900));
        assert!(throttle.check_global(11_001).is_ok());
    }
}
