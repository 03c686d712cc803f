use std::env;

pub const DEFAULT_APP_HOST: &str = "truststream.app";
const DEFAULT_COOLDOWN_SECONDS: u64 = 2;

/// Runtime settings read from the environment (after `.env` is loaded)
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub app_host: String,
    pub simulate_latency: bool,
    pub cooldown_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| "DISCORD_TOKEN not set".to_string())?;

        let app_host = env::var("APP_HOST")
            .ok()
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_APP_HOST.to_string());

        let simulate_latency = match env::var("STRAPT_SIMULATE_LATENCY") {
            Ok(v) => parse_flag(&v)
                .ok_or_else(|| format!("STRAPT_SIMULATE_LATENCY must be true or false, got '{}'", v))?,
            Err(_) => true,
        };

        let cooldown_seconds = match env::var("STRAPT_COOLDOWN_SECONDS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|_| format!("STRAPT_COOLDOWN_SECONDS must be a number, got '{}'", v))?,
            Err(_) => DEFAULT_COOLDOWN_SECONDS,
        };

        Ok(Config {
            discord_token,
            app_host,
            simulate_latency,
            cooldown_seconds,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
