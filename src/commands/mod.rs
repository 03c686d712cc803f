pub mod claim;
pub mod faucet;
pub mod help;
pub mod profile;
pub mod register;
pub mod stream;
pub mod tokens;
pub mod transfer;

use std::sync::Arc;

use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;
use tracing::{debug, error, warn};

use crate::services::gateway::SimulatedGateway;
use crate::utils::{check_cooldown, check_global_rate_limit};

/// Gateway stored in the client data at startup
pub async fn gateway(ctx: &Context) -> Result<Arc<SimulatedGateway>, String> {
    let data = ctx.data.read().await;
    data.get::<crate::GatewayHandle>()
        .cloned()
        .ok_or_else(|| "Payment gateway not found".to_string())
}

/// Send a single embed to the channel the message came from
pub async fn reply(ctx: &Context, msg: &Message, embed: CreateEmbed) -> Result<(), String> {
    msg.channel_id
        .send_message(ctx, CreateMessage::default().embed(embed))
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}

/// Commands that hand `args` straight to a wizard share one cooldown key per subcommand
fn cooldown_key(command: &str, args: &[&str]) -> String {
    match args.first() {
        Some(sub) => format!("{} {}", command, sub.to_lowercase()),
        None => command.to_string(),
    }
}

pub async fn handle_message(ctx: &Context, msg: &Message) {
    if msg.author.bot {
        return;
    }

    let parts: Vec<&str> = msg.content.split_whitespace().collect();
    let Some((&command, args)) = parts.split_first() else {
        return;
    };
    let command = command.to_lowercase();
    if !command.starts_with('$') {
        return;
    }

    let known = matches!(
        command.as_str(),
        "$help" | "$tokens" | "$transfer" | "$send" | "$stream" | "$streams" | "$claims" | "$claim"
            | "$faucet" | "$register" | "$profile"
    );
    if !known {
        return;
    }

    if let Err(remaining_ms) = check_global_rate_limit().await {
        warn!("Global rate limit hit, dropping {} ({} ms left in window)", command, remaining_ms);
        return;
    }

    if let Err((remaining, should_warn)) = check_cooldown(msg.author.id, &cooldown_key(&command, args)).await {
        debug!("User {} on cooldown for {} ({}s)", msg.author.id, command, remaining);
        if should_warn {
            let embed = CreateEmbed::default()
                .title("Command Cooldown")
                .description(format!(
                    "⏳ Please wait {} second{} before using this command again.",
                    remaining,
                    if remaining == 1 { "" } else { "s" }
                ))
                .color(0xffa500);
            let _ = reply(ctx, msg, embed).await;
        }
        return;
    }

    let result = match command.as_str() {
        "$help" => help::execute(ctx, msg).await,
        "$tokens" => tokens::execute(ctx, msg).await,
        "$transfer" | "$send" => transfer::execute(ctx, msg, args).await,
        "$stream" | "$streams" => stream::execute(ctx, msg, args).await,
        "$claims" => claim::list(ctx, msg).await,
        "$claim" => claim::execute(ctx, msg, args).await,
        "$faucet" => faucet::execute(ctx, msg, args).await,
        "$register" => register::execute(ctx, msg, args).await,
        "$profile" => profile::execute(ctx, msg).await,
        _ => return,
    };

    if let Err(e) = result {
        error!("Error executing command {}: {}", command, e);

        let user_message = if e.contains("429") || e.contains("rate limit") {
            "⚠️ **Rate Limited**: Discord is rate limiting us. Please try again in a moment.".to_string()
        } else if e.contains("HTTP request") {
            "⚠️ **Network Error**: Having trouble connecting to Discord. Please try again.".to_string()
        } else if e.is_empty() {
            "❌ An error occurred while executing the command.".to_string()
        } else {
            format!("❌ {}", e)
        };

        let embed = CreateEmbed::default()
            .title("Command Error")
            .description(user_message)
            .color(0xff0000);
        let _ = reply(ctx, msg, embed).await;
    }
}
