use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::models::token::FAUCET_TOKENS;
use crate::services::faucet_service;

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    if args.first().map(|a| a.eq_ignore_ascii_case("help")).unwrap_or(false) {
        let symbols: Vec<&str> = FAUCET_TOKENS.iter().map(|t| t.symbol).collect();
        let embed = CreateEmbed::default()
            .title("💧 Testnet Faucet")
            .description("Get free testnet tokens to try TrustStream")
            .field("Usage", "`$faucet [TOKEN]` (defaults to SEI)", false)
            .field("Tokens", symbols.join(", "), false)
            .color(0x00b0f4);
        return super::reply(ctx, msg, embed).await;
    }

    let gateway = super::gateway(ctx).await?;
    let result = faucet_service::claim(msg.author.id, &*gateway, args.first().copied())
        .await
        .map_err(|e| e.to_string())?;

    super::reply(ctx, msg, faucet_service::create_faucet_embed(&result)).await
}
