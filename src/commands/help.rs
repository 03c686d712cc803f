use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::utils::get_cooldown_seconds;

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let embed = CreateEmbed::default()
        .title("📖 TrustStream Commands")
        .description("Protected transfers, payment streams and claims on SEI")
        .color(0x00b0f4)
        .field(
            "🎯 General",
            "`$help` - Show this help message\n`$tokens` - Tokens you can send",
            false,
        )
        .field(
            "🛡️ Protected Transfer",
            "`$transfer` - Open the transfer wizard\n\
             `$transfer to|amount|token|note|method ...` - Recipient details\n\
             `$transfer timeout|password ...` - Protection options\n\
             `$transfer next|back|confirm|reset|cancel` - Move through the steps",
            false,
        )
        .field(
            "📊 Streams",
            "`$stream [active|completed]` - List streams\n\
             `$stream view <ID>` - Stream details and milestones\n\
             `$stream pause|resume|stop <ID>` - Control a stream\n\
             `$stream release <ID> <MILESTONE>` - Release a reached milestone\n\
             `$stream new` - Create a stream (`to`, `amount`, `token`, `duration`, `milestone`, `start`)",
            false,
        )
        .field(
            "📥 Claims",
            "`$claims` - Pending claims\n\
             `$claim <ID> [password]` - Claim a transfer\n\
             `$claim link|qr <ID>` - Share a claim\n\
             `$claim scan <payload>` - Read a scanned QR code",
            false,
        )
        .field(
            "👤 Account",
            "`$register <username>` - Register @username.sei\n\
             `$register wallet|back|done` - Continue registration\n\
             `$profile` - Your profile QR payload\n\
             `$faucet [TOKEN]` - Claim testnet tokens",
            false,
        )
        .field(
            "⚡ Rate Limiting",
            format!(
                "{}-second cooldown per command per user\nGlobal 50 requests/second limit",
                get_cooldown_seconds()
            ),
            false,
        );

    msg.channel_id
        .send_message(ctx, serenity::builder::CreateMessage::default().embed(embed))
        .await
        .map_err(|e| format!("Failed to send help message: {}", e))?;

    Ok(())
}
