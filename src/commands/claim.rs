use chrono::Utc;
use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::models::ScanResult;
use crate::services::claim_service::{self, ClaimAttempt};
use crate::services::gateway::PaymentGateway;
use crate::utils::links;

pub async fn list(ctx: &Context, msg: &Message) -> Result<(), String> {
    let now = Utc::now();
    let claims = claim_service::pending_claims(now);
    super::reply(ctx, msg, claim_service::create_claims_embed(&claims, now)).await
}

async fn attempt_embed<G: PaymentGateway + ?Sized>(
    msg: &Message,
    gateway: &G,
    claim_id: &str,
    password: Option<&str>,
) -> Result<CreateEmbed, String> {
    let attempt = claim_service::claim(msg.author.id, gateway, claim_id, password)
        .await
        .map_err(|e| e.to_string())?;
    Ok(match attempt {
        ClaimAttempt::Claimed(result) => claim_service::create_claimed_embed(&result),
        ClaimAttempt::PasswordRequired(claim) => claim_service::create_password_prompt_embed(&claim),
    })
}

fn share_embed(title: &str, claim_id: &str, link: &str) -> CreateEmbed {
    CreateEmbed::default()
        .title(title)
        .description(format!("`{}`", link))
        .footer(serenity::builder::CreateEmbedFooter::new(format!("Claim: {}", claim_id)))
        .color(0x00b0f4)
}

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let Some((&first, rest)) = args.split_first() else {
        return list(ctx, msg).await;
    };
    let gateway = super::gateway(ctx).await?;
    let password = (!rest.is_empty()).then(|| rest.join(" "));

    let embed = match first.to_lowercase().as_str() {
        "list" => return list(ctx, msg).await,
        "password" => {
            let password = password.ok_or("Usage: `$claim password <password>`")?;
            let result = claim_service::submit_password(msg.author.id, &*gateway, &password)
                .await
                .map_err(|e| e.to_string())?;
            claim_service::create_claimed_embed(&result)
        }
        action @ ("link" | "qr") => {
            let id = rest.first().ok_or_else(|| format!("Usage: `$claim {} <ID>`", action))?;
            let claim = claim_service::find_claim(id).map_err(|e| e.to_string())?;
            let link = links::claim_link(gateway.app_host(), &claim.id);
            if action == "link" {
                share_embed("🔗 Claim Link", &claim.id, &link)
            } else {
                share_embed("📱 Claim QR Payload", &claim.id, &link)
            }
        }
        "scan" => {
            let payload = password.ok_or("Usage: `$claim scan <payload>`")?;
            match claim_service::parse_scanned(&payload).map_err(|e| e.to_string())? {
                ScanResult::Claim(id) => attempt_embed(msg, &*gateway, &id, None).await?,
                ScanResult::Profile(profile) => claim_service::create_contact_embed(&profile),
            }
        }
        _ => attempt_embed(msg, &*gateway, first, password.as_deref()).await?,
    };

    super::reply(ctx, msg, embed).await
}
