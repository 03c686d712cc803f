use chrono::Utc;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::services::{profile_service, registration_service};

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let identity = registration_service::identity_of(msg.author.id).await;
    let payload = profile_service::profile_payload(identity.as_ref(), Utc::now());
    let qr = profile_service::qr_value(&payload)?;

    super::reply(ctx, msg, profile_service::create_profile_embed(&payload, &qr)).await
}
