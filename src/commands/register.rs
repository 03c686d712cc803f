use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::services::registration_service;

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let user_id = msg.author.id;

    let embed = match args.first().map(|s| s.to_lowercase()).as_deref() {
        None | Some("status") => {
            if let Some(identity) = registration_service::identity_of(user_id).await {
                registration_service::create_registered_embed(&identity)
            } else if let Some(flow) = registration_service::current_flow(user_id).await {
                registration_service::create_flow_embed(&flow)
            } else {
                registration_service::create_intro_embed()
            }
        }
        Some("wallet") => {
            let gateway = super::gateway(ctx).await?;
            let flow = registration_service::generate_wallet(user_id, &*gateway)
                .await
                .map_err(|e| e.to_string())?;
            registration_service::create_flow_embed(&flow)
        }
        Some("back") => {
            let flow = registration_service::back(user_id).await.map_err(|e| e.to_string())?;
            registration_service::create_flow_embed(&flow)
        }
        Some("done") | Some("complete") => {
            let identity = registration_service::complete(user_id).await.map_err(|e| e.to_string())?;
            registration_service::create_registered_embed(&identity)
        }
        Some(_) => {
            let gateway = super::gateway(ctx).await?;
            let flow = registration_service::submit_username(user_id, &*gateway, args[0])
                .await
                .map_err(|e| e.to_string())?;
            registration_service::create_flow_embed(&flow)
        }
    };

    super::reply(ctx, msg, embed).await
}
