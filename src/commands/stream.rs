use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use tracing::info;

use crate::models::token::find_token;
use crate::models::{Duration, DurationUnit, StreamStatus};
use crate::services::stream_service::{self, StreamDraft};

fn usage() -> CreateEmbed {
    CreateEmbed::default()
        .title("📊 Stream Command")
        .description("Stream payments over time, with optional milestone releases")
        .field(
            "Streams",
            "`$stream [active|completed]`\n\
             `$stream view <ID>`\n\
             `$stream pause|resume|stop <ID>`\n\
             `$stream release <ID> <MILESTONE>`",
            false,
        )
        .field(
            "Create",
            "`$stream new` - Clear the form\n\
             `$stream to <@username.sei>`\n\
             `$stream amount <value|max>`\n\
             `$stream token <SYMBOL>`\n\
             `$stream duration <value> <unit>`\n\
             `$stream milestone add <percent> <description>`\n\
             `$stream milestone remove <MILESTONE>`\n\
             `$stream start`",
            false,
        )
        .color(0x00b0f4)
}

fn status_for(action: &str) -> Option<StreamStatus> {
    match action {
        "pause" => Some(StreamStatus::Paused),
        "resume" => Some(StreamStatus::Active),
        "stop" => Some(StreamStatus::Completed),
        _ => None,
    }
}

/// Apply one create-form edit
fn edit_draft(draft: &mut StreamDraft, field: &str, rest: &[&str]) -> Result<(), String> {
    let value = rest.join(" ");
    match field {
        "to" | "recipient" => {
            if value.is_empty() {
                return Err("Usage: `$stream to <@username.sei>`".to_string());
            }
            draft.recipient = value;
        }
        "amount" => match value.to_lowercase().as_str() {
            "" => return Err("Usage: `$stream amount <value|max>`".to_string()),
            "max" => draft.use_max(),
            _ => draft.amount = value,
        },
        "token" => {
            draft.token = find_token(&value).ok_or_else(|| format!("Unknown token '{}'. See `$tokens`", value))?;
        }
        "duration" => match rest {
            [amount, unit] => {
                let v = amount
                    .parse::<u32>()
                    .map_err(|_| format!("Invalid duration value '{}'", amount))?;
                draft.duration = Duration::new(v, unit.parse::<DurationUnit>()?);
            }
            _ => return Err("Usage: `$stream duration <value> <unit>`".to_string()),
        },
        "milestone" | "milestones" => match rest {
            ["add", percentage, description @ ..] => {
                let pct = percentage
                    .trim_end_matches('%')
                    .parse::<u8>()
                    .map_err(|_| format!("Invalid milestone percentage '{}'", percentage))?;
                draft
                    .milestones
                    .add(pct, &description.join(" "))
                    .map_err(|e| e.to_string())?;
            }
            ["remove", id] => {
                draft.milestones.remove(id).map_err(|e| e.to_string())?;
            }
            _ => {
                return Err(
                    "Usage: `$stream milestone add <percent> <description>` or `$stream milestone remove <ID>`"
                        .to_string(),
                )
            }
        },
        other => return Err(format!("Unknown stream option '{}'. See `$stream help`", other)),
    }
    Ok(())
}

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let user_id = msg.author.id;
    let sub = args.first().map(|s| s.to_lowercase()).unwrap_or_default();
    let rest = if args.is_empty() { args } else { &args[1..] };

    let embed = match sub.as_str() {
        "help" => usage(),
        "" | "list" | "active" | "completed" => {
            let tab = match (sub.as_str(), rest.first()) {
                ("completed", _) | ("list", Some(&"completed")) => "completed",
                _ => "active",
            };
            stream_service::with_book(user_id, |book| {
                let streams = if tab == "completed" { book.completed() } else { book.active() };
                stream_service::create_stream_list_embed(&streams, tab)
            })
            .await
        }
        "view" => {
            let id = rest.first().ok_or("Usage: `$stream view <ID>`")?;
            stream_service::with_book(user_id, |book| {
                book.get(id).map(stream_service::create_stream_embed)
            })
            .await
            .map_err(|e| e.to_string())?
        }
        "pause" | "resume" | "stop" => {
            let id = rest.first().ok_or_else(|| format!("Usage: `$stream {} <ID>`", sub))?;
            let status = status_for(&sub).ok_or("Unknown stream action")?;
            let embed = stream_service::with_book(user_id, |book| {
                book.set_status(id, status).map(stream_service::create_stream_embed)
            })
            .await
            .map_err(|e| e.to_string())?;
            info!("User {} set {} to {}", user_id, id, status);
            embed
        }
        "release" => {
            let (stream_id, milestone_id) = match rest {
                [stream_id, milestone_id] => (*stream_id, *milestone_id),
                _ => return Err("Usage: `$stream release <ID> <MILESTONE>`".to_string()),
            };
            let result = stream_service::with_book(user_id, |book| book.release(stream_id, milestone_id))
                .await
                .map_err(|e| e.to_string())?;
            info!("User {} released {} {} from {}", user_id, result.amount, result.token, stream_id);
            stream_service::create_release_embed(&result)
        }
        "new" => {
            stream_service::with_book(user_id, |book| {
                *book.draft_mut() = StreamDraft::default();
                stream_service::create_draft_embed(book.draft())
            })
            .await
        }
        "draft" | "form" => {
            stream_service::with_book(user_id, |book| stream_service::create_draft_embed(book.draft())).await
        }
        "start" => {
            let stream = stream_service::start_stream(user_id).await.map_err(|e| e.to_string())?;
            stream_service::create_stream_embed(&stream).title(format!("✅ Stream Started: {}", stream.id))
        }
        field => {
            stream_service::with_book(user_id, |book| {
                edit_draft(book.draft_mut(), field, rest)?;
                Ok::<_, String>(stream_service::create_draft_embed(book.draft()))
            })
            .await?
        }
    };

    super::reply(ctx, msg, embed).await
}
