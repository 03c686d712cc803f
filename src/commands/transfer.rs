use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::models::token::find_token;
use crate::models::{DurationUnit, TokenRef, TransferSession, TransferType};
use crate::services::transfer_service;
use crate::services::wizard::Step;
use crate::utils::errors::WizardError;

/// One field change typed by the user
#[derive(Debug, Clone, PartialEq)]
enum SessionEdit {
    Recipient(String),
    Amount(String),
    MaxAmount,
    Token(TokenRef),
    Note(Option<String>),
    Method(TransferType),
    TimeoutOff,
    TimeoutOn(Option<(u32, DurationUnit)>),
    PasswordOff,
    Password(String),
}

impl SessionEdit {
    /// Step whose form owns the edited field
    fn owner(&self) -> Step {
        match self {
            SessionEdit::Recipient(_)
            | SessionEdit::Amount(_)
            | SessionEdit::MaxAmount
            | SessionEdit::Token(_)
            | SessionEdit::Note(_)
            | SessionEdit::Method(_) => Step::RecipientDetails,
            SessionEdit::TimeoutOff
            | SessionEdit::TimeoutOn(_)
            | SessionEdit::PasswordOff
            | SessionEdit::Password(_) => Step::ProtectionOptions,
        }
    }

    fn apply(self, session: &mut TransferSession) {
        match self {
            SessionEdit::Recipient(r) => session.set_recipient(r),
            SessionEdit::Amount(a) => session.set_amount(a),
            SessionEdit::MaxAmount => {
                let max = session.selected_token().max_amount();
                session.set_amount(max);
            }
            SessionEdit::Token(t) => session.set_selected_token(t),
            SessionEdit::Note(n) => session.set_note(n),
            SessionEdit::Method(m) => session.set_transfer_type(m),
            SessionEdit::TimeoutOff => session.set_with_timeout(false),
            SessionEdit::TimeoutOn(value) => {
                session.set_with_timeout(true);
                if let Some((v, unit)) = value {
                    session.set_timeout_value(v);
                    session.set_timeout_unit(unit);
                }
            }
            SessionEdit::PasswordOff => {
                session.set_with_password(false);
                session.set_password(None);
            }
            SessionEdit::Password(p) => {
                session.set_with_password(true);
                session.set_password(Some(p));
            }
        }
    }
}

/// Parse `<field> <value...>`; `Ok(None)` when `sub` is not a field
fn parse_edit(sub: &str, rest: &[&str]) -> Result<Option<SessionEdit>, String> {
    let value = rest.join(" ");
    let lowered: Vec<String> = rest.iter().map(|s| s.to_lowercase()).collect();
    let words: Vec<&str> = lowered.iter().map(String::as_str).collect();
    let edit = match sub {
        "to" | "recipient" => {
            if value.is_empty() {
                return Err("Usage: `$transfer to <@username.sei>`".to_string());
            }
            SessionEdit::Recipient(value)
        }
        "amount" => match value.to_lowercase().as_str() {
            "" => return Err("Usage: `$transfer amount <value|max>`".to_string()),
            "max" => SessionEdit::MaxAmount,
            _ => SessionEdit::Amount(value),
        },
        "token" => {
            let token = find_token(&value).ok_or_else(|| format!("Unknown token '{}'. See `$tokens`", value))?;
            SessionEdit::Token(token)
        }
        "note" => match value.to_lowercase().as_str() {
            "" | "clear" => SessionEdit::Note(None),
            _ => SessionEdit::Note(Some(value)),
        },
        "method" | "type" => SessionEdit::Method(value.parse::<TransferType>()?),
        "timeout" => match words.as_slice() {
            ["off"] => SessionEdit::TimeoutOff,
            [] | ["on"] => SessionEdit::TimeoutOn(None),
            [amount, unit] | ["on", amount, unit] => {
                let v = amount
                    .parse::<u32>()
                    .map_err(|_| format!("Invalid timeout value '{}'", amount))?;
                SessionEdit::TimeoutOn(Some((v, unit.parse::<DurationUnit>()?)))
            }
            _ => return Err("Usage: `$transfer timeout <off | on | value unit>`".to_string()),
        },
        "password" => match words.as_slice() {
            [] => return Err("Usage: `$transfer password <off | text>`".to_string()),
            ["off"] => SessionEdit::PasswordOff,
            _ => SessionEdit::Password(value),
        },
        _ => return Ok(None),
    };
    Ok(Some(edit))
}

async fn send_wizard(ctx: &Context, msg: &Message, embed: CreateEmbed) -> Result<(), String> {
    msg.channel_id
        .send_message(ctx, CreateMessage::default().embed(embed))
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let user_id = msg.author.id;
    let sub = args.first().map(|s| s.to_lowercase()).unwrap_or_default();
    let rest = if args.is_empty() { args } else { &args[1..] };

    let wizard = match sub.as_str() {
        "" | "start" | "show" => transfer_service::start(user_id).await,
        "new" => {
            transfer_service::cancel(user_id).await;
            transfer_service::start(user_id).await
        }
        "cancel" => {
            transfer_service::cancel(user_id).await;
            let embed = CreateEmbed::default()
                .title("Transfer Cancelled")
                .description("Start again with `$transfer`")
                .color(0xffa500);
            return send_wizard(ctx, msg, embed).await;
        }
        "next" | "continue" => {
            transfer_service::with_wizard(user_id, |w| {
                w.proceed()?;
                Ok(w.clone())
            })
            .await
            .map_err(|e| e.to_string())?
        }
        "back" => {
            transfer_service::with_wizard(user_id, |w| {
                if !w.prev() {
                    return Err(WizardError::WrongStep { action: "back", step: w.step().number() });
                }
                Ok(w.clone())
            })
            .await
            .map_err(|e| e.to_string())?
        }
        "reset" => {
            transfer_service::with_wizard(user_id, |w| {
                w.reset();
                Ok(w.clone())
            })
            .await
            .map_err(|e| e.to_string())?
        }
        "confirm" => {
            let gateway = super::gateway(ctx).await?;
            let (wizard, outcome) = transfer_service::confirm(user_id, &*gateway)
                .await
                .map_err(|e| e.to_string())?;
            if let Some(notice) = &outcome.notice {
                send_wizard(ctx, msg, transfer_service::create_notice_embed(notice)).await?;
            }
            wizard
        }
        field => {
            let edit = parse_edit(field, rest)?.ok_or_else(|| {
                format!("Unknown transfer option '{}'. See `$help`", field)
            })?;
            transfer_service::edit_session(user_id, edit.owner(), |session| {
                edit.apply(session);
                Ok(())
            })
            .await
            .map_err(|e| e.to_string())?
        }
    };

    send_wizard(ctx, msg, transfer_service::create_step_embed(&wizard)).await
}
