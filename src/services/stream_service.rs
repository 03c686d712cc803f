use std::collections::HashMap;

use lazy_static::lazy_static;
use serenity::builder::CreateEmbed;
use serenity::model::id::UserId;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::models::milestone::time_for_percentage;
use crate::models::token::{default_token, TokenRef};
use crate::models::{Duration, DurationUnit, Milestone, MilestoneList, ReleaseResult, Stream, StreamStatus};
use crate::utils::errors::StreamError;
use crate::utils::Table;

lazy_static! {
    static ref STREAM_BOOKS: Mutex<HashMap<UserId, StreamBook>> = Mutex::new(HashMap::new());
}

const MIN_STREAM_AMOUNT: f64 = 0.01;

/// Display rate for `amount` spread over `duration`.
///
/// Picks the coarsest of second/minute/hour whose value is at least 1 (two
/// decimals), otherwise falls back to a per-day rate with four decimals.
/// A missing amount or zero duration yields "0".
pub fn calculate_stream_rate(amount: &str, duration: Duration, symbol: &str) -> String {
    let seconds = duration.as_seconds();
    let amount: f64 = match amount.trim().parse::<f64>() {
        Ok(a) if a.is_finite() => a,
        _ => return "0".to_string(),
    };
    if seconds == 0 {
        return "0".to_string();
    }

    let per_second = amount / seconds as f64;
    if per_second >= 1.0 {
        format!("{:.2} {}/second", per_second, symbol)
    } else if per_second * 60.0 >= 1.0 {
        format!("{:.2} {}/minute", per_second * 60.0, symbol)
    } else if per_second * 3600.0 >= 1.0 {
        format!("{:.2} {}/hour", per_second * 3600.0, symbol)
    } else {
        format!("{:.4} {}/day", per_second * 86_400.0, symbol)
    }
}

/// Streams visible to one user plus their in-progress create form
#[derive(Debug, Clone)]
pub struct StreamBook {
    streams: Vec<Stream>,
    draft: StreamDraft,
    next_id: u32,
}

impl Default for StreamBook {
    fn default() -> Self {
        Self::seeded()
    }
}

impl StreamBook {
    /// Demo streams every user starts with
    pub fn seeded() -> Self {
        let streams = vec![
            Stream {
                id: "stream-1".to_string(),
                recipient: "@mark.sei".to_string(),
                total_amount: 100.0,
                streamed_amount: 43.0,
                rate_per_time: "0.1 SEI/min".to_string(),
                status: StreamStatus::Active,
                milestones: MilestoneList::from_items(vec![
                    seed_milestone("ms-1", 25, "First quarter payment"),
                    seed_milestone("ms-2", 50, "Halfway checkpoint"),
                    seed_milestone("ms-3", 75, "Three-quarters complete"),
                ]),
                token: "SEI".to_string(),
            },
            Stream {
                id: "stream-2".to_string(),
                recipient: "@alice.sei".to_string(),
                total_amount: 50.0,
                streamed_amount: 12.0,
                rate_per_time: "0.05 SEI/min".to_string(),
                status: StreamStatus::Paused,
                milestones: MilestoneList::new(),
                token: "SEI".to_string(),
            },
            Stream {
                id: "stream-3".to_string(),
                recipient: "@john.sei".to_string(),
                total_amount: 75.0,
                streamed_amount: 75.0,
                rate_per_time: "0.2 SEI/min".to_string(),
                status: StreamStatus::Completed,
                milestones: MilestoneList::new(),
                token: "SEI".to_string(),
            },
        ];
        StreamBook {
            next_id: streams.len() as u32,
            streams,
            draft: StreamDraft::default(),
        }
    }

    pub fn active(&self) -> Vec<&Stream> {
        self.streams.iter().filter(|s| !s.is_completed()).collect()
    }

    pub fn completed(&self) -> Vec<&Stream> {
        self.streams.iter().filter(|s| s.is_completed()).collect()
    }

    pub fn get(&self, id: &str) -> Result<&Stream, StreamError> {
        self.streams
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| StreamError::NotFound(id.to_string()))
    }

    pub fn set_status(&mut self, id: &str, status: StreamStatus) -> Result<&Stream, StreamError> {
        let stream = self
            .streams
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StreamError::NotFound(id.to_string()))?;
        stream.set_status(status);
        Ok(stream)
    }

    /// Release the share of a stream a reached milestone stands for.
    /// Nothing on the stream changes; the caller only reports the amount.
    pub fn release(&self, stream_id: &str, milestone_id: &str) -> Result<ReleaseResult, StreamError> {
        let stream = self.get(stream_id)?;
        let milestone = stream
            .milestones
            .get(milestone_id)
            .ok_or_else(|| StreamError::MilestoneNotFound(milestone_id.to_string()))?;

        if !milestone.is_reachable(stream.streamed_amount, stream.total_amount) {
            return Err(StreamError::MilestoneNotReached {
                percentage: milestone.percentage,
                reached: stream.progress_percent(),
            });
        }

        Ok(ReleaseResult {
            stream_id: stream.id.clone(),
            recipient: stream.recipient.clone(),
            token: stream.token.clone(),
            amount: milestone.release_amount(stream.total_amount),
            milestone_description: milestone.description.clone(),
        })
    }

    pub fn draft(&self) -> &StreamDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut StreamDraft {
        &mut self.draft
    }

    /// Submit the create form: validate, append an active stream, clear the form
    pub fn start_draft(&mut self) -> Result<&Stream, StreamError> {
        let draft = &self.draft;
        if draft.recipient.trim().is_empty() {
            return Err(StreamError::MissingRecipient);
        }
        let amount = draft
            .amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite())
            .ok_or_else(|| StreamError::InvalidAmount(draft.amount.clone()))?;
        if amount < MIN_STREAM_AMOUNT {
            return Err(StreamError::AmountTooSmall);
        }
        if draft.duration.value == 0 {
            return Err(StreamError::ZeroDuration);
        }

        self.next_id += 1;
        let stream = Stream {
            id: format!("stream-{}", self.next_id),
            recipient: draft.recipient.trim().to_string(),
            total_amount: amount,
            streamed_amount: 0.0,
            rate_per_time: draft.rate(),
            status: StreamStatus::Active,
            milestones: draft.milestones.clone(),
            token: draft.token.symbol.to_string(),
        };
        self.streams.push(stream);
        self.draft = StreamDraft::default();
        Ok(&self.streams[self.streams.len() - 1])
    }
}

fn seed_milestone(id: &str, percentage: u8, description: &str) -> Milestone {
    Milestone {
        id: id.to_string(),
        percentage,
        description: description.to_string(),
    }
}

/// The single-step "Create Stream" form
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDraft {
    pub recipient: String,
    pub token: TokenRef,
    pub amount: String,
    pub duration: Duration,
    pub milestones: MilestoneList,
}

impl Default for StreamDraft {
    fn default() -> Self {
        StreamDraft {
            recipient: String::new(),
            token: default_token(),
            amount: String::new(),
            duration: Duration::new(60, DurationUnit::Minutes),
            milestones: MilestoneList::new(),
        }
    }
}

impl StreamDraft {
    pub fn rate(&self) -> String {
        calculate_stream_rate(&self.amount, self.duration, self.token.symbol)
    }

    pub fn use_max(&mut self) {
        self.amount = self.token.max_amount();
    }
}

/// Run `f` against the caller's stream book, seeding it on first use
pub async fn with_book<T>(user_id: UserId, f: impl FnOnce(&mut StreamBook) -> T) -> T {
    let mut books = STREAM_BOOKS.lock().await;
    let book = books.entry(user_id).or_insert_with(|| {
        debug!("Seeding demo streams for user {}", user_id);
        StreamBook::seeded()
    });
    f(book)
}

pub async fn start_stream(user_id: UserId) -> Result<Stream, StreamError> {
    let stream = with_book(user_id, |book| book.start_draft().cloned()).await?;
    info!(
        "User {} started {} ({} {} to {})",
        user_id, stream.id, stream.total_amount, stream.token, stream.recipient
    );
    Ok(stream)
}

pub fn create_stream_embed(stream: &Stream) -> CreateEmbed {
    let mut embed = CreateEmbed::default()
        .title(format!("{} {}", stream.status.icon(), stream.recipient))
        .field("Status", stream.status.to_string(), true)
        .field(
            "Streamed",
            format!("{} / {} {} ({:.0}%)", stream.streamed_amount, stream.total_amount, stream.token, stream.progress_percent()),
            true,
        )
        .field("Rate", &stream.rate_per_time, true)
        .footer(serenity::builder::CreateEmbedFooter::new(format!("ID: {}", stream.id)))
        .color(stream.status.color());

    if !stream.milestones.is_empty() {
        let count = stream.milestones.len();
        let mut lines = Vec::new();
        for m in stream.milestones.iter() {
            let marker = if m.is_reachable(stream.streamed_amount, stream.total_amount) {
                "🔓"
            } else {
                "🔒"
            };
            lines.push(format!("{} `{}` Release {}% - {}", marker, m.id, m.percentage, m.description));
        }
        embed = embed.field(
            format!("{} milestone{}", count, if count == 1 { "" } else { "s" }),
            lines.join("\n"),
            false,
        );
    }

    embed
}

pub fn create_stream_list_embed(streams: &[&Stream], tab: &str) -> CreateEmbed {
    if streams.is_empty() {
        let (title, hint) = match tab {
            "completed" => ("No Completed Streams", "Your completed streams will appear here"),
            _ => ("No Active Streams", "Start streaming payments with `$stream new`"),
        };
        return CreateEmbed::default()
            .title(title)
            .description(hint)
            .color(0xffa500);
    }

    let mut table = Table::new(vec!["ID", "Recipient", "Streamed", "Rate", "Status"]);
    for s in streams {
        table.add_row(vec![
            s.id.clone(),
            s.recipient.clone(),
            format!("{}/{} {}", s.streamed_amount, s.total_amount, s.token),
            s.rate_per_time.clone(),
            s.status.to_string(),
        ]);
    }

    CreateEmbed::default()
        .title(format!("📊 Payment Streams ({})", tab))
        .description(table.render())
        .color(0x00b0f4)
}

pub fn create_draft_embed(draft: &StreamDraft) -> CreateEmbed {
    let recipient = if draft.recipient.is_empty() { "-".to_string() } else { draft.recipient.clone() };
    let amount = if draft.amount.is_empty() {
        "-".to_string()
    } else {
        format!("{} {}", draft.amount, draft.token.symbol)
    };
    let duration_text = match draft.duration.helper_text() {
        Some(helper) => format!("{} ({})", draft.duration.pluralized(), helper),
        None => draft.duration.pluralized(),
    };

    let mut embed = CreateEmbed::default()
        .title("📊 Create Stream")
        .field("Recipient", recipient, true)
        .field("Token", format!("{} ({})", draft.token.display_name, draft.token.available_text()), true)
        .field("Total Amount", amount, true)
        .field("Duration", duration_text, true)
        .color(0x00b0f4);

    if !draft.amount.is_empty() && draft.duration.value > 0 {
        embed = embed.field("Rate", draft.rate(), true);
    }

    if draft.duration.value > 0 && !draft.milestones.is_empty() {
        let minutes = draft.duration.as_minutes();
        let lines: Vec<String> = draft
            .milestones
            .iter()
            .map(|m| format!("`{}` {} • {} • {}%", m.id, m.description, time_for_percentage(m.percentage, minutes), m.percentage))
            .collect();
        embed = embed.field("Milestones", lines.join("\n"), false);
    }

    embed.footer(serenity::builder::CreateEmbedFooter::new("Start with `$stream start`"))
}

pub fn create_release_embed(result: &ReleaseResult) -> CreateEmbed {
    CreateEmbed::default()
        .title("🔓 Milestone Released")
        .description(format!(
            "Released {} {} to {} for \"{}\"",
            result.amount, result.token, result.recipient, result.milestone_description
        ))
        .footer(serenity::builder::CreateEmbedFooter::new(format!("Stream: {}", result.stream_id)))
        .color(0x00ff00)
}
