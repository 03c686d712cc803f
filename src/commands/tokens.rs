use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::models::token::TOKENS;
use crate::utils::Table;

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let mut table = Table::new(vec!["Symbol", "Name", "Balance"]);
    for token in TOKENS.iter() {
        let balance = token.balance.map(|b| b.to_string()).unwrap_or_else(|| "0".to_string());
        table.add_row(vec![token.symbol, token.display_name, balance.as_str()]);
    }

    let embed = CreateEmbed::default()
        .title("🪙 Tokens")
        .description(table.render())
        .color(0x00b0f4);

    super::reply(ctx, msg, embed).await
}
