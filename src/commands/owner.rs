use crate::broadcast::BroadcastRequest;
use crate::data::format_uptime;
use crate::webhook::StoreStats;
use crate::{COMMAND_TARGET, Context, Error};
use poise::CreateReply;
use poise::serenity_prelude::{CreateEmbed, Timestamp, UserId};
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tracing::info;

const STATS_COLOUR: u32 = 0x0099ff;

/// Poise check: only the configured owner may run the command
pub async fn is_owner(ctx: Context<'_>) -> Result<bool, Error> {
    Ok(is_owner_id(ctx.author().id, ctx.data().config.owner_id))
}

fn is_owner_id(author: UserId, owner: UserId) -> bool {
    author == owner
}

/// Show bot statistics
#[poise::command(slash_command, check = "is_owner", hide_in_help)]
pub async fn botstats(ctx: Context<'_>) -> Result<(), Error> {
    let stats = ctx.data().store.stats().await?;
    let guilds = ctx.cache().guild_count();
    let latency = ctx.ping().await;

    let embed = stats_embed(&stats, guilds, latency, ctx.data().uptime());
    ctx.send(CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Run a status check for every service now
#[poise::command(slash_command, check = "is_owner", hide_in_help)]
pub async fn forcecheck(ctx: Context<'_>) -> Result<(), Error> {
    let queued = ctx.data().broadcast_tx.try_send(BroadcastRequest::CheckNow);
    let reply = forcecheck_reply(queued)?;

    info!(target: COMMAND_TARGET, "Status check requested by owner");
    ctx.send(CreateReply::default().content(reply).ephemeral(true))
        .await?;
    Ok(())
}

/// Reply for a check request, without waiting on a busy broadcaster
fn forcecheck_reply(queued: Result<(), TrySendError<BroadcastRequest>>) -> Result<&'static str, Error> {
    match queued {
        Ok(()) => Ok("Status check queued."),
        Err(TrySendError::Full(_)) => Ok("A status check is already queued."),
        Err(TrySendError::Closed(_)) => Err("The status broadcaster is not running".into()),
    }
}

fn stats_embed(stats: &StoreStats, guilds: usize, latency: Duration, uptime: Duration) -> CreateEmbed {
    CreateEmbed::new()
        .title("Bot Statistics")
        .colour(STATS_COLOUR)
        .timestamp(Timestamp::now())
        .field("Servers", guilds.to_string(), true)
        .field("Active Webhooks", stats.enabled_webhooks.to_string(), true)
        .field("Servers with Webhooks", stats.guilds_with_webhooks.to_string(), true)
        .field("Latency", format!("{}ms", latency.as_millis()), true)
        .field("Uptime", format_uptime(uptime), true)
}
