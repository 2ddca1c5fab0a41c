use crate::commands::ServiceChoice;
use crate::status::ServiceName;
use crate::webhook::{StoreError, WebhookConfig, WebhookTarget};
use crate::{COMMAND_TARGET, Context, Error};
use poise::CreateReply;
use poise::serenity_prelude::{self as serenity, CreateEmbed, CreateWebhook, Mentionable};
use tracing::info;

const LIST_COLOUR: u32 = 0x0099ff;
const SETUP_COLOUR: u32 = 0x00ff00;

fn guild_id(ctx: Context<'_>) -> Result<u64, Error> {
    ctx.guild_id()
        .map(serenity::GuildId::get)
        .ok_or_else(|| "This command can only be used in a server".into())
}

/// Set up auto-posting of status updates for a service
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_WEBHOOKS",
    required_bot_permissions = "MANAGE_WEBHOOKS"
)]
pub async fn setupwebhook(
    ctx: Context<'_>,
    #[description = "Channel to post updates in"]
    #[channel_types("Text", "News")]
    channel: serenity::GuildChannel,
    #[description = "Service to monitor"] service: ServiceChoice,
    #[description = "Role to ping when posting updates"] ping_role: Option<serenity::Role>,
) -> Result<(), Error> {
    let guild_id = guild_id(ctx)?;
    let service = ServiceName::from(service);
    ctx.defer().await?;

    let webhook = channel
        .id
        .create_webhook(ctx.http(), CreateWebhook::new(webhook_name(service)))
        .await?;
    let target = WebhookTarget::new(webhook.url()?)
        .in_channel(channel.id.get())
        .pinging(ping_role.as_ref().map(|role| role.id.get()));

    let config = ctx.data().store.upsert(guild_id, service, target).await?;
    info!(
        target: COMMAND_TARGET,
        channel_id = %channel.id,
        "Configured {config}"
    );

    let mut embed = CreateEmbed::new()
        .title("Webhook Setup Complete")
        .description(format!(
            "Auto-posting enabled for **{}** in {}",
            service.display_name(),
            channel.mention()
        ))
        .colour(SETUP_COLOUR);
    if let Some(role) = &ping_role {
        embed = embed.field("Ping Role", role.mention().to_string(), true);
    }
    embed = embed.field(
        "Check Interval",
        format!("Every {}s", ctx.data().config.poll_interval.as_secs()),
        true,
    );

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Remove auto-posting for a service
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_WEBHOOKS")]
pub async fn removewebhook(
    ctx: Context<'_>,
    #[description = "Service to stop monitoring"] service: ServiceChoice,
) -> Result<(), Error> {
    let guild_id = guild_id(ctx)?;
    let service = ServiceName::from(service);

    let reply = match ctx.data().store.remove(guild_id, service).await {
        Ok(()) => {
            info!(target: COMMAND_TARGET, guild_id = guild_id, service = %service, "Webhook removed");
            format!("Removed auto-posting for {}", service.display_name())
        }
        Err(StoreError::NotFound { .. }) => not_found_text(service),
        Err(e) => return Err(e.into()),
    };

    ctx.say(reply).await?;
    Ok(())
}

/// Enable or disable a webhook
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_WEBHOOKS")]
pub async fn togglewebhook(
    ctx: Context<'_>,
    #[description = "Service webhook to toggle"] service: ServiceChoice,
) -> Result<(), Error> {
    let guild_id = guild_id(ctx)?;
    let service = ServiceName::from(service);
    let store = &ctx.data().store;

    let Some(config) = store.get(guild_id, service).await? else {
        ctx.say(not_found_text(service)).await?;
        return Ok(());
    };

    let enabled = !config.enabled;
    match store.set_enabled(guild_id, service, enabled).await {
        Ok(()) => {}
        // Removed since the read
        Err(StoreError::NotFound { .. }) => {
            ctx.say(not_found_text(service)).await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    info!(
        target: COMMAND_TARGET,
        guild_id = guild_id,
        service = %service,
        enabled = enabled,
        "Webhook toggled"
    );
    ctx.say(toggle_text(service, enabled)).await?;
    Ok(())
}

/// List all webhooks configured in this server
#[poise::command(slash_command, guild_only)]
pub async fn listwebhooks(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(ctx)?;
    let configs = ctx.data().store.list_for_guild(guild_id).await?;

    if configs.is_empty() {
        ctx.say("No webhooks configured for this server.").await?;
        return Ok(());
    }

    let embed = configs.iter().fold(
        CreateEmbed::new().title("Active Webhooks").colour(LIST_COLOUR),
        |embed, config| {
            let (name, value) = webhook_field(config);
            embed.field(name, value, true)
        },
    );
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

fn webhook_name(service: ServiceName) -> String {
    format!("{} Status Bot", service.display_name())
}

fn not_found_text(service: ServiceName) -> String {
    format!("No webhook found for {}", service.display_name())
}

fn toggle_text(service: ServiceName, enabled: bool) -> String {
    let state = if enabled { "enabled" } else { "disabled" };
    format!("{} webhook has been {state}", service.display_name())
}

/// Field name and value describing one configuration
fn webhook_field(config: &WebhookConfig) -> (String, String) {
    let channel = config
        .channel_id
        .map_or_else(|| "Unknown Channel".to_string(), |id| format!("<#{id}>"));
    let role = config
        .ping_role_id
        .map_or_else(|| "None".to_string(), |id| format!("<@&{id}>"));
    let state = if config.enabled { "Enabled" } else { "Disabled" };
    let last = config
        .last_status
        .map_or("Not checked yet", |status| status.as_str());

    (
        config.service.display_name().to_string(),
        format!("Channel: {channel}\nPing Role: {role}\nStatus: {state}\nLast seen: {last}"),
    )
}
