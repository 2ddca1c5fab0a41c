use std::sync::Arc;

use poise::serenity_prelude::{self as serenity};
use serenity::GatewayIntents;
use status_relay::broadcast::{BroadcastRequest, Broadcaster, SerenityWebhookSender};
use status_relay::config::{self, BotConfig};
use status_relay::status::StatuspageClient;
use status_relay::webhook::{ConfigStore, SqliteConfigStore};
use status_relay::{CONSOLE_TARGET, Data, Error, commands, handlers, logging};
use tracing::{error, info};

/// Main function to run the bot
async fn async_main() -> Result<(), Error> {
    // Before logging so RUST_LOG can come from .env
    config::load_env_file(None);
    logging::init()?;

    let config = BotConfig::load()?;
    info!(target: CONSOLE_TARGET, ?config, "Configuration loaded");

    let store: Arc<dyn ConfigStore> = Arc::new(SqliteConfigStore::open(&config.database_url).await?);
    let checker = Arc::new(StatuspageClient::new(
        config.status_pages.clone(),
        config.fetch_timeout,
    )?);

    let commands = commands::all();
    commands::validate(&commands)?;

    // Webhook execution only needs REST, so the broadcaster starts before the gateway
    let sender = SerenityWebhookSender::new(Arc::new(serenity::Http::new(&config.token)));
    let (broadcast_tx, broadcast_handle) =
        Broadcaster::new(Arc::clone(&store), checker.clone(), Arc::new(sender))
            .with_call_timeout(config.fetch_timeout)
            .with_tick_budget(config.poll_interval / 2)
            .spawn(config.poll_interval);

    let data = Data::new(config.clone(), Arc::clone(&store), checker, broadcast_tx.clone());

    // Configure the Poise framework
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands,
            pre_command: |ctx| {
                Box::pin(async move {
                    logging::log_command_start(ctx);
                })
            },
            post_command: |ctx| {
                Box::pin(async move {
                    logging::log_command_end(ctx);
                })
            },
            on_error: |error| Box::pin(logging::on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                logging::log_console("Registering commands globally".to_string());
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = GatewayIntents::non_privileged();
    let mut client = serenity::ClientBuilder::new(&config.token, intents)
        .event_handler(handlers::Handler)
        .framework(framework)
        .await?;

    let shard_manager = client.shard_manager.clone();
    let shutdown_tx = broadcast_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(target: CONSOLE_TARGET, error = %e, "Failed to listen for Ctrl-C");
            return;
        }
        info!(target: CONSOLE_TARGET, "Received Ctrl-C, shutting down");
        let _ = shutdown_tx.send(BroadcastRequest::Shutdown).await;
        shard_manager.shutdown_all().await;
    });

    info!(target: CONSOLE_TARGET, "Starting bot...");
    let result = client.start().await;

    // Already gone if Ctrl-C got there first
    let _ = broadcast_tx.send(BroadcastRequest::Shutdown).await;
    if let Err(e) = broadcast_handle.await {
        error!(target: CONSOLE_TARGET, error = %e, "Broadcaster task failed");
    }
    store.close().await;

    result?;
    Ok(())
}

fn main() {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Failed to build the Tokio runtime: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = runtime.block_on(async_main()) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
