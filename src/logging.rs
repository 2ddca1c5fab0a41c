use crate::{COMMAND_TARGET, CONSOLE_TARGET, Data, ERROR_TARGET, Error};
use dashmap::DashMap;
use poise::{Context, CreateReply, FrameworkError};
use std::path::Path;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Log directory name
pub const LOG_DIR: &str = "logs";
/// Command and broadcast log file name
pub const LOG_FILE: &str = "status_relay";
/// Reply sent when the owner check rejects a user
pub const OWNER_ONLY_REPLY: &str = "This command is restricted to the bot owner.";

/// Initialize the logging system with console and file outputs
pub fn init() -> Result<(), Error> {
    if !Path::new(LOG_DIR).exists() {
        std::fs::create_dir_all(LOG_DIR)?;
    }

    let log_file = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, LOG_FILE);

    // Human-readable console output
    let console_layer = fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_ansi(true);

    // JSON file output
    let file_layer = fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_ansi(false)
        .json()
        .with_writer(log_file);

    // Default to INFO, keep serenity's heartbeat chatter out
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("info").add_directive("serenity=error".parse()?),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Logging system initialized");
    Ok(())
}

// Start times of running commands, keyed by invocation id
static COMMAND_START_TIMES: LazyLock<DashMap<u64, Instant>> = LazyLock::new(DashMap::new);

fn guild_label(ctx: Context<'_, Data, Error>) -> String {
    ctx.guild_id()
        .map_or_else(|| "DM".to_string(), |id| id.get().to_string())
}

fn take_elapsed(invocation_id: u64) -> Option<Duration> {
    COMMAND_START_TIMES
        .remove(&invocation_id)
        .map(|(_, start)| start.elapsed())
}

/// Log the start of a command execution (pre-command hook)
pub fn log_command_start(ctx: Context<'_, Data, Error>) {
    COMMAND_START_TIMES.insert(ctx.id(), Instant::now());

    let args = if ctx.command().parameters.is_empty() {
        String::new()
    } else {
        format!("{:?}", ctx.invocation_string())
    };

    info!(
        target: COMMAND_TARGET,
        command = %ctx.command().qualified_name,
        guild_id = %guild_label(ctx),
        user_id = %ctx.author().id.get(),
        arguments = %args,
        event = "start",
        "Command execution started"
    );
}

/// Log the end of a command execution (post-command hook)
pub fn log_command_end(ctx: Context<'_, Data, Error>) {
    let duration_ms = take_elapsed(ctx.id())
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));

    info!(
        target: COMMAND_TARGET,
        command = %ctx.command().qualified_name,
        guild_id = %guild_label(ctx),
        user_id = %ctx.author().id.get(),
        duration_ms = duration_ms,
        event = "end",
        "Command execution completed"
    );
}

/// Log errors that occur during command execution
pub fn log_command_error(error: &FrameworkError<'_, Data, Error>) {
    match error {
        FrameworkError::Command { error, ctx, .. } => {
            // post_command does not run for failed commands
            take_elapsed(ctx.id());
            error!(
                target: ERROR_TARGET,
                command = %ctx.command().qualified_name,
                guild_id = %guild_label(*ctx),
                user_id = %ctx.author().id.get(),
                error = %error,
                "Command error"
            );
        }
        FrameworkError::CommandCheckFailed { error, ctx, .. } => {
            take_elapsed(ctx.id());
            let error_msg = error
                .as_ref()
                .map_or_else(|| "Check failed".to_string(), ToString::to_string);

            warn!(
                target: ERROR_TARGET,
                command = %ctx.command().qualified_name,
                guild_id = %guild_label(*ctx),
                user_id = %ctx.author().id.get(),
                error = %error_msg,
                "Command check failed"
            );
        }
        err => {
            error!(
                target: ERROR_TARGET,
                error = ?err,
                "Other framework error"
            );
        }
    }
}

/// Framework error hook: log, then tell the user what went wrong
pub async fn on_error(error: FrameworkError<'_, Data, Error>) {
    log_command_error(&error);

    match error {
        FrameworkError::Command { error, ctx, .. } => {
            let reply = CreateReply::default()
                .content(format!("Something went wrong: {error}"))
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!(target: ERROR_TARGET, error = %e, "Failed to send error reply");
            }
        }
        FrameworkError::CommandCheckFailed { error, ctx, .. } => {
            let content = error.map_or_else(|| OWNER_ONLY_REPLY.to_string(), |e| e.to_string());
            let reply = CreateReply::default().content(content).ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!(target: ERROR_TARGET, error = %e, "Failed to send check failure reply");
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!(target: ERROR_TARGET, error = %e, "Error while handling error");
            }
        }
    }
}

pub fn log_console(message: String) {
    info!(
        target: CONSOLE_TARGET,
        message = %message,
        event = "console",
    );
}
