pub mod broadcast;
pub mod commands;
pub mod config;
pub mod data;
pub mod handlers;
pub mod logging;
pub mod status;
pub mod webhook;

pub const BOT_NAME: &str = "status_relay";
pub const COMMAND_TARGET: &str = "status_relay::command";
pub const ERROR_TARGET: &str = "status_relay::error";
pub const EVENT_TARGET: &str = "status_relay::handlers";
pub const BROADCAST_TARGET: &str = "status_relay::broadcast";
pub const CONSOLE_TARGET: &str = "status_relay";

pub use data::{Data, DataInner};
pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
