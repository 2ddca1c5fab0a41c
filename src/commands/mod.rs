//! Slash commands
//!
//! The command list is explicit; [`validate`] runs at startup so a command
//! that was dropped or registered twice stops the bot before it connects.

mod owner;
mod status;
mod webhook;

use crate::status::ServiceName;
use crate::{Data, Error};
use std::collections::HashSet;
use thiserror::Error;

pub use owner::{botstats, forcecheck, is_owner};
pub use status::checkstatus;
pub use webhook::{listwebhooks, removewebhook, setupwebhook, togglewebhook};

/// Every command the bot must register
pub const EXPECTED: [&str; 7] = [
    "setupwebhook",
    "removewebhook",
    "togglewebhook",
    "listwebhooks",
    "checkstatus",
    "botstats",
    "forcecheck",
];

/// Problems found in the command list
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Command registered more than once: {0}")]
    Duplicate(String),

    #[error("Command missing from the registry: {0}")]
    Missing(String),
}

/// Service picker shown in slash command options
#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum ServiceChoice {
    Vercel,
    Cloudflare,
    Netlify,
}

impl From<ServiceChoice> for ServiceName {
    fn from(choice: ServiceChoice) -> Self {
        match choice {
            ServiceChoice::Vercel => Self::Vercel,
            ServiceChoice::Cloudflare => Self::Cloudflare,
            ServiceChoice::Netlify => Self::Netlify,
        }
    }
}

/// All commands, in registration order
#[must_use]
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        setupwebhook(),
        removewebhook(),
        togglewebhook(),
        listwebhooks(),
        checkstatus(),
        botstats(),
        forcecheck(),
    ]
}

/// Check that every expected command is present exactly once
///
/// # Errors
///
/// Returns the first duplicate name, or else the first missing one.
pub fn validate(commands: &[poise::Command<Data, Error>]) -> Result<(), RegistryError> {
    let mut seen = HashSet::new();
    for command in commands {
        if !seen.insert(command.name.as_str()) {
            return Err(RegistryError::Duplicate(command.name.clone()));
        }
    }

    match EXPECTED.iter().find(|name| !seen.contains(**name)) {
        Some(name) => Err(RegistryError::Missing((*name).to_string())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_valid() {
        let commands = all();
        assert_eq!(commands.len(), EXPECTED.len());
        assert_eq!(validate(&commands), Ok(()));
    }

    #[test]
    fn test_registry_detects_duplicate() {
        let mut commands = all();
        commands.push(checkstatus());
        assert_eq!(
            validate(&commands),
            Err(RegistryError::Duplicate("checkstatus".to_string()))
        );
    }

    #[test]
    fn test_registry_detects_missing() {
        let commands: Vec<_> = all()
            .into_iter()
            .filter(|command| command.name != "togglewebhook")
            .collect();
        assert_eq!(
            validate(&commands),
            Err(RegistryError::Missing("togglewebhook".to_string()))
        );
    }

    #[test]
    fn test_every_command_is_a_slash_command() {
        for command in all() {
            assert!(
                command.create_as_slash_command().is_some(),
                "{} is not a slash command",
                command.name
            );
            assert!(command.description.is_some(), "{} has no description", command.name);
        }
    }

    #[test]
    fn test_service_choice_maps_to_service() {
        assert_eq!(ServiceName::from(ServiceChoice::Vercel), ServiceName::Vercel);
        assert_eq!(ServiceName::from(ServiceChoice::Cloudflare), ServiceName::Cloudflare);
        assert_eq!(ServiceName::from(ServiceChoice::Netlify), ServiceName::Netlify);
    }
}
