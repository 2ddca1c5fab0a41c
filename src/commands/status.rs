use crate::commands::ServiceChoice;
use crate::status::{ServiceName, embed};
use crate::{Context, ERROR_TARGET, Error};
use poise::CreateReply;
use tracing::warn;

/// Check the current status of a service
#[poise::command(slash_command)]
pub async fn checkstatus(
    ctx: Context<'_>,
    #[description = "The service to check status for"] service: ServiceChoice,
) -> Result<(), Error> {
    let service = ServiceName::from(service);
    ctx.defer().await?;

    // Display only: the broadcaster owns last_status
    match ctx.data().checker.check_status(service).await {
        Ok(report) => {
            ctx.send(CreateReply::default().embed(embed::status_embed(&report)))
                .await?;
        }
        Err(e) => {
            warn!(target: ERROR_TARGET, service = %service, error = %e, "On-demand status check failed");
            ctx.say(format!(
                "Failed to fetch {} status data.",
                service.display_name()
            ))
            .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkstatus_command_definition() {
        let cmd = checkstatus();
        assert_eq!(cmd.name, "checkstatus");
        assert!(!cmd.guild_only);
        assert!(cmd.required_permissions.is_empty());
        assert_eq!(cmd.parameters.len(), 1);
        assert!(cmd.parameters[0].required);
        assert_eq!(cmd.parameters[0].choices.len(), ServiceName::ALL.len());
    }
}
