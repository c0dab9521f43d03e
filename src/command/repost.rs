use crate::Context;
use crate::Error;
use tracing::{error, info};

/// Purges the channel and posts the message again.
#[poise::command(slash_command, rename = "repost", guild_only, owners_only, ephemeral)]
pub async fn repost(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    info!("Repost requested by {}", ctx.author().name);
    match ctx.data().presenter.initialize().await {
        Ok(message) => {
            ctx.say(format!("Reposted as message {message}.")).await?;
        }
        Err(e) => {
            error!("Repost failed: {}", e);
            ctx.say(format!("Repost failed: {e}")).await?;
        }
    }

    Ok(())
}
