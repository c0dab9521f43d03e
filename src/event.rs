use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;
use serenity::{
    ComponentInteraction, CreateInteractionResponse, CreateInteractionResponseMessage, FullEvent,
    Interaction,
};
use tracing::{debug, error, info};

use crate::view::{Control, JOB_PROMPT, Reaction, RecordCard, SeaView};
use crate::{Data, Error};

/// What to send back for a button click.
#[derive(Debug, PartialEq, Eq)]
pub enum ClickResponse {
    Sea(SeaView),
    Card(RecordCard),
    /// Leave the interaction unanswered
    Nothing,
}

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot } => {
            info!("Connected as {}", data_about_bot.user.name);
            reinitialize(data).await;
        }
        FullEvent::Resume { .. } => {
            info!("Gateway session resumed");
            reinitialize(data).await;
        }
        FullEvent::InteractionCreate {
            interaction: Interaction::Component(component),
        } => {
            handle_component(ctx, data, component).await?;
        }
        _ => {}
    }
    Ok(())
}

/// Purges the channel and posts a fresh message after a connect or resume.
/// Failures are logged and left for the next connect or `/repost`.
pub async fn reinitialize(data: &Data) {
    if let Err(e) = data.presenter.initialize().await {
        error!("Failed to initialize channel: {}", e);
    }
}

async fn handle_component(
    ctx: &serenity::Context,
    data: &Data,
    component: &ComponentInteraction,
) -> Result<(), Error> {
    let custom_id = &component.data.custom_id;
    let message = match respond_to_click(data, custom_id, Utc::now()).await? {
        ClickResponse::Sea(view) => CreateInteractionResponseMessage::new()
            .content(JOB_PROMPT)
            .components(view.components()),
        ClickResponse::Card(card) => {
            CreateInteractionResponseMessage::new().embed(card.into_embed())
        }
        ClickResponse::Nothing => {
            debug!("Ignoring {} click from {}", custom_id, component.user.name);
            return Ok(());
        }
    };

    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(message.ephemeral(true)),
        )
        .await?;
    Ok(())
}

/// Routes a component click by custom id. Ids this bot did not issue get nothing.
pub async fn respond_to_click(
    data: &Data,
    custom_id: &str,
    now: DateTime<Utc>,
) -> Result<ClickResponse, Error> {
    match Control::parse(custom_id) {
        Some(control) => respond_to(data, control, now).await,
        None => {
            debug!("Unknown component {}", custom_id);
            Ok(ClickResponse::Nothing)
        }
    }
}

/// Runs a click through the view state machine.
pub async fn respond_to(
    data: &Data,
    control: Control,
    now: DateTime<Utc>,
) -> Result<ClickResponse, Error> {
    let live_generation = data.presenter.live_generation().await;
    let (_, reaction) = control.state(live_generation, now).on(control.event());

    let response = match reaction {
        Reaction::OfferSea => ClickResponse::Sea(SeaView::new(now)),
        Reaction::RevealRecord => {
            let record = data.pick().await?;
            ClickResponse::Card(RecordCard::from(&record))
        }
        Reaction::ReplaceView | Reaction::Ignore | Reaction::Reject => ClickResponse::Nothing,
    };
    Ok(response)
}
