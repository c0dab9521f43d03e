use anyhow::Context as _;
use dotenvy::dotenv;
use poise::serenity_prelude as serenity;
use serenity::{Client, GatewayIntents};
use std::{path::Path, sync::Arc};
use tokio::sync::Mutex;
use tracing::{error, info};

mod command;
mod config;
mod event;
mod health;
mod logging;
mod pool;
mod presenter;
mod view;

use command::repost;
use config::Config;
use pool::{MessagePool, MessageRecord, PickError};
use presenter::{DiscordChannel, Presenter};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

pub struct Data {
    pub pool: Mutex<MessagePool>,
    pub presenter: Arc<Presenter>,
}

impl Data {
    pub async fn pick(&self) -> Result<MessageRecord, PickError> {
        let mut pool = self.pool.lock().await;
        pool.pick(&mut rand::rng())
    }
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => error!("Failed to start bot: {:?}", error),
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!("Error handling {} event: {}", event.snake_case_name(), error);
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e)
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logging::init(Path::new(logging::LOG_FILE))?;

    let config = Config::from_env().context("Invalid configuration")?;

    // Must succeed before anything connects to Discord.
    let pool = pool::load(&config.csv_path, config.csv_encoding)
        .context("Failed to load message pool")?;

    let options = poise::FrameworkOptions {
        commands: vec![repost()],
        on_error: |error| Box::pin(on_error(error)),
        pre_command: |ctx| {
            Box::pin(async move {
                info!("Executing command {}...", ctx.command().qualified_name);
            })
        },
        event_handler: |ctx, event, framework, data| {
            Box::pin(event::event_handler(ctx, event, framework, data))
        },
        ..Default::default()
    };

    let channel_id = config.channel_id;
    let guild_id = config.guild_id;
    let image_path = config.image_path.clone();
    let repost_on_stale = config.repost_on_stale;

    let framework = poise::Framework::builder()
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);

                let commands = &framework.options().commands;
                match guild_id {
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(ctx, commands, guild_id).await?;
                        info!("Registered commands for guild {}", guild_id);
                    }
                    None => {
                        poise::builtins::register_globally(ctx, commands).await?;
                    }
                }

                let http = ctx.http.clone();
                let gateway = Arc::new(DiscordChannel::new(http, channel_id, image_path));
                let presenter = Arc::new(Presenter::new(gateway, repost_on_stale));
                presenter.spawn_view_timer();

                Ok(Data {
                    pool: Mutex::new(pool),
                    presenter,
                })
            })
        })
        .options(options)
        .build();

    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES;

    let mut client = Client::builder(&config.discord_token, intents)
        .framework(framework)
        .await
        .context("Failed to create Discord client")?;

    // Either server stopping ends the process.
    tokio::select! {
        result = client.start() => {
            result.context("Discord client stopped")?;
            info!("Discord client exited");
        }
        result = health::serve(&config.http_host, config.http_port) => {
            result.context("Health endpoint stopped")?;
            info!("Health endpoint exited");
        }
    }

    Ok(())
}
