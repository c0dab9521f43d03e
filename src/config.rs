use encoding_rs::Encoding;
use poise::serenity_prelude as serenity;
use serenity::{ChannelId, GuildId};
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_CHANNEL_ID: u64 = 1370303370392371255;
const DEFAULT_IMAGE_PATH: &str = "CountryState.png";
const DEFAULT_CSV_PATH: &str = "./message.csv";
const DEFAULT_CSV_ENCODING: &str = "big5";
const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
const DEFAULT_HTTP_PORT: u16 = 10000;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is not set.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Unknown text encoding: {0}")]
    UnknownEncoding(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub channel_id: ChannelId,
    /// Register slash commands in this guild only
    pub guild_id: Option<GuildId>,
    pub image_path: PathBuf,
    pub csv_path: PathBuf,
    pub csv_encoding: &'static Encoding,
    pub http_host: String,
    pub http_port: u16,
    pub repost_on_stale: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingEnvVar("DISCORD_TOKEN"))?;

        let channel_id = match lookup("HARBOR_CHANNEL_ID") {
            Some(value) => ChannelId::new(parse_id("HARBOR_CHANNEL_ID", value)?),
            None => ChannelId::new(DEFAULT_CHANNEL_ID),
        };

        let guild_id = lookup("GUILD_ID")
            .map(|value| parse_id("GUILD_ID", value).map(GuildId::new))
            .transpose()?;

        let label = lookup("HARBOR_CSV_ENCODING").unwrap_or_else(|| DEFAULT_CSV_ENCODING.into());
        let csv_encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or(ConfigError::UnknownEncoding(label))?;

        let http_port = match lookup("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value,
            })?,
            None => DEFAULT_HTTP_PORT,
        };

        let repost_on_stale = match lookup("HARBOR_REPOST_ON_STALE") {
            Some(value) => parse_flag("HARBOR_REPOST_ON_STALE", value)?,
            None => false,
        };

        Ok(Self {
            discord_token,
            channel_id,
            guild_id,
            image_path: lookup("HARBOR_IMAGE_PATH")
                .unwrap_or_else(|| DEFAULT_IMAGE_PATH.into())
                .into(),
            csv_path: lookup("HARBOR_CSV_PATH")
                .unwrap_or_else(|| DEFAULT_CSV_PATH.into())
                .into(),
            csv_encoding,
            http_host: lookup("HARBOR_HTTP_HOST").unwrap_or_else(|| DEFAULT_HTTP_HOST.into()),
            http_port,
            repost_on_stale,
        })
    }
}

fn parse_id(name: &'static str, value: String) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(id) if id != 0 => Ok(id),
        _ => Err(ConfigError::InvalidValue { name, value }),
    }
}

fn parse_flag(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { name, value }),
    }
}
