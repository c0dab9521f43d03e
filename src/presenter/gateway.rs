use async_trait::async_trait;
use serenity::all::{
    ChannelId, CreateAttachment, CreateMessage, EditMessage, GetMessages, Http, MessageId,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use super::PresenterError;
use crate::view::RootView;

/// Page size used when walking channel history.
const HISTORY_PAGE_SIZE: u8 = 100;

/// The channel operations the presenter needs.
#[async_trait]
pub trait ChannelGateway: Send + Sync {
    /// Checks that the target channel exists and is reachable.
    async fn resolve(&self) -> Result<(), PresenterError>;

    /// Deletes every message in the channel, returning how many were removed.
    async fn purge(&self) -> Result<usize, PresenterError>;

    /// Sends a new message carrying `view` and the companion image.
    async fn send(&self, view: &RootView) -> Result<MessageId, PresenterError>;

    /// Fetches `message` and swaps its components for `view`.
    async fn replace(&self, message: MessageId, view: &RootView)
        -> Result<MessageId, PresenterError>;
}

/// [`ChannelGateway`] backed by serenity's HTTP client.
pub struct DiscordChannel {
    http: Arc<Http>,
    channel_id: ChannelId,
    image_path: PathBuf,
}

impl DiscordChannel {
    pub fn new(http: Arc<Http>, channel_id: ChannelId, image_path: PathBuf) -> Self {
        Self {
            http,
            channel_id,
            image_path,
        }
    }
}

/// Paged access to a channel's message history.
#[async_trait]
pub trait ChannelHistory: Send + Sync {
    /// Up to `limit` message ids older than `before`, newest first.
    async fn fetch_page(
        &self,
        before: Option<MessageId>,
        limit: u8,
    ) -> Result<Vec<MessageId>, serenity::Error>;

    async fn delete(&self, message: MessageId) -> Result<(), serenity::Error>;
}

#[async_trait]
impl ChannelHistory for DiscordChannel {
    async fn fetch_page(
        &self,
        before: Option<MessageId>,
        limit: u8,
    ) -> Result<Vec<MessageId>, serenity::Error> {
        let mut request = GetMessages::new().limit(limit);
        if let Some(id) = before {
            request = request.before(id);
        }

        let page = self.channel_id.messages(&self.http, request).await?;
        Ok(page.into_iter().map(|message| message.id).collect())
    }

    async fn delete(&self, message: MessageId) -> Result<(), serenity::Error> {
        self.channel_id.delete_message(&self.http, message).await
    }
}

/// Deletes the whole history page by page, newest page first.
///
/// Stops at the first empty or short page. Any fetch or delete error aborts
/// the purge with [`PresenterError::Purge`].
pub async fn purge_history<H>(history: &H) -> Result<usize, PresenterError>
where
    H: ChannelHistory + ?Sized,
{
    let mut deleted = 0;
    let mut before: Option<MessageId> = None;

    loop {
        let page = history
            .fetch_page(before, HISTORY_PAGE_SIZE)
            .await
            .map_err(|e| PresenterError::Purge(Box::new(e)))?;

        let Some(&oldest) = page.last() else {
            break;
        };
        before = Some(oldest);

        for &message in &page {
            history
                .delete(message)
                .await
                .map_err(|e| PresenterError::Purge(Box::new(e)))?;
            deleted += 1;
        }

        if page.len() < HISTORY_PAGE_SIZE as usize {
            break;
        }
        debug!("Purged {} messages so far", deleted);
    }

    Ok(deleted)
}

#[async_trait]
impl ChannelGateway for DiscordChannel {
    async fn resolve(&self) -> Result<(), PresenterError> {
        let channel = self
            .channel_id
            .to_channel(&self.http)
            .await
            .map_err(|_| PresenterError::ChannelNotFound(self.channel_id))?;

        match channel.guild() {
            Some(guild_channel) => {
                debug!("Resolved channel #{} ({})", guild_channel.name, self.channel_id);
                Ok(())
            }
            None => Err(PresenterError::ChannelNotFound(self.channel_id)),
        }
    }

    async fn purge(&self) -> Result<usize, PresenterError> {
        let deleted = purge_history(self).await?;
        info!("Purged {} messages from channel {}", deleted, self.channel_id);
        Ok(deleted)
    }

    async fn send(&self, view: &RootView) -> Result<MessageId, PresenterError> {
        let attachment = CreateAttachment::path(&self.image_path)
            .await
            .map_err(|e| PresenterError::Send(Box::new(e)))?;

        let message = self
            .channel_id
            .send_message(
                &self.http,
                CreateMessage::new()
                    .add_file(attachment)
                    .components(view.components()),
            )
            .await
            .map_err(|e| PresenterError::Send(Box::new(e)))?;

        Ok(message.id)
    }

    async fn replace(
        &self,
        message: MessageId,
        view: &RootView,
    ) -> Result<MessageId, PresenterError> {
        let mut existing = self
            .channel_id
            .message(&self.http, message)
            .await
            .map_err(|e| PresenterError::Fetch(message, Box::new(e)))?;

        existing
            .edit(&self.http, EditMessage::new().components(view.components()))
            .await
            .map_err(|e| PresenterError::Edit(message, Box::new(e)))?;

        Ok(existing.id)
    }
}
