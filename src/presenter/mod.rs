//! Ownership of the single presented message in the target channel.
//!
//! The presenter purges the channel and posts the message on every
//! (re)connect, and keeps the message's root view alive by swapping in a
//! fresh [`RootView`] each time the current one times out. The timeout is
//! driven by one long-lived task (see [`Presenter::spawn_view_timer`]) that
//! watches the current deadline.

pub mod gateway;
#[cfg(test)]
pub mod testing;

pub use gateway::{ChannelGateway, DiscordChannel};

use serenity::all::{ChannelId, MessageId};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::view::{ROOT_VIEW_TIMEOUT, Reaction, RootView, ViewEvent, ViewState};

#[derive(Error, Debug)]
pub enum PresenterError {
    #[error("Channel {0} not found")]
    ChannelNotFound(ChannelId),
    #[error("Failed to purge channel history: {0}")]
    Purge(#[source] Box<serenity::Error>),
    #[error("Failed to send message: {0}")]
    Send(#[source] Box<serenity::Error>),
    #[error("Failed to fetch message {0}: {1}")]
    Fetch(MessageId, #[source] Box<serenity::Error>),
    #[error("Failed to edit message {0}: {1}")]
    Edit(MessageId, #[source] Box<serenity::Error>),
    #[error("No message is being presented")]
    NoMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Disconnected,
    Initializing,
    Presenting,
}

struct PresenterState {
    phase: Phase,
    message: Option<MessageId>,
    /// Generation of the root view on `message`
    generation: u64,
}

pub struct Presenter {
    gateway: Arc<dyn ChannelGateway>,
    state: Mutex<PresenterState>,
    /// Held for the whole of initialize, post and replace
    operation: Mutex<()>,
    deadline: watch::Sender<Option<Instant>>,
    repost_on_stale: bool,
}

impl Presenter {
    pub fn new(gateway: Arc<dyn ChannelGateway>, repost_on_stale: bool) -> Self {
        let (deadline, _) = watch::channel(None);
        Self {
            gateway,
            state: Mutex::new(PresenterState {
                phase: Phase::Disconnected,
                message: None,
                generation: 0,
            }),
            operation: Mutex::new(()),
            deadline,
            repost_on_stale,
        }
    }

    #[cfg(test)]
    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase
    }

    #[cfg(test)]
    pub async fn current_message(&self) -> Option<MessageId> {
        self.state.lock().await.message
    }

    /// Generation of the root view currently accepting clicks.
    pub async fn live_generation(&self) -> Option<u64> {
        let state = self.state.lock().await;
        match state.phase {
            Phase::Presenting => Some(state.generation),
            _ => None,
        }
    }

    /// When the current root view times out, if one is armed.
    #[cfg(test)]
    pub fn deadline(&self) -> Option<Instant> {
        *self.deadline.borrow()
    }

    /// Purges the channel and posts a fresh message. Runs on every connect and resume.
    pub async fn initialize(&self) -> Result<MessageId, PresenterError> {
        let _operation = self.operation.lock().await;
        self.state.lock().await.phase = Phase::Initializing;

        if let Err(e) = self.gateway.resolve().await {
            self.mark_disconnected().await;
            return Err(e);
        }

        if let Err(e) = self.gateway.purge().await {
            self.mark_disconnected().await;
            return Err(e);
        }
        self.state.lock().await.message = None;

        self.post_locked().await
    }

    /// Sends a new message with a fresh root view and starts tracking it.
    #[cfg(test)]
    pub async fn post(&self) -> Result<MessageId, PresenterError> {
        let _operation = self.operation.lock().await;
        self.post_locked().await
    }

    /// Attaches a fresh root view to the tracked message.
    pub async fn replace_view(&self) -> Result<MessageId, PresenterError> {
        let _operation = self.operation.lock().await;
        self.replace_locked().await
    }

    async fn post_locked(&self) -> Result<MessageId, PresenterError> {
        let generation = self.state.lock().await.generation + 1;
        let view = RootView::new(generation);

        match self.gateway.send(&view).await {
            Ok(message) => {
                {
                    let mut state = self.state.lock().await;
                    state.message = Some(message);
                    state.generation = generation;
                    state.phase = Phase::Presenting;
                }
                self.arm();
                info!("Message {} sent to channel", message);
                Ok(message)
            }
            Err(e) => {
                self.mark_disconnected().await;
                Err(e)
            }
        }
    }

    async fn replace_locked(&self) -> Result<MessageId, PresenterError> {
        let (message, generation) = {
            let state = self.state.lock().await;
            (state.message.ok_or(PresenterError::NoMessage)?, state.generation + 1)
        };
        let view = RootView::new(generation);

        let message = self.gateway.replace(message, &view).await?;
        {
            let mut state = self.state.lock().await;
            state.message = Some(message);
            state.generation = generation;
            state.phase = Phase::Presenting;
        }
        self.arm();
        info!("Message {} updated with view {}", message, generation);
        Ok(message)
    }

    async fn mark_disconnected(&self) {
        self.state.lock().await.phase = Phase::Disconnected;
        self.disarm();
    }

    fn arm(&self) {
        self.deadline
            .send_replace(Some(Instant::now() + ROOT_VIEW_TIMEOUT));
    }

    fn disarm(&self) {
        self.deadline.send_replace(None);
    }

    async fn on_view_timeout(&self) {
        let _operation = self.operation.lock().await;

        // A post or replace may have re-armed the deadline while we waited.
        let deadline = *self.deadline.borrow();
        match deadline {
            Some(at) if at <= Instant::now() => {}
            _ => return,
        }

        let (_, reaction) = ViewState::Initial.on(ViewEvent::Timeout);
        if reaction != Reaction::ReplaceView {
            return;
        }

        debug!("Root view timed out, replacing");
        let Err(e) = self.replace_locked().await else {
            return;
        };

        error!("Failed to replace timed out view: {}", e);
        if self.repost_on_stale {
            warn!("Reposting after failed view replace");
            match self.post_locked().await {
                Ok(_) => return,
                Err(e) => error!("Repost failed: {}", e),
            }
        }

        // The timed out view stops answering clicks even if its message survived.
        self.mark_disconnected().await;
    }

    /// Spawns the task that owns the root view's lifetime.
    ///
    /// The task sleeps until the armed deadline and then replaces the view,
    /// which re-arms the deadline. Posting or replacing early moves the
    /// deadline and the task follows it.
    pub fn spawn_view_timer(self: &Arc<Self>) -> JoinHandle<()> {
        let presenter = Arc::clone(self);
        let mut deadline = self.deadline.subscribe();

        tokio::spawn(async move {
            loop {
                let next = *deadline.borrow_and_update();
                match next {
                    Some(at) => {
                        tokio::select! {
                            _ = tokio::time::sleep_until(at) => presenter.on_view_timeout().await,
                            changed = deadline.changed() => {
                                if changed.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    None => {
                        if deadline.changed().await.is_err() {
                            break;
                        }
                    }
                }
            }
        })
    }
}
