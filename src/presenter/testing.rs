//! In-memory [`ChannelGateway`] for tests.

use async_trait::async_trait;
use serenity::all::{ChannelId, MessageId};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::{ChannelGateway, PresenterError};
use crate::view::RootView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Resolve,
    Purge,
    /// Generation of the view sent
    Send(u64),
    /// Message id and generation of the new view
    Replace(u64, u64),
}

#[derive(Default)]
pub struct FakeChannel {
    calls: Mutex<Vec<Call>>,
    last_id: AtomicU64,
    pub unresolved: AtomicBool,
    pub fail_send: AtomicBool,
    /// Makes the next replace fail as if the message had been deleted
    pub message_gone: AtomicBool,
    /// Makes every replace fail at the edit step
    pub fail_edit: AtomicBool,
}

impl FakeChannel {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn replaces(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Replace(..)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ChannelGateway for FakeChannel {
    async fn resolve(&self) -> Result<(), PresenterError> {
        self.record(Call::Resolve);
        if self.unresolved.load(Ordering::SeqCst) {
            return Err(PresenterError::ChannelNotFound(ChannelId::new(1)));
        }
        Ok(())
    }

    async fn purge(&self) -> Result<usize, PresenterError> {
        self.record(Call::Purge);
        Ok(0)
    }

    async fn send(&self, view: &RootView) -> Result<MessageId, PresenterError> {
        self.record(Call::Send(view.generation));
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(PresenterError::Send(Box::new(serenity::Error::Other(
                "send rejected",
            ))));
        }
        self.message_gone.store(false, Ordering::SeqCst);
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MessageId::new(id))
    }

    async fn replace(
        &self,
        message: MessageId,
        view: &RootView,
    ) -> Result<MessageId, PresenterError> {
        self.record(Call::Replace(message.get(), view.generation));
        if self.message_gone.load(Ordering::SeqCst) {
            return Err(PresenterError::Fetch(
                message,
                Box::new(serenity::Error::Other("Unknown Message")),
            ));
        }
        if self.fail_edit.load(Ordering::SeqCst) {
            return Err(PresenterError::Edit(
                message,
                Box::new(serenity::Error::Other("Missing Permissions")),
            ));
        }
        Ok(message)
    }
}
