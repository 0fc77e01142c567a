//! In-memory channel, for tests and dry runs

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use super::errors::{PublishError, PublishResult};
use super::{ChatPublisher, MessageHandle};
use crate::display::{DisplayPanel, Presence};

const CHANNEL_ID: &str = "memory";
const BOT_AUTHOR: &str = "bot";

/// A message in the in-memory channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub id: String,
    pub author_id: String,
    pub panel: Option<DisplayPanel>,
    pub edits: u32,
}

/// Channel simulation that records every call
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    messages: RwLock<Vec<PublishedMessage>>,
    presences: RwLock<Vec<Presence>>,
    next_id: AtomicU64,
    fail_publish: AtomicBool,
    fail_presence: AtomicBool,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Someone else writes to the channel
    pub fn push_foreign_message(&self, author_id: &str) {
        let id = self.allocate_id();
        if let Ok(mut messages) = self.messages.write() {
            messages.push(PublishedMessage {
                id,
                author_id: author_id.to_string(),
                panel: None,
                edits: 0,
            });
        }
    }

    /// Make publish calls fail until reset
    pub fn set_fail_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    /// Make presence calls fail until reset
    pub fn set_fail_presence(&self, fail: bool) {
        self.fail_presence.store(fail, Ordering::SeqCst);
    }

    /// Every message in channel order
    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.messages.read().map(|m| m.clone()).unwrap_or_default()
    }

    /// Messages written by the bot
    pub fn bot_messages(&self) -> Vec<PublishedMessage> {
        self.messages()
            .into_iter()
            .filter(|m| m.author_id == BOT_AUTHOR)
            .collect()
    }

    /// Every presence set, oldest first
    pub fn presences(&self) -> Vec<Presence> {
        self.presences.read().map(|p| p.clone()).unwrap_or_default()
    }

    fn allocate_id(&self) -> String {
        (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }
}

#[async_trait]
impl ChatPublisher for MemoryPublisher {
    async fn find_owned_message(&self) -> PublishResult<Option<MessageHandle>> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(PublishError::Request("memory channel unavailable".to_string()));
        }
        let messages = self
            .messages
            .read()
            .map_err(|_| PublishError::Request("lock poisoned".to_string()))?;

        Ok(messages
            .last()
            .filter(|m| m.author_id == BOT_AUTHOR)
            .map(|m| MessageHandle::new(CHANNEL_ID, m.id.clone())))
    }

    async fn publish(
        &self,
        handle: Option<&MessageHandle>,
        panel: &DisplayPanel,
    ) -> PublishResult<MessageHandle> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(PublishError::Request("memory channel unavailable".to_string()));
        }

        if let Some(handle) = handle {
            let mut messages = self
                .messages
                .write()
                .map_err(|_| PublishError::Request("lock poisoned".to_string()))?;
            let message = messages
                .iter_mut()
                .find(|m| m.id == handle.message_id)
                .ok_or_else(|| PublishError::Http {
                    status: 404,
                    body: "Unknown Message".to_string(),
                })?;
            message.panel = Some(panel.clone());
            message.edits += 1;
            return Ok(handle.clone());
        }

        let id = self.allocate_id();
        let mut messages = self
            .messages
            .write()
            .map_err(|_| PublishError::Request("lock poisoned".to_string()))?;
        messages.push(PublishedMessage {
            id: id.clone(),
            author_id: BOT_AUTHOR.to_string(),
            panel: Some(panel.clone()),
            edits: 0,
        });
        Ok(MessageHandle::new(CHANNEL_ID, id))
    }

    async fn set_presence(&self, presence: &Presence) -> PublishResult<()> {
        if self.fail_presence.load(Ordering::SeqCst) {
            return Err(PublishError::Gateway("memory gateway closed".to_string()));
        }
        self.presences
            .write()
            .map_err(|_| PublishError::Request("lock poisoned".to_string()))?
            .push(presence.clone());
        Ok(())
    }
}
