//! # Status Publisher
//!
//! The chat platform seen through a narrow interface: find the status message
//! this bot owns, post or edit it, and set the bot's presence.
//!
//! The owned message is "the most recent message in the channel, if this bot
//! wrote it". Anything else means a new message is posted.

mod errors;
mod memory;

pub use errors::{PublishError, PublishResult};
pub use memory::{MemoryPublisher, PublishedMessage};

use async_trait::async_trait;

use crate::display::{DisplayPanel, Presence};

/// Identifies a message the bot can edit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    pub channel_id: String,
    pub message_id: String,
}

impl MessageHandle {
    pub fn new(channel_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            message_id: message_id.into(),
        }
    }
}

/// Chat platform collaborator
#[async_trait]
pub trait ChatPublisher: Send + Sync {
    /// Latest channel message, if this bot authored it
    async fn find_owned_message(&self) -> PublishResult<Option<MessageHandle>>;

    /// Edit `handle` in place, or post a new message when `handle` is `None`
    async fn publish(
        &self,
        handle: Option<&MessageHandle>,
        panel: &DisplayPanel,
    ) -> PublishResult<MessageHandle>;

    /// Set the bot's presence indicator and activity
    async fn set_presence(&self, presence: &Presence) -> PublishResult<()>;
}

/// Post or edit the status message for one cycle
pub async fn publish_panel(
    publisher: &dyn ChatPublisher,
    panel: &DisplayPanel,
) -> PublishResult<(MessageHandle, bool)> {
    let owned = publisher.find_owned_message().await?;
    let edited = owned.is_some();
    let handle = publisher.publish(owned.as_ref(), panel).await?;
    Ok((handle, edited))
}
