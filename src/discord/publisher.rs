//! Discord implementation of the chat publisher

use async_trait::async_trait;
use chrono::Utc;

use super::gateway::{DisconnectNotifier, Gateway, GatewayConfig};
use super::model::{MessagePayload, PresenceUpdate, User};
use super::rest::{DiscordRest, DEFAULT_API_BASE};
use crate::display::{DisplayPanel, Presence};
use crate::observability::{log_event_with_fields, Event};
use crate::publisher::{ChatPublisher, MessageHandle, PublishResult};

/// Discord connection settings
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub token: String,
    pub channel_id: String,
    pub api_base: String,
    pub gateway: GatewayConfig,
}

impl DiscordConfig {
    pub fn new(token: impl Into<String>, channel_id: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            gateway: GatewayConfig::new(token.clone()),
            token,
            channel_id: channel_id.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Publishes the status panel to one channel as one bot user
pub struct DiscordPublisher {
    rest: DiscordRest,
    gateway: Gateway,
    channel_id: String,
    bot_user: User,
}

impl DiscordPublisher {
    /// Resolve the bot's own identity. The gateway connects on first use.
    pub async fn connect(
        config: DiscordConfig,
        notifier: Option<DisconnectNotifier>,
    ) -> PublishResult<Self> {
        let rest = DiscordRest::new(&config.api_base, &config.token)?;
        let bot_user = rest.current_user().await?;

        log_event_with_fields(
            Event::IdentityResolved,
            &[
                ("channel_id", config.channel_id.as_str()),
                ("user_id", bot_user.id.as_str()),
                ("username", bot_user.username.as_str()),
            ],
        );

        Ok(Self {
            rest,
            gateway: Gateway::new(config.gateway, notifier),
            channel_id: config.channel_id,
            bot_user,
        })
    }

    pub fn bot_user(&self) -> &User {
        &self.bot_user
    }

    /// Drop the gateway session quietly
    pub async fn close(&self) {
        self.gateway.close().await;
    }
}

#[async_trait]
impl ChatPublisher for DiscordPublisher {
    async fn find_owned_message(&self) -> PublishResult<Option<MessageHandle>> {
        let latest = self.rest.latest_message(&self.channel_id).await?;
        Ok(latest
            .filter(|message| message.author.id == self.bot_user.id)
            .map(|message| MessageHandle::new(message.channel_id, message.id)))
    }

    async fn publish(
        &self,
        handle: Option<&MessageHandle>,
        panel: &DisplayPanel,
    ) -> PublishResult<MessageHandle> {
        let payload = MessagePayload::from_panel(panel, Utc::now());
        let message = match handle {
            Some(handle) => {
                self.rest
                    .edit_message(&handle.channel_id, &handle.message_id, &payload)
                    .await?
            }
            None => self.rest.create_message(&self.channel_id, &payload).await?,
        };
        Ok(MessageHandle::new(message.channel_id, message.id))
    }

    async fn set_presence(&self, presence: &Presence) -> PublishResult<()> {
        self.gateway
            .update_presence(&PresenceUpdate::from(presence))
            .await
    }
}
