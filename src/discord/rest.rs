//! # Discord REST Client
//!
//! The four REST calls the bot makes: who am I, what is the latest message in
//! the channel, post a message, edit a message.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::model::{Message, MessagePayload, User};
use crate::publisher::{PublishError, PublishResult};

/// Default REST base URL
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const USER_AGENT: &str = concat!("DiscordBot (statusbot, ", env!("CARGO_PKG_VERSION"), ")");

/// Authenticated REST client bound to one bot token
pub struct DiscordRest {
    client: reqwest::Client,
    api_base: String,
    authorization: String,
}

impl DiscordRest {
    pub fn new(api_base: &str, token: &str) -> PublishResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PublishError::Request(e.to_string()))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            authorization: format!("Bot {}", token),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(reqwest::header::AUTHORIZATION, &self.authorization)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> PublishResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Http {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| PublishError::Decode(e.to_string()))
    }

    /// `GET /users/@me`
    pub async fn current_user(&self) -> PublishResult<User> {
        let response = self
            .authorized(self.client.get(self.url("/users/@me")))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// `GET /channels/{id}/messages?limit=1`
    pub async fn latest_message(&self, channel_id: &str) -> PublishResult<Option<Message>> {
        let path = format!("/channels/{}/messages", channel_id);
        let response = self
            .authorized(self.client.get(self.url(&path)))
            .query(&[("limit", "1")])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(PublishError::ChannelNotFound(channel_id.to_string()));
        }
        let messages: Vec<Message> = Self::decode(response).await?;
        Ok(messages.into_iter().next())
    }

    /// `POST /channels/{id}/messages`
    pub async fn create_message(
        &self,
        channel_id: &str,
        payload: &MessagePayload,
    ) -> PublishResult<Message> {
        let path = format!("/channels/{}/messages", channel_id);
        let response = self
            .authorized(self.client.post(self.url(&path)))
            .json(payload)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// `PATCH /channels/{id}/messages/{message_id}`
    pub async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        payload: &MessagePayload,
    ) -> PublishResult<Message> {
        let path = format!("/channels/{}/messages/{}", channel_id, message_id);
        let response = self
            .authorized(self.client.patch(self.url(&path)))
            .json(payload)
            .send()
            .await?;
        Self::decode(response).await
    }
}
