//! Discord adapter (serenity).
//!
//! This crate implements the `relay-core` PlatformPort over the Discord REST
//! API and feeds gateway events into the core router.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use serenity::all::{
    ChannelId as DiscordChannelId, CreateAttachment, CreateMessage, Http,
    MessageId as DiscordMessageId, ShardManager,
};

pub mod commands;
pub mod convert;
pub mod router;

use relay_core::{
    domain::{ChannelId, MessageId, MessageRef, OutgoingImage, TargetMessage, UserId},
    errors::Error,
    ports::PlatformPort,
    Result,
};

#[derive(Clone)]
pub struct DiscordPlatform {
    http: Arc<Http>,
    shard_manager: Arc<ShardManager>,
    bot_id: UserId,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>, shard_manager: Arc<ShardManager>, bot_id: UserId) -> Self {
        Self {
            http,
            shard_manager,
            bot_id,
        }
    }

    fn dc_channel(channel_id: ChannelId) -> DiscordChannelId {
        DiscordChannelId::new(channel_id.0)
    }

    fn dc_msg_id(message_id: MessageId) -> DiscordMessageId {
        DiscordMessageId::new(message_id.0)
    }

    /// 404 and 403 get their own variants so handlers can word replies.
    pub fn map_err(e: serenity::Error) -> Error {
        if let serenity::Error::Http(http_err) = &e {
            match http_err.status_code().map(|s| s.as_u16()) {
                Some(404) => return Error::NotFound(format!("discord: {e}")),
                Some(403) => return Error::Forbidden(format!("discord: {e}")),
                _ => {}
            }
        }
        Error::External(format!("discord error: {e}"))
    }
}

#[async_trait]
impl PlatformPort for DiscordPlatform {
    fn bot_user_id(&self) -> UserId {
        self.bot_id
    }

    async fn latency(&self) -> Option<Duration> {
        let runners = self.shard_manager.runners.lock().await;
        runners.values().find_map(|r| r.latency)
    }

    async fn resolve_channel(&self, channel_id: ChannelId) -> Result<ChannelId> {
        self.http
            .get_channel(Self::dc_channel(channel_id))
            .await
            .map_err(Self::map_err)?;
        Ok(channel_id)
    }

    async fn fetch_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<TargetMessage> {
        let msg = self
            .http
            .get_message(Self::dc_channel(channel_id), Self::dc_msg_id(message_id))
            .await
            .map_err(Self::map_err)?;
        Ok(convert::target_message(&msg))
    }

    async fn send_image(&self, channel_id: ChannelId, image: &OutgoingImage) -> Result<MessageRef> {
        // Re-upload instead of linking: the source CDN URL dies with the original.
        let mut file = CreateAttachment::url(&self.http, &image.url)
            .await
            .map_err(Self::map_err)?;
        if !image.filename.is_empty() {
            file.filename = image.filename.clone();
        }

        let mut builder = CreateMessage::new().add_file(file);
        if let Some(caption) = &image.caption {
            builder = builder.content(caption);
        }

        let sent = Self::dc_channel(channel_id)
            .send_message(&*self.http, builder)
            .await
            .map_err(Self::map_err)?;

        Ok(MessageRef {
            channel_id,
            message_id: MessageId(sent.id.get()),
        })
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.http
            .delete_message(
                Self::dc_channel(msg.channel_id),
                Self::dc_msg_id(msg.message_id),
                None,
            )
            .await
            .map_err(Self::map_err)
    }
}
