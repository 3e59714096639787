use std::time::Duration;

use async_trait::async_trait;

use crate::{
    domain::{ChannelId, MessageId, MessageRef, OutgoingImage, TargetMessage, UserId},
    Result,
};

/// Hexagonal port for the chat platform.
///
/// Every call is attempted once. Implementations map "unknown channel/message"
/// to `Error::NotFound` and missing permissions to `Error::Forbidden`.
#[async_trait]
pub trait PlatformPort: Send + Sync {
    /// The bot's own user id.
    fn bot_user_id(&self) -> UserId;

    /// Most recent gateway heartbeat round trip, if one has been measured.
    async fn latency(&self) -> Option<Duration>;

    /// Confirm a channel exists and is reachable by the bot.
    async fn resolve_channel(&self, channel_id: ChannelId) -> Result<ChannelId>;

    async fn fetch_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<TargetMessage>;

    async fn send_image(&self, channel_id: ChannelId, image: &OutgoingImage) -> Result<MessageRef>;

    async fn delete_message(&self, msg: MessageRef) -> Result<()>;
}
