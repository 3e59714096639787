//! In-memory `PlatformPort` used by handler tests.

use std::{collections::HashMap, sync::Mutex, time::Duration};

use async_trait::async_trait;

use crate::{
    domain::{ChannelId, MessageId, MessageRef, OutgoingImage, TargetMessage, UserId},
    errors::Error,
    ports::PlatformPort,
    Result,
};

pub const BOT_ID: UserId = UserId(999);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Resolve(ChannelId),
    Fetch(ChannelId, MessageId),
    Send(ChannelId, OutgoingImage),
    Delete(MessageRef),
}

#[derive(Default)]
pub struct FakePlatform {
    pub channels: Vec<ChannelId>,
    pub messages: HashMap<(ChannelId, MessageId), TargetMessage>,
    pub latency: Option<Duration>,
    pub fail_send: bool,
    pub fail_delete: bool,
    next_id: Mutex<u64>,
    pub calls: Mutex<Vec<Call>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(5000),
            ..Default::default()
        }
    }

    pub fn with_channel(mut self, channel_id: ChannelId) -> Self {
        self.channels.push(channel_id);
        self
    }

    pub fn with_message(mut self, msg: TargetMessage) -> Self {
        self.messages.insert((msg.channel_id, msg.id), msg);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sends(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Send(..)))
            .count()
    }

    pub fn deletes(&self) -> Vec<MessageRef> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PlatformPort for FakePlatform {
    fn bot_user_id(&self) -> UserId {
        BOT_ID
    }

    async fn latency(&self) -> Option<Duration> {
        self.latency
    }

    async fn resolve_channel(&self, channel_id: ChannelId) -> Result<ChannelId> {
        self.push(Call::Resolve(channel_id));
        if self.channels.contains(&channel_id) {
            Ok(channel_id)
        } else {
            Err(Error::NotFound(format!("channel {channel_id}")))
        }
    }

    async fn fetch_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<TargetMessage> {
        self.push(Call::Fetch(channel_id, message_id));
        self.messages
            .get(&(channel_id, message_id))
            .copied()
            .ok_or_else(|| Error::NotFound(format!("message {message_id}")))
    }

    async fn send_image(&self, channel_id: ChannelId, image: &OutgoingImage) -> Result<MessageRef> {
        self.push(Call::Send(channel_id, image.clone()));
        if self.fail_send {
            return Err(Error::Forbidden("missing Send Messages".to_string()));
        }
        let mut guard = self.next_id.lock().unwrap();
        let id = *guard;
        *guard += 1;
        Ok(MessageRef {
            channel_id,
            message_id: MessageId(id),
        })
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.push(Call::Delete(msg));
        if self.fail_delete {
            return Err(Error::NotFound("Unknown Message".to_string()));
        }
        Ok(())
    }
}
