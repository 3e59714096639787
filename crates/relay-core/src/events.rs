use crate::domain::{Author, InboundMessage, TargetMessage};

pub const PING_COMMAND: &str = "ping";
pub const DELETE_COMMAND: &str = "delete";
pub const DELETE_CONTEXT_COMMAND: &str = "Delete Bot Image";

/// Name of the `/delete` string option.
pub const DELETE_OPTION: &str = "message_id";

/// Platform-agnostic inbound event.
///
/// Platform-specific fields stay in the adapter.
#[derive(Clone, Debug)]
pub enum IncomingEvent {
    MessageCreated(InboundMessage),
    ChatInputCommand(ChatInputCommand),
    MessageContextCommand(MessageContextCommand),
    /// Anything the bot does not handle (component clicks, autocomplete, ...).
    Unsupported { kind: String },
}

impl IncomingEvent {
    /// Command events owe the invoker exactly one reply; nothing else gets one.
    pub fn expects_reply(&self) -> bool {
        matches!(
            self,
            IncomingEvent::ChatInputCommand(_) | IncomingEvent::MessageContextCommand(_)
        )
    }
}

#[derive(Clone, Debug)]
pub struct ChatInputCommand {
    pub invoker: Author,
    pub name: String,
    pub options: Vec<CommandOption>,
}

impl ChatInputCommand {
    pub fn string_option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .map(|o| o.value.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandOption {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug)]
pub struct MessageContextCommand {
    pub invoker: Author,
    pub name: String,
    /// The message the user acted on. `None` if the platform did not resolve it.
    pub target: Option<TargetMessage>,
}

/// A single interaction response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    /// Visible only to the invoking user.
    pub ephemeral: bool,
}

impl Reply {
    pub fn private(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
        }
    }
}
