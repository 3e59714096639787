//! serenity models → relay-core events.

use serenity::all::{
    CommandDataOption, CommandDataOptionValue, CommandInteraction, CommandType, Interaction,
    Message, ResolvedTarget, User,
};

use relay_core::{
    domain::{Attachment, Author, ChannelId, InboundMessage, MessageId, TargetMessage, UserId},
    events::{ChatInputCommand, CommandOption, IncomingEvent, MessageContextCommand},
};

pub fn author(user: &User) -> Author {
    Author {
        id: UserId(user.id.get()),
        tag: user.tag(),
        automated: user.bot,
    }
}

pub fn inbound_message(msg: &Message) -> InboundMessage {
    let mut author = author(&msg.author);
    // Webhook posts (including other relays) count as automated.
    author.automated |= msg.webhook_id.is_some();

    InboundMessage {
        id: MessageId(msg.id.get()),
        channel_id: ChannelId(msg.channel_id.get()),
        author,
        attachments: msg
            .attachments
            .iter()
            .map(|a| Attachment {
                url: a.url.clone(),
                filename: a.filename.clone(),
                content_type: a.content_type.clone(),
            })
            .collect(),
    }
}

pub fn target_message(msg: &Message) -> TargetMessage {
    TargetMessage {
        id: MessageId(msg.id.get()),
        channel_id: ChannelId(msg.channel_id.get()),
        author_id: UserId(msg.author.id.get()),
    }
}

pub fn interaction_event(interaction: &Interaction) -> IncomingEvent {
    match interaction {
        Interaction::Command(cmd) => command_event(cmd),
        other => IncomingEvent::Unsupported {
            kind: format!("{:?} interaction", other.kind()),
        },
    }
}

pub fn command_event(cmd: &CommandInteraction) -> IncomingEvent {
    let invoker = author(&cmd.user);
    let name = cmd.data.name.clone();

    match cmd.data.kind {
        CommandType::ChatInput => IncomingEvent::ChatInputCommand(ChatInputCommand {
            invoker,
            name,
            options: string_options(&cmd.data.options),
        }),
        CommandType::Message => {
            let target = match cmd.data.target() {
                Some(ResolvedTarget::Message(m)) => Some(target_message(m)),
                _ => None,
            };
            IncomingEvent::MessageContextCommand(MessageContextCommand {
                invoker,
                name,
                target,
            })
        }
        other => IncomingEvent::Unsupported {
            kind: format!("{other:?} command"),
        },
    }
}

fn string_options(options: &[CommandDataOption]) -> Vec<CommandOption> {
    options
        .iter()
        .filter_map(|o| match &o.value {
            CommandDataOptionValue::String(s) => Some(CommandOption {
                name: o.name.clone(),
                value: s.clone(),
            }),
            _ => None,
        })
        .collect()
}
