//! Authorization-gated removal of images the bot forwarded.
//!
//! Both entry points (`/delete <id-or-link>` and the "Delete Bot Image"
//! message action) go through [`delete_bot_image`], which differ only in how
//! the target message is obtained. Every outcome maps to exactly one reply.

use tracing::{error, info, warn};

use crate::{
    audit::{AuditEvent, AuditLogger},
    config::Config,
    domain::{Author, MessageId, MessageRef, TargetMessage},
    errors::Error,
    events::Reply,
    ports::PlatformPort,
    security::{check_target_scope, is_authorized, ScopeViolation},
    Result,
};

pub const DENIED_TEXT: &str = "You are not authorized to use this command.";
pub const CHANNEL_NOT_FOUND_TEXT: &str = "Could not find the image channel.";
pub const REFUSED_TEXT: &str =
    "I can only delete images that I posted in the image channel. That message is not one of them.";
pub const DELETED_TEXT: &str = "Image deleted.";
pub const FAILED_TEXT: &str =
    "Failed to delete the message. Check that the message ID or link is correct and that I have permission to delete it.";

/// How the message to delete is obtained.
#[derive(Clone, Debug)]
pub enum DeleteTarget {
    /// Raw message id or full message link, looked up in the target channel.
    ById(String),
    /// Message supplied by the platform (context menu).
    Supplied(TargetMessage),
    /// Context menu invocation whose target the platform did not resolve.
    Unresolved,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModerationOutcome {
    Denied,
    ChannelNotFound,
    Refused(ScopeViolation),
    Deleted(MessageRef),
    Failed(String),
}

impl ModerationOutcome {
    /// The one private reply owed to the invoker.
    pub fn reply(&self) -> Reply {
        let text = match self {
            ModerationOutcome::Denied => DENIED_TEXT,
            ModerationOutcome::ChannelNotFound => CHANNEL_NOT_FOUND_TEXT,
            // Same wording for both violations: don't reveal who owns the message.
            ModerationOutcome::Refused(_) => REFUSED_TEXT,
            ModerationOutcome::Deleted(_) => DELETED_TEXT,
            ModerationOutcome::Failed(_) => FAILED_TEXT,
        };
        Reply::private(text)
    }
}

/// Take whatever follows the last `/`.
///
/// Handles both `https://discord.com/channels/<guild>/<channel>/<message>`
/// links and bare ids, which contain no separator.
pub fn extract_message_id(input: &str) -> &str {
    let input = input.trim();
    input.rsplit('/').next().unwrap_or(input).trim()
}

pub fn parse_message_id(input: &str) -> Result<MessageId> {
    let raw = extract_message_id(input);
    match raw.parse::<u64>() {
        Ok(id) if id != 0 => Ok(MessageId(id)),
        _ => Err(Error::InvalidInput(format!("not a message id: {raw:?}"))),
    }
}

pub async fn delete_bot_image(
    cfg: &Config,
    platform: &dyn PlatformPort,
    audit: &AuditLogger,
    invoker: &Author,
    target: DeleteTarget,
) -> ModerationOutcome {
    if !is_authorized(Some(invoker.id), &cfg.authorized_users) {
        warn!(
            "Unauthorized delete attempt by {} ({})",
            invoker.tag, invoker.id
        );
        audit.record(AuditEvent::moderation_denied(invoker));
        return ModerationOutcome::Denied;
    }

    let Some(target_channel) = cfg.target_channel else {
        warn!("Delete requested by {} but TARGET_CHANNEL_ID is not set", invoker.tag);
        return ModerationOutcome::ChannelNotFound;
    };

    let message = match target {
        DeleteTarget::Supplied(m) => m,
        DeleteTarget::Unresolved => {
            return fail(audit, invoker, "platform did not supply the target message");
        }
        DeleteTarget::ById(raw) => {
            let channel = match platform.resolve_channel(target_channel).await {
                Ok(c) => c,
                Err(e) if e.is_not_found() => {
                    warn!("Target channel {target_channel} not found: {e}");
                    return ModerationOutcome::ChannelNotFound;
                }
                Err(e) => return fail(audit, invoker, &e.to_string()),
            };

            let message_id = match parse_message_id(&raw) {
                Ok(id) => id,
                Err(e) => return fail(audit, invoker, &e.to_string()),
            };

            match platform.fetch_message(channel, message_id).await {
                Ok(m) => m,
                Err(e) => return fail(audit, invoker, &e.to_string()),
            }
        }
    };

    if let Err(violation) = check_target_scope(
        message.author_id,
        message.channel_id,
        platform.bot_user_id(),
        target_channel,
    ) {
        warn!(
            "{} tried to delete message {} ({violation:?})",
            invoker.tag, message.id
        );
        audit.record(AuditEvent::moderation_refused(
            invoker,
            message.message_ref(),
            &format!("{violation:?}"),
        ));
        return ModerationOutcome::Refused(violation);
    }

    let msg_ref = message.message_ref();
    if let Err(e) = platform.delete_message(msg_ref).await {
        return fail(audit, invoker, &e.to_string());
    }

    info!(
        "{} ({}) deleted bot image {}",
        invoker.tag, invoker.id, msg_ref.message_id
    );
    audit.record(AuditEvent::moderation_delete(invoker, msg_ref));
    ModerationOutcome::Deleted(msg_ref)
}

fn fail(audit: &AuditLogger, invoker: &Author, err: &str) -> ModerationOutcome {
    error!("Delete requested by {} failed: {err}", invoker.tag);
    audit.record(AuditEvent::moderation_error(invoker, err));
    ModerationOutcome::Failed(err.to_string())
}
