//! Forward-then-delete workflow for images posted in the source channel.

use tracing::{error, info, warn};

use crate::{
    audit::{AuditEvent, AuditLogger},
    config::Config,
    domain::{Attachment, InboundMessage, MessageRef, OutgoingImage},
    ports::PlatformPort,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    NoSourceChannel,
    OtherChannel,
    AutomatedAuthor,
    NoAttachments,
    NotAnImage,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    Ignored(IgnoreReason),
    NoTargetChannel,
    TargetUnavailable(String),
    SendFailed(String),
    /// Forwarded, but the original is still in the source channel.
    DeleteFailed {
        forwarded: MessageRef,
        error: String,
    },
    Relayed {
        forwarded: MessageRef,
    },
}

/// Decide whether a message qualifies for relay; on success returns the
/// attachment to forward. Only the first attachment is ever considered.
pub fn classify<'a>(
    cfg: &Config,
    msg: &'a InboundMessage,
) -> std::result::Result<&'a Attachment, IgnoreReason> {
    let Some(source) = cfg.source_channel else {
        return Err(IgnoreReason::NoSourceChannel);
    };
    if msg.channel_id != source {
        return Err(IgnoreReason::OtherChannel);
    }
    if msg.author.automated {
        return Err(IgnoreReason::AutomatedAuthor);
    }
    let Some(first) = msg.attachments.first() else {
        return Err(IgnoreReason::NoAttachments);
    };
    if !first.is_image() {
        return Err(IgnoreReason::NotAnImage);
    }
    Ok(first)
}

pub fn build_outgoing(cfg: &Config, msg: &InboundMessage, attachment: &Attachment) -> OutgoingImage {
    OutgoingImage {
        url: attachment.url.clone(),
        filename: attachment.filename.clone(),
        caption: cfg
            .relay_attribution
            .then(|| format!("Image from: **{}**", msg.author.tag)),
    }
}

pub async fn relay_image(
    cfg: &Config,
    platform: &dyn PlatformPort,
    audit: &AuditLogger,
    msg: &InboundMessage,
) -> RelayOutcome {
    let attachment = match classify(cfg, msg) {
        Ok(a) => a,
        Err(reason) => return RelayOutcome::Ignored(reason),
    };

    let Some(target) = cfg.target_channel else {
        warn!("Image in source channel but TARGET_CHANNEL_ID is not set; not relaying");
        return RelayOutcome::NoTargetChannel;
    };

    let target = match platform.resolve_channel(target).await {
        Ok(c) => c,
        Err(e) => {
            error!("Error during image forwarding: target channel {target}: {e}");
            return RelayOutcome::TargetUnavailable(e.to_string());
        }
    };

    let outgoing = build_outgoing(cfg, msg, attachment);
    let forwarded = match platform.send_image(target, &outgoing).await {
        Ok(m) => m,
        Err(e) => {
            error!("Error during image forwarding: send to {target} failed: {e}");
            return RelayOutcome::SendFailed(e.to_string());
        }
    };

    let source = msg.message_ref();
    if let Err(e) = platform.delete_message(source).await {
        // No retry: the copy in the target channel stays and the original is
        // flagged for manual cleanup.
        warn!(
            "Forwarded image from {} as {} but could not delete original {}: {e}",
            msg.author.tag, forwarded.message_id, source.message_id
        );
        audit.record(AuditEvent::relay_cleanup_needed(
            &msg.author,
            source,
            forwarded,
            &e.to_string(),
        ));
        return RelayOutcome::DeleteFailed {
            forwarded,
            error: e.to_string(),
        };
    }

    info!("Forwarded an image from {}.", msg.author.tag);
    audit.record(AuditEvent::relay(&msg.author, source, forwarded));
    RelayOutcome::Relayed { forwarded }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Author, ChannelId, MessageId, UserId},
        fake::{Call, FakePlatform},
        security::AuthorizationSet,
    };

    const SOURCE: ChannelId = ChannelId(100);
    const TARGET: ChannelId = ChannelId(200);

    fn cfg() -> Config {
        Config {
            discord_token: "x".to_string(),
            application_id: None,
            source_channel: Some(SOURCE),
            target_channel: Some(TARGET),
            relay_attribution: true,
            authorized_users: AuthorizationSet::default(),
            health_enabled: false,
            health_port: 8080,
            audit_log_path: None,
            audit_log_json: false,
        }
    }

    fn image(url: &str) -> Attachment {
        Attachment {
            url: url.to_string(),
            filename: "cat.png".to_string(),
            content_type: Some("image/png".to_string()),
        }
    }

    fn message(channel_id: ChannelId, attachments: Vec<Attachment>) -> InboundMessage {
        InboundMessage {
            id: MessageId(1),
            channel_id,
            author: Author {
                id: UserId(5),
                tag: "alice".to_string(),
                automated: false,
            },
            attachments,
        }
    }

    async fn run(cfg: &Config, platform: &FakePlatform, msg: &InboundMessage) -> RelayOutcome {
        relay_image(cfg, platform, &AuditLogger::disabled(), msg).await
    }

    #[tokio::test]
    async fn ignores_other_channels() {
        let platform = FakePlatform::new().with_channel(TARGET);
        let msg = message(ChannelId(101), vec![image("https://cdn/a.png")]);

        let out = run(&cfg(), &platform, &msg).await;

        assert_eq!(out, RelayOutcome::Ignored(IgnoreReason::OtherChannel));
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn relay_is_inert_without_source_channel() {
        let mut cfg = cfg();
        cfg.source_channel = None;
        let platform = FakePlatform::new().with_channel(TARGET);
        let msg = message(SOURCE, vec![image("https://cdn/a.png")]);

        let out = run(&cfg, &platform, &msg).await;

        assert_eq!(out, RelayOutcome::Ignored(IgnoreReason::NoSourceChannel));
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn ignores_automated_authors() {
        let platform = FakePlatform::new().with_channel(TARGET);
        let mut msg = message(SOURCE, vec![image("https://cdn/a.png")]);
        msg.author.automated = true;

        let out = run(&cfg(), &platform, &msg).await;

        assert_eq!(out, RelayOutcome::Ignored(IgnoreReason::AutomatedAuthor));
        assert_eq!(platform.sends(), 0);
        assert!(platform.deletes().is_empty());
    }

    #[tokio::test]
    async fn ignores_messages_without_attachments() {
        let platform = FakePlatform::new().with_channel(TARGET);
        let msg = message(SOURCE, vec![]);

        let out = run(&cfg(), &platform, &msg).await;

        assert_eq!(out, RelayOutcome::Ignored(IgnoreReason::NoAttachments));
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn only_the_first_attachment_decides() {
        let platform = FakePlatform::new().with_channel(TARGET);
        let pdf = Attachment {
            url: "https://cdn/a.pdf".to_string(),
            filename: "a.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
        };
        let untyped = Attachment {
            content_type: None,
            ..image("https://cdn/b.png")
        };

        for first in [pdf, untyped] {
            let msg = message(SOURCE, vec![first, image("https://cdn/c.png")]);
            let out = run(&cfg(), &platform, &msg).await;
            assert_eq!(out, RelayOutcome::Ignored(IgnoreReason::NotAnImage));
        }
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn sends_once_then_deletes_original() {
        let platform = FakePlatform::new().with_channel(TARGET);
        let msg = message(
            SOURCE,
            vec![image("https://cdn/a.png"), image("https://cdn/b.png")],
        );

        let out = run(&cfg(), &platform, &msg).await;

        let RelayOutcome::Relayed { forwarded } = out else {
            panic!("expected relay, got {out:?}");
        };
        assert_eq!(forwarded.channel_id, TARGET);
        assert_eq!(
            platform.calls(),
            vec![
                Call::Resolve(TARGET),
                Call::Send(
                    TARGET,
                    OutgoingImage {
                        url: "https://cdn/a.png".to_string(),
                        filename: "cat.png".to_string(),
                        caption: Some("Image from: **alice**".to_string()),
                    }
                ),
                Call::Delete(msg.message_ref()),
            ]
        );
    }

    #[test]
    fn attribution_toggle_drops_caption() {
        let mut cfg = cfg();
        cfg.relay_attribution = false;
        let msg = message(SOURCE, vec![image("https://cdn/a.png")]);

        let out = build_outgoing(&cfg, &msg, &msg.attachments[0]);

        assert_eq!(out.caption, None);
        assert_eq!(out.url, "https://cdn/a.png");
    }

    #[tokio::test]
    async fn send_failure_skips_delete() {
        let mut platform = FakePlatform::new().with_channel(TARGET);
        platform.fail_send = true;
        let msg = message(SOURCE, vec![image("https://cdn/a.png")]);

        let out = run(&cfg(), &platform, &msg).await;

        assert!(matches!(out, RelayOutcome::SendFailed(_)));
        assert_eq!(platform.sends(), 1);
        assert!(platform.deletes().is_empty());
    }

    #[tokio::test]
    async fn missing_target_channel_sends_nothing() {
        let platform = FakePlatform::new();
        let msg = message(SOURCE, vec![image("https://cdn/a.png")]);

        let out = run(&cfg(), &platform, &msg).await;

        assert!(matches!(out, RelayOutcome::TargetUnavailable(_)));
        assert_eq!(platform.sends(), 0);
        assert!(platform.deletes().is_empty());

        let mut cfg = cfg();
        cfg.target_channel = None;
        let out = run(&cfg, &platform, &msg).await;
        assert_eq!(out, RelayOutcome::NoTargetChannel);
    }

    #[tokio::test]
    async fn delete_failure_is_contained_and_audited() {
        let mut platform = FakePlatform::new().with_channel(TARGET);
        platform.fail_delete = true;
        let msg = message(SOURCE, vec![image("https://cdn/a.png")]);

        let path = std::path::PathBuf::from(format!(
            "/tmp/relay-cleanup-{}-{}.log",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let audit = AuditLogger::new(Some(path.clone()), true);

        let out = relay_image(&cfg(), &platform, &audit, &msg).await;

        assert!(matches!(out, RelayOutcome::DeleteFailed { .. }));
        assert_eq!(platform.sends(), 1);
        assert_eq!(platform.deletes(), vec![msg.message_ref()]);

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("relay_cleanup_needed"));
        let _ = std::fs::remove_file(&path);
    }
}
