use std::{fs::OpenOptions, io::Write, path::PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::{
    domain::{Author, MessageRef},
    Result,
};

const AUDIT_MAX_TEXT: usize = 500;

/// RFC3339 timestamp in UTC.
pub fn iso_timestamp_utc() -> String {
    Utc::now().to_rfc3339()
}

#[derive(Clone, Debug, Serialize)]
pub struct AuditEvent {
    pub timestamp: String,
    pub event: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forwarded_message_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditEvent {
    fn base(event: &str) -> Self {
        Self {
            timestamp: iso_timestamp_utc(),
            event: event.to_string(),
            user_id: None,
            username: None,
            channel_id: None,
            message_id: None,
            forwarded_message_id: None,
            reason: None,
            error: None,
        }
    }

    fn by(mut self, actor: &Author) -> Self {
        self.user_id = Some(actor.id.0);
        self.username = Some(actor.tag.clone());
        self
    }

    fn on(mut self, msg: MessageRef) -> Self {
        self.channel_id = Some(msg.channel_id.0);
        self.message_id = Some(msg.message_id.0);
        self
    }

    pub fn relay(author: &Author, source: MessageRef, forwarded: MessageRef) -> Self {
        let mut ev = Self::base("relay").by(author).on(source);
        ev.forwarded_message_id = Some(forwarded.message_id.0);
        ev
    }

    /// The image was forwarded but the original could not be removed.
    pub fn relay_cleanup_needed(
        author: &Author,
        source: MessageRef,
        forwarded: MessageRef,
        error: &str,
    ) -> Self {
        let mut ev = Self::base("relay_cleanup_needed").by(author).on(source);
        ev.forwarded_message_id = Some(forwarded.message_id.0);
        ev.error = Some(error.to_string());
        ev
    }

    pub fn moderation_delete(actor: &Author, deleted: MessageRef) -> Self {
        Self::base("moderation_delete").by(actor).on(deleted)
    }

    pub fn moderation_denied(actor: &Author) -> Self {
        Self::base("moderation_denied").by(actor)
    }

    pub fn moderation_refused(actor: &Author, target: MessageRef, reason: &str) -> Self {
        let mut ev = Self::base("moderation_refused").by(actor).on(target);
        ev.reason = Some(reason.to_string());
        ev
    }

    pub fn moderation_error(actor: &Author, error: &str) -> Self {
        let mut ev = Self::base("moderation_error").by(actor);
        ev.error = Some(error.to_string());
        ev
    }

    /// Human-readable block: a `[timestamp] event` header, then one indented
    /// `key: value` line per field that is set.
    fn text_block(&self) -> String {
        let mut block = format!("\n[{}] {}\n", self.timestamp, self.event);
        let ids = [
            ("user_id", self.user_id),
            ("channel_id", self.channel_id),
            ("message_id", self.message_id),
            ("forwarded_message_id", self.forwarded_message_id),
        ];
        for (key, id) in ids {
            if let Some(id) = id {
                block.push_str(&format!("  {key}: {id}\n"));
            }
        }
        let texts = [
            ("username", &self.username),
            ("reason", &self.reason),
            ("error", &self.error),
        ];
        for (key, text) in texts {
            if let Some(text) = text {
                block.push_str(&format!("  {key}: {text}\n"));
            }
        }
        block
    }
}

/// Append-only audit trail. Disabled when no path is configured.
#[derive(Clone, Debug, Default)]
pub struct AuditLogger {
    path: Option<PathBuf>,
    json: bool,
}

impl AuditLogger {
    pub fn new(path: Option<PathBuf>, json: bool) -> Self {
        Self { path, json }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn path(&self) -> Option<&std::path::Path> {
        self.path.as_deref()
    }

    /// Write an event, logging instead of failing.
    pub fn record(&self, event: AuditEvent) {
        if let Err(e) = self.write(event) {
            warn!("Failed to write audit event: {e}");
        }
    }

    pub fn write(&self, mut event: AuditEvent) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(s) = &event.error {
            event.error = Some(truncate_text(s, AUDIT_MAX_TEXT));
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if self.json {
            writeln!(file, "{}", serde_json::to_string(&event)?)?;
        } else {
            file.write_all(event.text_block().as_bytes())?;
        }
        Ok(())
    }
}

pub fn truncate_text(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut out = s.chars().take(max_len).collect::<String>();
    out.push_str("...");
    out
}
