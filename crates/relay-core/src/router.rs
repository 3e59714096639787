//! Event router: one `match` over the inbound event kind.

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    audit::AuditLogger,
    config::Config,
    events::{
        ChatInputCommand, IncomingEvent, MessageContextCommand, Reply, DELETE_COMMAND,
        DELETE_CONTEXT_COMMAND, DELETE_OPTION, PING_COMMAND,
    },
    moderation::{delete_bot_image, DeleteTarget},
    ports::PlatformPort,
    relay::relay_image,
};

pub const UNKNOWN_COMMAND_TEXT: &str = "Unknown command.";

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub platform: Arc<dyn PlatformPort>,
    pub audit: Arc<AuditLogger>,
}

impl AppState {
    pub fn new(cfg: Arc<Config>, platform: Arc<dyn PlatformPort>) -> Self {
        let audit = Arc::new(AuditLogger::new(
            cfg.audit_log_path.clone(),
            cfg.audit_log_json,
        ));
        Self {
            cfg,
            platform,
            audit,
        }
    }
}

/// Handle one event. Returns the interaction reply the adapter must send, if any.
///
/// Message events and unsupported kinds never produce a reply; command
/// events always produce exactly one.
pub async fn dispatch(state: &AppState, event: IncomingEvent) -> Option<Reply> {
    match event {
        IncomingEvent::MessageCreated(msg) => {
            relay_image(
                &state.cfg,
                state.platform.as_ref(),
                state.audit.as_ref(),
                &msg,
            )
            .await;
            None
        }
        IncomingEvent::ChatInputCommand(cmd) => Some(handle_chat_input(state, cmd).await),
        IncomingEvent::MessageContextCommand(cmd) => {
            Some(handle_message_context(state, cmd).await)
        }
        IncomingEvent::Unsupported { kind } => {
            debug!("Ignoring unsupported event: {kind}");
            None
        }
    }
}

async fn handle_chat_input(state: &AppState, cmd: ChatInputCommand) -> Reply {
    match cmd.name.as_str() {
        PING_COMMAND => ping(state).await,
        DELETE_COMMAND => {
            let raw = cmd.string_option(DELETE_OPTION).unwrap_or_default().to_string();
            delete_bot_image(
                &state.cfg,
                state.platform.as_ref(),
                state.audit.as_ref(),
                &cmd.invoker,
                DeleteTarget::ById(raw),
            )
            .await
            .reply()
        }
        other => {
            debug!("Unknown chat command: {other}");
            Reply::private(UNKNOWN_COMMAND_TEXT)
        }
    }
}

async fn handle_message_context(state: &AppState, cmd: MessageContextCommand) -> Reply {
    if cmd.name != DELETE_CONTEXT_COMMAND {
        debug!("Unknown message command: {}", cmd.name);
        return Reply::private(UNKNOWN_COMMAND_TEXT);
    }

    let target = match cmd.target {
        Some(m) => DeleteTarget::Supplied(m),
        None => DeleteTarget::Unresolved,
    };
    delete_bot_image(
        &state.cfg,
        state.platform.as_ref(),
        state.audit.as_ref(),
        &cmd.invoker,
        target,
    )
    .await
    .reply()
}

async fn ping(state: &AppState) -> Reply {
    match state.platform.latency().await {
        Some(latency) => {
            let ms = latency.as_millis();
            info!("Responded to /ping command. Latency: {ms}ms");
            Reply::private(format!("API Latency: **{ms}ms**"))
        }
        None => {
            info!("Responded to /ping command. Latency not measured yet");
            Reply::private("API Latency: not measured yet, try again in a moment.")
        }
    }
}
