use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serenity::all::{
    Client, CommandInteraction, Context, CreateInteractionResponse,
    CreateInteractionResponseMessage, EditInteractionResponse, EventHandler, GatewayIntents,
    Interaction, Message, Ready,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use relay_core::{
    config::Config,
    domain::UserId,
    events::{IncomingEvent, Reply},
    ports::PlatformPort,
    router::{dispatch, AppState},
};

use crate::{convert, DiscordPlatform};

pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
}

struct Handler {
    state: Arc<OnceLock<AppState>>,
}

impl Handler {
    fn state(&self) -> Option<&AppState> {
        let state = self.state.get();
        if state.is_none() {
            warn!("Event arrived before startup finished; dropping it");
        }
        state
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Logged in as {}", ready.user.tag());
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        let Some(state) = self.state() else {
            return;
        };
        let event = IncomingEvent::MessageCreated(convert::inbound_message(&msg));
        dispatch(state, event).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Some(state) = self.state() else {
            return;
        };

        let event = convert::interaction_event(&interaction);
        let Interaction::Command(cmd) = &interaction else {
            dispatch(state, event).await;
            return;
        };

        // Discord drops interactions not acknowledged within 3s.
        let deferred = event.expects_reply() && defer(&ctx, cmd).await;
        if let Some(reply) = dispatch(state, event).await {
            send_reply(&ctx, cmd, reply, deferred).await;
        }
    }
}

async fn defer(ctx: &Context, cmd: &CommandInteraction) -> bool {
    match cmd.defer_ephemeral(ctx).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to defer /{}: {e}", cmd.data.name);
            false
        }
    }
}

async fn send_reply(ctx: &Context, cmd: &CommandInteraction, reply: Reply, deferred: bool) {
    let result = if deferred {
        cmd.edit_response(ctx, EditInteractionResponse::new().content(reply.content))
            .await
            .map(|_| ())
    } else {
        let message = CreateInteractionResponseMessage::new()
            .content(reply.content)
            .ephemeral(reply.ephemeral);
        cmd.create_response(ctx, CreateInteractionResponse::Message(message))
            .await
    };
    if let Err(e) = result {
        error!("Failed to reply to /{}: {e}", cmd.data.name);
    }
}

/// Connect to the gateway and process events until `shutdown` fires.
pub async fn run_gateway(cfg: Arc<Config>, shutdown: CancellationToken) -> anyhow::Result<()> {
    let state = Arc::new(OnceLock::new());
    let handler = Handler {
        state: state.clone(),
    };

    let mut client = Client::builder(&cfg.discord_token, intents())
        .event_handler(handler)
        .await?;

    let me = client.http.get_current_user().await?;
    let bot_id = UserId(me.id.get());

    let platform: Arc<dyn PlatformPort> = Arc::new(DiscordPlatform::new(
        client.http.clone(),
        client.shard_manager.clone(),
        bot_id,
    ));
    if state.set(AppState::new(cfg.clone(), platform)).is_err() {
        anyhow::bail!("gateway state initialised twice");
    }

    match (cfg.source_channel, cfg.target_channel) {
        (Some(src), Some(dst)) => info!("Relaying images from {src} to {dst}"),
        _ => warn!("Relay disabled: SOURCE_CHANNEL_ID and TARGET_CHANNEL_ID are both required"),
    }
    info!("Authorized moderators: {}", cfg.authorized_users.len());

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        shutdown.cancelled().await;
        info!("Shutting down gateway");
        shard_manager.shutdown_all().await;
    });

    client.start().await?;
    Ok(())
}
