use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use relay_core::config::Config;

mod health;

#[tokio::main]
async fn main() -> Result<(), relay_core::Error> {
    relay_core::logging::init("relay")?;

    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Startup failed: {e}");
            return Err(e);
        }
    };
    for (key, loaded) in cfg.presence_report() {
        info!("{key}: {}", if loaded { "loaded" } else { "not set" });
    }

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    let health = if cfg.health_enabled {
        let listener = health::bind(cfg.health_port)
            .await
            .map_err(|e| relay_core::Error::External(format!("{e:#}")))?;
        Some(tokio::spawn(health::serve(listener, shutdown.clone())))
    } else {
        None
    };

    let result = relay_discord::router::run_gateway(cfg, shutdown.clone()).await;
    shutdown.cancel();

    if let Some(task) = health {
        match task.await {
            Ok(Err(e)) => error!("{e:#}"),
            Err(e) => error!("Health server task failed: {e}"),
            Ok(Ok(())) => {}
        }
    }

    result.map_err(|e| {
        error!("Discord client failed: {e:#}");
        relay_core::Error::External(format!("discord client failed: {e}"))
    })
}

async fn cancel_on_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("Shutdown requested");
    shutdown.cancel();
}
