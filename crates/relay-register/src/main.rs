//! One-shot: push the slash and context commands to Discord.

use tracing::{error, info};

use relay_core::config::Config;

#[tokio::main]
async fn main() -> Result<(), relay_core::Error> {
    relay_core::logging::init("relay-register")?;

    let cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Startup failed: {e}");
            return Err(e);
        }
    };
    let Some(application_id) = cfg.application_id else {
        let e = relay_core::Error::Config("CLIENT_ID environment variable is required".to_string());
        error!("{e}");
        return Err(e);
    };

    info!("Refreshing global application commands");
    match relay_discord::commands::register_global(&cfg.discord_token, application_id).await {
        Ok(count) => {
            info!("Registered {count} application commands");
            Ok(())
        }
        Err(e) => {
            error!("Command registration failed: {e:#}");
            Err(relay_core::Error::External(format!(
                "command registration failed: {e}"
            )))
        }
    }
}
