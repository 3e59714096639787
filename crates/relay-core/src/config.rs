use std::{
    env, fs,
    path::{Path, PathBuf},
};

use tracing::warn;

use crate::{
    domain::{ChannelId, UserId},
    errors::Error,
    security::AuthorizationSet,
    Result,
};

const DEFAULT_HEALTH_PORT: u16 = 8080;

/// Typed configuration, loaded once at startup and shared read-only.
#[derive(Clone, Debug)]
pub struct Config {
    // Credentials
    pub discord_token: String,
    pub application_id: Option<u64>,

    // Relay
    pub source_channel: Option<ChannelId>,
    pub target_channel: Option<ChannelId>,
    pub relay_attribution: bool,

    // Moderation
    pub authorized_users: AuthorizationSet,

    // Liveness
    pub health_enabled: bool,
    pub health_port: u16,

    // Audit
    pub audit_log_path: Option<PathBuf>,
    pub audit_log_json: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (env, map, ...).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let discord_token = get("DISCORD_TOKEN").ok_or_else(|| {
            Error::Config("DISCORD_TOKEN environment variable is required".to_string())
        })?;

        let application_id = parse_snowflake("CLIENT_ID", get("CLIENT_ID"))?;

        // camelCase keys are the names older deployments used.
        let source_channel = parse_snowflake(
            "SOURCE_CHANNEL_ID",
            get("SOURCE_CHANNEL_ID").or_else(|| get("sourceChannelId")),
        )?
        .map(ChannelId);
        let target_channel = parse_snowflake(
            "TARGET_CHANNEL_ID",
            get("TARGET_CHANNEL_ID").or_else(|| get("targetChannelId")),
        )?
        .map(ChannelId);

        let authorized_users = parse_csv_user_ids(get("AUTHORIZED_USER_IDS"));

        let relay_attribution = parse_bool(get("RELAY_ATTRIBUTION")).unwrap_or(true);

        let health_enabled = parse_bool(get("HEALTH_ENABLED")).unwrap_or(true);
        let health_port = match get("HEALTH_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                Error::Config(format!("HEALTH_PORT is not a valid port: {raw}"))
            })?,
            None => DEFAULT_HEALTH_PORT,
        };

        let audit_log_path = get("AUDIT_LOG_PATH").map(PathBuf::from);
        let audit_log_json = parse_bool(get("AUDIT_LOG_JSON")).unwrap_or(false);

        Ok(Self {
            discord_token,
            application_id,
            source_channel,
            target_channel,
            relay_attribution,
            authorized_users,
            health_enabled,
            health_port,
            audit_log_path,
            audit_log_json,
        })
    }

    /// Which settings are present, for the startup diagnostic. Never includes values.
    pub fn presence_report(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("DISCORD_TOKEN", !self.discord_token.is_empty()),
            ("CLIENT_ID", self.application_id.is_some()),
            ("SOURCE_CHANNEL_ID", self.source_channel.is_some()),
            ("TARGET_CHANNEL_ID", self.target_channel.is_some()),
            ("AUTHORIZED_USER_IDS", !self.authorized_users.is_empty()),
        ]
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn parse_bool(v: Option<String>) -> Option<bool> {
    v.map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn parse_snowflake(key: &str, v: Option<String>) -> Result<Option<u64>> {
    let Some(raw) = v else {
        return Ok(None);
    };
    // Snowflakes are never zero.
    match raw.trim().parse::<u64>() {
        Ok(id) if id != 0 => Ok(Some(id)),
        _ => Err(Error::Config(format!(
            "{key} is not a valid Discord id: {raw}"
        ))),
    }
}

fn parse_csv_user_ids(v: Option<String>) -> AuthorizationSet {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<u64>() {
            Ok(id) if id != 0 => Some(UserId(id)),
            _ => {
                warn!("Skipping invalid entry in AUTHORIZED_USER_IDS: {s}");
                None
            }
        })
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
