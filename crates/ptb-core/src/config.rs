use std::{env, path::PathBuf, time::Duration};

use crate::{errors::Error, Result};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOGGING_LEVEL: u8 = 3;

/// Where log lines go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoggingChannel {
    Stdout,
    /// Daily `YYYY-MM-DD.txt` files under the given directory.
    File(PathBuf),
}

/// TLS settings as read from the environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TlsConfig {
    pub enabled: bool,
    pub cert_path: Option<PathBuf>,
    pub key_path: Option<PathBuf>,
}

/// Typed process configuration.
#[derive(Clone, Debug)]
pub struct Config {
    // Service
    pub version: String,
    pub service_name: String,
    pub service_host: String,
    pub service_port: u16,
    pub tls: TlsConfig,

    // Telegram
    pub telegram_bot_token: String,

    // Price tracker backend
    pub price_tracker_service: String,
    pub price_tracker_timeout: Option<Duration>,

    // Key-value store (declared, unused by the bot)
    pub redis_host: Option<String>,
    pub redis_prefix: Option<String>,

    // Logging
    pub logging_level: u8,
    pub logging_channel: LoggingChannel,

    /// `.env` file that was loaded, if any.
    pub env_file: Option<PathBuf>,
}

impl Config {
    /// Load from `.env` (if present) and the process environment.
    pub fn load() -> Result<Self> {
        // A missing `.env` is fine; variables already set always win.
        let env_file = dotenvy::dotenv().ok();
        let mut cfg = Self::from_lookup(|key| env::var(key).ok())?;
        cfg.env_file = env_file;
        Ok(cfg)
    }

    /// Build the config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let version = required(&get, "VERSION")?;
        let service_name = required(&get, "SERVICE_NAME")?;
        let telegram_bot_token = required(&get, "TELEGRAM_BOT_TOKEN")?;
        let price_tracker_service = required(&get, "PRICE_TRACKER_SERVICE")?
            .trim_end_matches('/')
            .to_string();

        let service_host = get("SERVICE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let service_port = match get("SERVICE_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                Error::Config(format!("SERVICE_PORT is not a valid port: {raw}"))
            })?,
            None => DEFAULT_PORT,
        };

        let tls = TlsConfig {
            enabled: get("SERVICE_HTTPS")
                .and_then(|s| s.trim().parse::<i64>().ok())
                .map(|v| v == 1)
                .unwrap_or(false),
            cert_path: get("SERVICE_CERT").map(PathBuf::from),
            key_path: get("SERVICE_KEY").map(PathBuf::from),
        };

        let price_tracker_timeout = get("PRICE_TRACKER_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        // Unparsable levels fall back to the default rather than failing.
        let logging_level = get("LOGGING_LEVEL")
            .and_then(|s| s.trim().parse::<u8>().ok())
            .unwrap_or(DEFAULT_LOGGING_LEVEL);

        let logging_channel = match get("LOGGING_CHANNEL").as_deref().map(str::trim) {
            Some("file") => LoggingChannel::File(
                get("LOGGING_ENDPOINT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./")),
            ),
            _ => LoggingChannel::Stdout,
        };

        Ok(Self {
            version,
            service_name,
            service_host,
            service_port,
            tls,
            telegram_bot_token,
            price_tracker_service,
            price_tracker_timeout,
            redis_host: get("REDIS_HOST"),
            redis_prefix: get("REDIS_KEY_PREFIX"),
            logging_level,
            logging_channel,
            env_file: None,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.service_host, self.service_port)
    }
}

fn required(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    get(key).ok_or_else(|| Error::Config(format!("{key} not specified")))
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
