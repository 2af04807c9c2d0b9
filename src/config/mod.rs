//! Configuration loading for the seat tracker.
//!
//! Settings live in a JSON file (`config.json` by default). Any key can be
//! overridden from the environment with a `SEATWATCH_` prefix and
//! SCREAMING_SNAKE_CASE, e.g. `SEATWATCH_DISCORD_WEBHOOK`.

use crate::usf::TrackedCourse;
use figment::providers::{Env, Format, Json};
use figment::value::Uncased;
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_SEARCH_URL: &str = "https://usfweb.usf.edu/DSS/StaffScheduleSearch/";
pub const DEFAULT_REGISTRATION_URL: &str =
    "https://usfonline.admin.usf.edu/pls/prod/bwskfreg.P_AltPin";

/// Configured periods at or below this many seconds are raised to it.
const MIN_PERIOD_SECS: u64 = 30;

const ENV_PREFIX: &str = "SEATWATCH_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {} does not exist", .0.display())]
    Missing(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to load config: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Poll period in seconds. See [`Config::period`] for the effective value.
    pub period: i64,
    pub proxy_host: String,
    /// `-1` disables the proxy.
    pub proxy_port: i32,
    pub ping_discord: bool,
    pub discord_webhook: String,
    /// Discord user IDs to mention in each notification.
    pub discord_users: Vec<String>,
    pub courses: Vec<TrackedCourse>,
    pub search_url: String,
    pub registration_url: String,
    /// Print one status line per section on every tick.
    pub log_course_info: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            period: MIN_PERIOD_SECS as i64,
            proxy_host: String::new(),
            proxy_port: -1,
            ping_discord: false,
            discord_webhook: String::new(),
            discord_users: Vec::new(),
            courses: Vec::new(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            registration_url: DEFAULT_REGISTRATION_URL.to_string(),
            log_course_info: true,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Effective poll period. Anything at or below 30 becomes 30 seconds.
    pub fn period(&self) -> Duration {
        match u64::try_from(self.period) {
            Ok(secs) if secs > MIN_PERIOD_SECS => Duration::from_secs(secs),
            _ => Duration::from_secs(MIN_PERIOD_SECS),
        }
    }

    /// Proxy to route searches through, if one is configured.
    pub fn proxy(&self) -> Option<(&str, u16)> {
        let host = self.proxy_host.trim();
        if host.is_empty() || self.proxy_port == -1 {
            return None;
        }
        u16::try_from(self.proxy_port).ok().map(|port| (host, port))
    }

    pub fn notifications_enabled(&self) -> bool {
        self.ping_discord && !self.discord_webhook.trim().is_empty()
    }

    pub fn search_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.search_url)
            .map_err(|e| ConfigError::Invalid(format!("searchUrl {:?}: {e}", self.search_url)))
    }

    /// Check the settings that would otherwise only fail mid-tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search_url()?;
        if self.proxy_port != -1 && u16::try_from(self.proxy_port).is_err() {
            return Err(ConfigError::Invalid(format!(
                "proxyPort must be -1 or 0..=65535, got {}",
                self.proxy_port
            )));
        }
        if let Some((host, port)) = self.proxy() {
            check_proxy(host, port)?;
        }
        if self.ping_discord && !self.discord_webhook.trim().is_empty() {
            Url::parse(self.discord_webhook.trim()).map_err(|e| {
                ConfigError::Invalid(format!("discordWebhook is not a valid URL: {e}"))
            })?;
        }
        if let Some(user) = self
            .discord_users
            .iter()
            .find(|u| u.is_empty() || !u.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(ConfigError::Invalid(format!(
                "discordUsers entries must be numeric user IDs, got {user:?}"
            )));
        }
        Ok(())
    }
}

/// The session builds `http://{host}:{port}`; make sure that parses back to
/// the same host and port, and that reqwest accepts it.
fn check_proxy(host: &str, port: u16) -> Result<(), ConfigError> {
    let invalid = || {
        ConfigError::Invalid(format!(
            "proxyHost must be a bare host name or address, got {host:?}"
        ))
    };
    let proxy_url = format!("http://{host}:{port}");
    let parsed = Url::parse(&proxy_url).map_err(|_| invalid())?;
    let same_host = parsed
        .host_str()
        .is_some_and(|h| h.eq_ignore_ascii_case(host));
    if !same_host || parsed.port_or_known_default() != Some(port) || parsed.path() != "/" {
        return Err(invalid());
    }
    reqwest::Proxy::all(proxy_url).map_err(|e| ConfigError::Invalid(format!("proxy: {e}")))?;
    Ok(())
}

/// Load and validate the configuration at `path`, applying environment overrides.
///
/// Returns [`ConfigError::Missing`] when the file doesn't exist so the caller
/// can write a default one instead.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Missing(path.to_path_buf()));
    }

    let config: Config = Figment::new()
        .merge(Json::file(path))
        .merge(
            Env::prefixed(ENV_PREFIX)
                .lowercase(false)
                .map(|key| camel_case(key.as_str())),
        )
        .extract()
        .map_err(Box::new)?;

    config.validate()?;
    Ok(config)
}

/// Write `Config::default()` as pretty JSON.
pub fn write_default(path: &Path) -> Result<(), ConfigError> {
    let mut json = serde_json::to_string_pretty(&Config::default())?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}

/// `DISCORD_WEBHOOK` -> `discordWebhook`.
fn camel_case(key: &str) -> Uncased<'static> {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for c in key.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c.to_ascii_lowercase());
        }
    }
    out.into()
}
