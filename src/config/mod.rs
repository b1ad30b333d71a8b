use dotenvy::dotenv;
use log::{debug, warn};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::api::{AckPolicy, LoginPolicy};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_BASE_PATH: &str = "/to-do";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_UPDATE_MARKER: &str = "actualizada";
pub const DEFAULT_DELETE_MARKER: &str = "borrada";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub base_path: String,
    pub timeout: Duration,
    pub login: LoginPolicy,
    pub update_ack: AckPolicy,
    pub delete_ack: AckPolicy,
    pub session_file: Option<PathBuf>,
    pub user_email: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            login: LoginPolicy::default(),
            update_ack: AckPolicy::Substring(DEFAULT_UPDATE_MARKER.to_string()),
            delete_ack: AckPolicy::Substring(DEFAULT_DELETE_MARKER.to_string()),
            session_file: None,
            user_email: None,
        }
    }
}

impl ClientConfig {
    /// Reads `.env` (if any) and the process environment.
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = get("TODO_API_URL") {
            config.api_url = url;
        }
        if let Some(path) = get("TODO_API_BASE_PATH") {
            config.base_path = path;
        }
        if let Some(raw) = get("TODO_HTTP_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => warn!(
                    "Invalid TODO_HTTP_TIMEOUT_SECS '{}', using {} seconds",
                    raw, DEFAULT_TIMEOUT_SECS
                ),
            }
        }
        if let Some(email) = get("TODO_ALLOWED_EMAIL") {
            config.login = LoginPolicy::restricted_to(email);
        }

        let update_marker = get("TODO_UPDATE_MARKER").unwrap_or_else(|| DEFAULT_UPDATE_MARKER.to_string());
        let delete_marker = get("TODO_DELETE_MARKER").unwrap_or_else(|| DEFAULT_DELETE_MARKER.to_string());
        match get("TODO_ACK_MODE").map(|m| m.to_lowercase()).as_deref() {
            None | Some("substring") => {
                config.update_ack = AckPolicy::Substring(update_marker);
                config.delete_ack = AckPolicy::Substring(delete_marker);
            }
            Some("status") => {
                config.update_ack = AckPolicy::StatusOnly;
                config.delete_ack = AckPolicy::StatusOnly;
            }
            Some(other) => {
                warn!("Unknown TODO_ACK_MODE '{}', using substring markers", other);
                config.update_ack = AckPolicy::Substring(update_marker);
                config.delete_ack = AckPolicy::Substring(delete_marker);
            }
        }

        config.session_file = get("TODO_SESSION_FILE").map(PathBuf::from);
        config.user_email = get("TODO_USER_EMAIL");

        debug!(
            "Client config: api_url={} base_path={} timeout={:?}",
            config.api_url, config.base_path, config.timeout
        );
        config
    }
}

impl ClientConfig {
    /// Owner email for new tasks: `TODO_USER_EMAIL`, else the allowed login address.
    pub fn task_owner(&self) -> Option<&str> {
        self.user_email
            .as_deref()
            .or_else(|| self.login.allowed_email())
    }
}
