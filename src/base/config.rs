//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, path::Path, sync::Arc};

use serde::Deserialize;
use tracing::warn;

use super::types::Res;

/// Default location of the optional config file.
const DEFAULT_CONFIG_PATH: &str = ".hidden/config.toml";

/// Configuration for the claude-dm-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Startup credentials.
///
/// Missing values deserialize as empty strings; the Slack and Anthropic calls
/// that use them are what ultimately fail.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    #[serde(default)]
    pub slack_bot_token: String,
    /// Slack signing secret (`SLACK_SIGNING_SECRET`).
    #[serde(default)]
    pub slack_signing_secret: String,
    /// Slack app-level token used for Socket Mode (`SLACK_APP_TOKEN`).
    #[serde(default)]
    pub slack_app_token: String,
    /// Anthropic API key (`ANTHROPIC_API_KEY`).
    #[serde(default)]
    pub anthropic_api_key: String,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>) -> Res<Self> {
        let mut cfg = config::Config::builder();

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            cfg = cfg.add_source(config::File::with_name(DEFAULT_CONFIG_PATH));
        }

        // The environment wins over the file.
        cfg = cfg.add_source(config::Environment::default());

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        for name in result.missing_credentials() {
            warn!("Credential `{}` is not set.", name);
        }

        Ok(result)
    }

    /// Names of the credentials that are empty.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        [
            ("SLACK_BOT_TOKEN", &self.slack_bot_token),
            ("SLACK_SIGNING_SECRET", &self.slack_signing_secret),
            ("SLACK_APP_TOKEN", &self.slack_app_token),
            ("ANTHROPIC_API_KEY", &self.anthropic_api_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

// Tests.
