//! Client configuration (collaborator base URL, timeout, user agent).
//!
//! Loaded from the TOML file named by QUIZDESK_CONFIG_PATH when present,
//! then overridden by QUIZDESK_BASE_URL / QUIZDESK_TIMEOUT_SECS.
//! Every key is optional; see `ClientConfig::default` for the fallbacks.

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info, warn};

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
  pub base_url: String,
  pub timeout_secs: u64,
  pub user_agent: String,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      base_url: "http://localhost:8000".into(),
      timeout_secs: 20,
      user_agent: "quizdesk/0.1".into(),
    }
  }
}

impl ClientConfig {
  pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(s)
  }

  /// File config (if any) with env overrides applied on top.
  pub fn from_env() -> Self {
    let mut cfg = load_config_file_from_env().unwrap_or_default();
    if let Ok(url) = std::env::var("QUIZDESK_BASE_URL") {
      if !url.trim().is_empty() {
        cfg.base_url = url.trim().to_string();
      }
    }
    if let Ok(raw) = std::env::var("QUIZDESK_TIMEOUT_SECS") {
      match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => cfg.timeout_secs = secs,
        _ => warn!(target: "quizdesk", value = %raw, "Ignoring invalid QUIZDESK_TIMEOUT_SECS"),
      }
    }
    cfg
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs.max(1))
  }
}

/// Attempt to load `ClientConfig` from QUIZDESK_CONFIG_PATH. On any parsing/IO error, returns None.
fn load_config_file_from_env() -> Option<ClientConfig> {
  let path = std::env::var("QUIZDESK_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match ClientConfig::from_toml_str(&s) {
      Ok(cfg) => {
        info!(target: "quizdesk", %path, "Loaded client config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quizdesk", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "quizdesk", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
