//! Runtime server configuration.
//!
//! Layered, lowest priority first: built-in defaults, the optional TOML file,
//! then `SIP_*` environment variables (e.g. `SIP_PORT=8080`).

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  /// SQLite database file; a leading `~/` is expanded.
  pub store_path:         PathBuf,
  /// Attempts per preference write before a locked database is reported
  /// as a conflict.
  pub max_write_attempts: u32,
}

impl ServerConfig {
  /// Load from `file` (if it exists) and the environment.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    Self::from_builder(
      Config::builder()
        .add_source(File::from(file).required(false))
        .add_source(Environment::with_prefix("SIP")),
    )
  }

  fn from_builder(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
  ) -> anyhow::Result<Self> {
    let settings = builder
      .set_default("host", "127.0.0.1")?
      .set_default("port", 3000)?
      .set_default("store_path", "~/.local/share/sip/sip.db")?
      .set_default("max_write_attempts", 5)?
      .build()
      .context("failed to read configuration")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  /// `store_path` with a leading `~` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf {
    let s = self.store_path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/")
      && let Ok(home) = std::env::var("HOME")
    {
      return PathBuf::from(home).join(rest);
    }
    self.store_path.clone()
  }
}

#[cfg(test)]
mod tests {
  use config::FileFormat;

  use super::*;

  fn from_toml(toml: &str) -> ServerConfig {
    ServerConfig::from_builder(
      Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
    )
    .unwrap()
  }

  #[test]
  fn defaults_fill_missing_keys() {
    let cfg = from_toml("");
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 3000);
    assert_eq!(cfg.max_write_attempts, 5);
  }

  #[test]
  fn file_overrides_defaults() {
    let cfg = from_toml(
      r#"
        host = "0.0.0.0"
        port = 8080
        store_path = "/var/lib/sip/sip.db"
        max_write_attempts = 2
      "#,
    );
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/sip/sip.db"));
    assert_eq!(cfg.max_write_attempts, 2);
    assert_eq!(cfg.resolved_store_path(), cfg.store_path);
  }

  #[test]
  fn missing_file_is_not_an_error() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/sip.toml")).unwrap();
    assert!(!cfg.host.is_empty());
  }
}
