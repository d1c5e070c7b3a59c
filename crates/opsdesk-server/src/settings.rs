//! Server configuration, layered from an optional TOML file and `OPSDESK_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use opsdesk_core::{SchedulerConfig, availability::WindowSemantics, stats::DEFAULT_WINDOW_DAYS};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  #[serde(default = "default_store_path")]
  pub store_path:        PathBuf,
  /// `intersect` (default) or the legacy `union`.
  #[serde(default)]
  pub range_semantics:   WindowSemantics,
  #[serde(default = "default_stats_window_days")]
  pub stats_window_days: u32,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/opsdesk/opsdesk.db") }

fn default_stats_window_days() -> u32 { DEFAULT_WINDOW_DAYS }

impl ServerConfig {
  /// Read `path` (if it exists), then let `OPSDESK_*` variables override it.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("OPSDESK").try_parsing(true))
      .build()
      .context("failed to read config file")?;

    let cfg: ServerConfig = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    anyhow::ensure!(cfg.stats_window_days > 0, "stats_window_days must be at least 1");
    Ok(cfg)
  }

  pub fn scheduler(&self) -> SchedulerConfig {
    SchedulerConfig {
      range_semantics:   self.range_semantics,
      stats_window_days: self.stats_window_days,
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_apply_without_a_file() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/opsdesk.toml")).unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.scheduler().range_semantics, WindowSemantics::Intersect);
    assert_eq!(cfg.scheduler().stats_window_days, DEFAULT_WINDOW_DAYS);
  }

  #[test]
  fn tilde_expands_against_home() {
    if let Ok(home) = std::env::var("HOME") {
      let expanded = expand_tilde(Path::new("~/db.sqlite"));
      assert_eq!(expanded, PathBuf::from(home).join("db.sqlite"));
    }
    assert_eq!(expand_tilde(Path::new("/abs/db.sqlite")), PathBuf::from("/abs/db.sqlite"));
  }
}
