// SPDX-License-Identifier: MIT

//! Runtime configuration
//!
//! Loaded from an optional YAML file, then overridden by environment
//! variables (a `.env` file is honoured by the binary).

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{QueueError, Result};

pub const ENV_DEFAULTS: &str = "WIP_QUEUE_DEFAULTS";
pub const ENV_POLL_SECS: &str = "WIP_QUEUE_POLL_SECS";
pub const ENV_WATCH_DIR: &str = "WIP_QUEUE_WATCH_DIR";
pub const ENV_PREPARE_COMMAND: &str = "WIP_QUEUE_PREPARE_COMMAND";

/// Placeholder replaced by a fresh thumbnail path in the prepare command
pub const THUMBNAIL_PLACEHOLDER: &str = "{thumbnail}";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Rule definitions document
    pub defaults_path: PathBuf,
    /// Seconds between directory scans in watch mode
    pub poll_interval_secs: u64,
    /// Directory scanned for `*.xml` project sources
    pub watch_dir: Option<PathBuf>,
    /// Project files loaded at startup
    pub project_files: Vec<PathBuf>,
    /// Command run when an item becomes active, e.g.
    /// `ma-ui-fold --thumbnail-only --thumbnail-name {thumbnail}`
    pub prepare_command: Option<String>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            defaults_path: PathBuf::from("default.xml"),
            poll_interval_secs: 10,
            watch_dir: None,
            project_files: Vec::new(),
            prepare_command: None,
        }
    }
}

impl QueueConfig {
    /// Parse a configuration from YAML
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: QueueConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            QueueError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Override fields from `WIP_QUEUE_*` environment variables
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(path) = env::var(ENV_DEFAULTS) {
            self.defaults_path = PathBuf::from(path);
        }
        if let Ok(secs) = env::var(ENV_POLL_SECS) {
            self.poll_interval_secs = secs.trim().parse().map_err(|_| {
                QueueError::config(format!("{} must be a whole number, got '{}'", ENV_POLL_SECS, secs))
            })?;
        }
        if let Ok(dir) = env::var(ENV_WATCH_DIR) {
            self.watch_dir = Some(PathBuf::from(dir));
        }
        if let Ok(command) = env::var(ENV_PREPARE_COMMAND) {
            self.prepare_command = Some(command);
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(QueueError::config("poll_interval_secs must be at least 1"));
        }
        if let Some(command) = &self.prepare_command {
            if command.split_whitespace().next().is_none() {
                return Err(QueueError::config("prepare_command is empty"));
            }
        }
        Ok(())
    }

    /// Split the prepare command into program and arguments, substituting a
    /// unique thumbnail path. Returns `(program, args, thumbnail_path)`.
    pub fn prepare_invocation(&self) -> Option<(String, Vec<String>, String)> {
        let command = self.prepare_command.as_ref()?;
        let thumbnail = format!("/tmp/thumb_{}.jpg", uuid::Uuid::new_v4().simple());
        let mut parts = command
            .split_whitespace()
            .map(|p| p.replace(THUMBNAIL_PLACEHOLDER, &thumbnail));
        let program = parts.next()?;
        Some((program, parts.collect(), thumbnail))
    }
}
