//! Client configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use vidlink_protocol::{Codec, JsonCodec};
use vidlink_tick::{TickConfig, TickPolicy};

use crate::{Script, VidlinkError};

/// Settings for a [`GameClient`](crate::GameClient) run.
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Ticks per second.
    pub tick_rate_hz: u32,
    /// Stop after this many ticks. `None` runs until the task is dropped.
    pub max_ticks: Option<u64>,
    /// When the loop falls behind, drop the missed ticks instead of firing
    /// them back to back.
    pub skip_missed_ticks: bool,
    /// Server script to play. `None` plays [`Script::demo`].
    pub script_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            max_ticks: None,
            skip_missed_ticks: true,
            script_path: None,
        }
    }
}

impl ClientConfig {
    /// Reads a JSON config file.
    ///
    /// A relative `script_path` is resolved against the directory holding
    /// the config file, so a config and its script can move together.
    ///
    /// # Errors
    /// [`VidlinkError::Config`] if the file can't be read, doesn't parse, or
    /// holds out-of-range values. The message names the file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, VidlinkError> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| VidlinkError::Config(format!("{}: {e}", path.display())))?;
        let mut config = Self::from_json(&data).map_err(|e| match e {
            VidlinkError::Config(msg) => VidlinkError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })?;

        if let (Some(script), Some(dir)) = (&config.script_path, path.parent()) {
            if script.is_relative() {
                config.script_path = Some(dir.join(script));
            }
        }
        Ok(config)
    }

    /// Parses a JSON config.
    pub fn from_json(data: &[u8]) -> Result<Self, VidlinkError> {
        let config: ClientConfig = JsonCodec
            .decode(data)
            .map_err(|e| VidlinkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the client can't run with.
    pub fn validate(&self) -> Result<(), VidlinkError> {
        let range = TickConfig::MIN_TICK_RATE_HZ..=TickConfig::MAX_TICK_RATE_HZ;
        if !range.contains(&self.tick_rate_hz) {
            return Err(VidlinkError::Config(format!(
                "tick_rate_hz {} outside {}..={}",
                self.tick_rate_hz,
                range.start(),
                range.end()
            )));
        }
        if self.max_ticks == Some(0) {
            return Err(VidlinkError::Config("max_ticks must be at least 1".into()));
        }
        Ok(())
    }

    pub fn tick_config(&self) -> TickConfig {
        let policy = if self.skip_missed_ticks {
            TickPolicy::Skip
        } else {
            TickPolicy::Drop
        };
        TickConfig {
            policy,
            ..TickConfig::with_rate(self.tick_rate_hz)
        }
    }

    /// Loads the configured script, or the demo if none is set.
    ///
    /// # Errors
    /// [`VidlinkError::Config`] if the file can't be read or decoded, and
    /// [`VidlinkError::Script`] if it decodes but doesn't validate. Both
    /// name the file.
    pub fn load_script(&self) -> Result<Script, VidlinkError> {
        let Some(path) = &self.script_path else {
            return Ok(Script::demo());
        };
        let data = std::fs::read(path)
            .map_err(|e| VidlinkError::Config(format!("{}: {e}", path.display())))?;
        Script::from_json(&data).map_err(|e| match e {
            VidlinkError::Script(msg) => VidlinkError::Script(format!("{}: {msg}", path.display())),
            other => VidlinkError::Config(format!("{}: {other}", path.display())),
        })
    }
}
