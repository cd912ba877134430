use std::path::Path;
use std::time::Duration;

use edlink_relay::RelayConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

fn default_read_timeout_ms() -> u64 {
	2_000
}

/// Edit protocol settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditConfig {
	/// Deadline for every read call, in milliseconds.
	#[serde(default = "default_read_timeout_ms")]
	pub read_timeout_ms: u64,
	/// Hard cap on extracted text size; `0` means no cap.
	pub max_extract_chars: usize,
}

impl Default for EditConfig {
	fn default() -> Self {
		Self {
			read_timeout_ms: default_read_timeout_ms(),
			max_extract_chars: 0,
		}
	}
}

impl EditConfig {
	pub fn read_timeout(&self) -> Duration {
		Duration::from_millis(self.read_timeout_ms)
	}
}

/// Top-level configuration for an edit link.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EdlinkConfig {
	pub relay: RelayConfig,
	pub edit: EditConfig,
}

impl EdlinkConfig {
	/// Parses and validates TOML text.
	pub fn from_toml_str(text: &str) -> Result<Self> {
		let config: Self = toml::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads, parses and validates a TOML file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&text)
	}

	pub fn validate(&self) -> Result<()> {
		if self.relay.capacity == 0 {
			return Err(ConfigError::Invalid("relay.capacity must be > 0".into()));
		}
		if self.edit.read_timeout_ms == 0 {
			return Err(ConfigError::Invalid("edit.read_timeout_ms must be > 0".into()));
		}
		Ok(())
	}
}
