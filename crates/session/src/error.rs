use std::path::PathBuf;

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// The config file could not be read.
	#[error("failed to read {path}: {error}")]
	Io {
		path: PathBuf,
		#[source]
		error: std::io::Error,
	},
	/// The config text is not valid TOML for [`crate::EdlinkConfig`].
	#[error(transparent)]
	Parse(#[from] toml::de::Error),
	/// A value is out of range.
	#[error("invalid config: {0}")]
	Invalid(String),
}

/// Result alias for configuration operations.
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
