// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML files and environment variables.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::env::load_secret_env;
use crate::error::ConfigError;
use crate::layer::AuthConfigLayer;
use crate::sections::{KeystoreConfigLayer, LoggingConfigLayer, TokenConfigLayer};

/// Default environment variable prefix.
pub const ENV_PREFIX: &str = "RADAR_AUTH";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<AuthConfigLayer, ConfigError>;
}

/// Built-in defaults. Section defaults are applied by `finalize`.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<AuthConfigLayer, ConfigError> {
		Ok(AuthConfigLayer::default())
	}
}

/// TOML file source. A missing file yields an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/radar/auth.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<AuthConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(AuthConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: AuthConfigLayer = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `<PREFIX>_<SECTION>_<FIELD>`, prefix `RADAR_AUTH` by default.
/// List values are comma-separated.
pub struct EnvSource {
	prefix: String,
}

impl EnvSource {
	pub fn new() -> Self {
		Self::with_prefix(ENV_PREFIX)
	}

	pub fn with_prefix(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
		}
	}

	fn var(&self, suffix: &str) -> String {
		format!("{}_{suffix}", self.prefix)
	}

	fn load_keystore(&self) -> Result<KeystoreConfigLayer, ConfigError> {
		Ok(KeystoreConfigLayer {
			locations: env_list(&self.var("KEYSTORE_LOCATIONS"))
				.map(|l| l.into_iter().map(PathBuf::from).collect()),
			password: load_secret_env(&self.var("KEYSTORE_PASSWORD"))?,
			signing_key_alias: env_var(&self.var("KEYSTORE_SIGNING_KEY_ALIAS")),
			checking_key_aliases: env_list(&self.var("KEYSTORE_CHECKING_KEY_ALIASES")),
		})
	}

	fn load_token(&self) -> Result<TokenConfigLayer, ConfigError> {
		Ok(TokenConfigLayer {
			issuer: env_var(&self.var("TOKEN_ISSUER")),
			resource_id: env_var(&self.var("TOKEN_RESOURCE_ID")),
			access_token_validity_secs: env_u64(&self.var("TOKEN_ACCESS_VALIDITY_SECS"))?,
			refresh_token_validity_secs: env_u64(&self.var("TOKEN_REFRESH_VALIDITY_SECS"))?,
			leeway_secs: env_u64(&self.var("TOKEN_LEEWAY_SECS"))?,
		})
	}

	fn load_logging(&self) -> LoggingConfigLayer {
		LoggingConfigLayer {
			level: env_var(&self.var("LOG_LEVEL")),
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<AuthConfigLayer, ConfigError> {
		debug!(prefix = %self.prefix, "loading environment variables");
		Ok(AuthConfigLayer {
			keystore: Some(self.load_keystore()?),
			token: Some(self.load_token()?),
			logging: Some(self.load_logging()),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_list(name: &str) -> Option<Vec<String>> {
	env_var(name).map(|v| {
		v.split(',')
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.map(str::to_string)
			.collect()
	})
}

fn env_u64(name: &str) -> Result<Option<u64>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u64 value '{v}'"),
		}),
		None => Ok(None),
	}
}
