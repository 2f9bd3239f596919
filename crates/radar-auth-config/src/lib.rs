// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the RADAR token service.
//!
//! This crate provides:
//! - Layered configuration from defaults, a TOML file and the environment
//! - Key store settings (locations, password, signing and checking aliases)
//! - Token settings (issuer, audience, validity, leeway)
//! - [`Secret`] for values that must never reach logs
//!
//! # Usage
//!
//! ```ignore
//! use radar_auth_config::load_config;
//!
//! let config = load_config()?;
//! println!("signing with {}", config.keystore.signing_key_alias);
//! ```

pub mod env;
pub mod error;
pub mod layer;
pub mod sections;
pub mod secret;
pub mod sources;

use std::path::PathBuf;

pub use env::{load_secret_env, SecretEnvError};
pub use error::ConfigError;
pub use layer::AuthConfigLayer;
pub use sections::*;
pub use secret::{Secret, SecretString, REDACTED};
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, ENV_PREFIX};

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
	pub keystore: KeystoreConfig,
	pub token: TokenConfig,
	pub logging: LoggingConfig,
}

/// Load configuration with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`RADAR_AUTH_*`)
/// 2. Config file (`/etc/radar/auth.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<AuthServiceConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource::new()),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<AuthServiceConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource::new()),
	])
}

/// Merge the given sources in precedence order and finalize.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<AuthServiceConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = AuthConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Finalize a merged layer into resolved config.
pub fn finalize(layer: AuthConfigLayer) -> Result<AuthServiceConfig, ConfigError> {
	let keystore = layer.keystore.unwrap_or_default().finalize()?;
	let token = layer.token.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize();

	info!(
		locations = ?keystore.locations,
		signing_key_alias = %keystore.signing_key_alias,
		checking_key_aliases = ?keystore.checking_key_aliases,
		issuer = %token.issuer,
		resource_id = %token.resource_id,
		"Auth configuration loaded"
	);

	Ok(AuthServiceConfig {
		keystore,
		token,
		logging,
	})
}
