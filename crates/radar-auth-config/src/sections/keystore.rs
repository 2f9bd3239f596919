// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Key store configuration section.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::secret::SecretString;

const DEFAULT_SIGNING_KEY_ALIAS: &str = "selfsigned";

fn default_locations() -> Vec<PathBuf> {
	vec![
		PathBuf::from("config/keystore"),
		PathBuf::from("/etc/radar/keystore"),
	]
}

/// Key store layer (all fields optional for layering).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeystoreConfigLayer {
	/// Candidate store locations, tried in order.
	pub locations: Option<Vec<PathBuf>>,
	#[serde(skip_serializing)]
	pub password: Option<SecretString>,
	pub signing_key_alias: Option<String>,
	pub checking_key_aliases: Option<Vec<String>>,
}

impl KeystoreConfigLayer {
	pub fn merge(&mut self, other: KeystoreConfigLayer) {
		if other.locations.is_some() {
			self.locations = other.locations;
		}
		if other.password.is_some() {
			self.password = other.password;
		}
		if other.signing_key_alias.is_some() {
			self.signing_key_alias = other.signing_key_alias;
		}
		if other.checking_key_aliases.is_some() {
			self.checking_key_aliases = other.checking_key_aliases;
		}
	}

	pub fn finalize(self) -> Result<KeystoreConfig, ConfigError> {
		let password = self
			.password
			.filter(|p| !p.expose().is_empty())
			.ok_or_else(|| ConfigError::Validation("keystore password is required".to_string()))?;

		let signing_key_alias = self
			.signing_key_alias
			.unwrap_or_else(|| DEFAULT_SIGNING_KEY_ALIAS.to_string());
		if signing_key_alias.trim().is_empty() {
			return Err(ConfigError::Validation(
				"keystore signing_key_alias cannot be empty".to_string(),
			));
		}

		let locations = self.locations.unwrap_or_else(default_locations);
		if locations.is_empty() {
			return Err(ConfigError::Validation(
				"keystore locations cannot be empty".to_string(),
			));
		}

		let checking_key_aliases = self
			.checking_key_aliases
			.unwrap_or_default()
			.into_iter()
			.map(|a| a.trim().to_string())
			.filter(|a| !a.is_empty())
			.collect();

		Ok(KeystoreConfig {
			locations,
			password,
			signing_key_alias,
			checking_key_aliases,
		})
	}
}

/// Resolved key store configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct KeystoreConfig {
	pub locations: Vec<PathBuf>,
	pub password: SecretString,
	pub signing_key_alias: String,
	/// Verification-only aliases kept during key rotation.
	pub checking_key_aliases: Vec<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn with_password() -> KeystoreConfigLayer {
		KeystoreConfigLayer {
			password: Some(SecretString::new("pw".to_string())),
			..Default::default()
		}
	}

	#[test]
	fn defaults_apply() {
		let config = with_password().finalize().unwrap();
		assert_eq!(config.signing_key_alias, "selfsigned");
		assert_eq!(config.locations, default_locations());
		assert!(config.checking_key_aliases.is_empty());
	}

	#[test]
	fn password_is_required() {
		let err = KeystoreConfigLayer::default().finalize().unwrap_err();
		assert!(err.to_string().contains("password"));

		let empty = KeystoreConfigLayer {
			password: Some(SecretString::new(String::new())),
			..Default::default()
		};
		assert!(matches!(empty.finalize(), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn blank_alias_is_rejected() {
		let layer = KeystoreConfigLayer {
			signing_key_alias: Some("  ".to_string()),
			..with_password()
		};
		assert!(matches!(layer.finalize(), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn blank_checking_aliases_are_dropped() {
		let layer = KeystoreConfigLayer {
			checking_key_aliases: Some(vec!["old".into(), " ".into(), " older ".into()]),
			..with_password()
		};
		assert_eq!(layer.finalize().unwrap().checking_key_aliases, ["old", "older"]);
	}

	#[test]
	fn merge_overrides_set_fields_only() {
		let mut base = KeystoreConfigLayer {
			signing_key_alias: Some("a".into()),
			checking_key_aliases: Some(vec!["b".into()]),
			..with_password()
		};
		base.merge(KeystoreConfigLayer {
			signing_key_alias: Some("c".into()),
			..Default::default()
		});
		assert_eq!(base.signing_key_alias.as_deref(), Some("c"));
		assert_eq!(base.checking_key_aliases, Some(vec!["b".to_string()]));
		assert!(base.password.is_some());
	}

	#[test]
	fn password_is_not_serialized() {
		let toml = toml::to_string(&with_password()).unwrap();
		assert!(!toml.contains("pw"));
	}

	#[test]
	fn deserializes_partial_layer() {
		let layer: KeystoreConfigLayer = toml::from_str(
			r#"
signing_key_alias = "rotated"
checking_key_aliases = ["selfsigned"]
"#,
		)
		.unwrap();
		assert_eq!(layer.signing_key_alias.as_deref(), Some("rotated"));
		assert!(layer.password.is_none());
		assert!(layer.locations.is_none());
	}
}
