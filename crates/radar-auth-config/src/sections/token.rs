// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Token issuance and validation settings.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_ISSUER: &str = "radar-auth";
const DEFAULT_RESOURCE_ID: &str = "res_ManagementPortal";
const DEFAULT_ACCESS_TOKEN_VALIDITY_SECS: u64 = 900;
const DEFAULT_REFRESH_TOKEN_VALIDITY_SECS: u64 = 86_400;
const DEFAULT_LEEWAY_SECS: u64 = 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TokenConfigLayer {
	pub issuer: Option<String>,
	/// Audience required on access tokens.
	pub resource_id: Option<String>,
	pub access_token_validity_secs: Option<u64>,
	pub refresh_token_validity_secs: Option<u64>,
	pub leeway_secs: Option<u64>,
}

impl TokenConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.issuer.is_some() {
			self.issuer = other.issuer;
		}
		if other.resource_id.is_some() {
			self.resource_id = other.resource_id;
		}
		if other.access_token_validity_secs.is_some() {
			self.access_token_validity_secs = other.access_token_validity_secs;
		}
		if other.refresh_token_validity_secs.is_some() {
			self.refresh_token_validity_secs = other.refresh_token_validity_secs;
		}
		if other.leeway_secs.is_some() {
			self.leeway_secs = other.leeway_secs;
		}
	}

	pub fn finalize(self) -> Result<TokenConfig, ConfigError> {
		let config = TokenConfig {
			issuer: self.issuer.unwrap_or_else(|| DEFAULT_ISSUER.to_string()),
			resource_id: self
				.resource_id
				.unwrap_or_else(|| DEFAULT_RESOURCE_ID.to_string()),
			access_token_validity_secs: self
				.access_token_validity_secs
				.unwrap_or(DEFAULT_ACCESS_TOKEN_VALIDITY_SECS),
			refresh_token_validity_secs: self
				.refresh_token_validity_secs
				.unwrap_or(DEFAULT_REFRESH_TOKEN_VALIDITY_SECS),
			leeway_secs: self.leeway_secs.unwrap_or(DEFAULT_LEEWAY_SECS),
		};
		config.validate()?;
		Ok(config)
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenConfig {
	pub issuer: String,
	pub resource_id: String,
	pub access_token_validity_secs: u64,
	pub refresh_token_validity_secs: u64,
	pub leeway_secs: u64,
}

impl TokenConfig {
	fn validate(&self) -> Result<(), ConfigError> {
		if self.resource_id.is_empty() {
			return Err(ConfigError::Validation(
				"token resource_id cannot be empty".to_string(),
			));
		}
		if self.access_token_validity_secs == 0 || self.refresh_token_validity_secs == 0 {
			return Err(ConfigError::Validation(
				"token validity must be greater than zero".to_string(),
			));
		}
		if self.refresh_token_validity_secs < self.access_token_validity_secs {
			return Err(ConfigError::Validation(format!(
				"refresh_token_validity_secs ({}) must not be shorter than access_token_validity_secs ({})",
				self.refresh_token_validity_secs, self.access_token_validity_secs
			)));
		}
		Ok(())
	}
}

impl Default for TokenConfig {
	fn default() -> Self {
		Self {
			issuer: DEFAULT_ISSUER.to_string(),
			resource_id: DEFAULT_RESOURCE_ID.to_string(),
			access_token_validity_secs: DEFAULT_ACCESS_TOKEN_VALIDITY_SECS,
			refresh_token_validity_secs: DEFAULT_REFRESH_TOKEN_VALIDITY_SECS,
			leeway_secs: DEFAULT_LEEWAY_SECS,
		}
	}
}
