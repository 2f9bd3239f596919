// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! JSON Web Key Set for publishing verification keys.

use serde::{Deserialize, Serialize};

/// JSON Web Key Set for public key distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKeySet {
	pub keys: Vec<JsonWebKey>,
}

impl JsonWebKeySet {
	pub fn find(&self, kid: &str) -> Option<&JsonWebKey> {
		self.keys.iter().find(|k| k.kid == kid)
	}
}

/// A single public JSON Web Key.
///
/// RSA keys carry `n` and `e`. EC keys carry `crv`, `x` and `y`. All values
/// are base64url without padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
	pub kty: String,
	pub kid: String,
	pub alg: String,
	#[serde(rename = "use")]
	pub key_use: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub n: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub e: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub crv: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<String>,
}

impl JsonWebKey {
	pub fn rsa(kid: impl Into<String>, alg: impl Into<String>, n: String, e: String) -> Self {
		Self {
			kty: "RSA".to_string(),
			kid: kid.into(),
			alg: alg.into(),
			key_use: "sig".to_string(),
			n: Some(n),
			e: Some(e),
			crv: None,
			x: None,
			y: None,
		}
	}

	pub fn ec(
		kid: impl Into<String>,
		alg: impl Into<String>,
		crv: impl Into<String>,
		x: String,
		y: String,
	) -> Self {
		Self {
			kty: "EC".to_string(),
			kid: kid.into(),
			alg: alg.into(),
			key_use: "sig".to_string(),
			n: None,
			e: None,
			crv: Some(crv.into()),
			x: Some(x),
			y: Some(y),
		}
	}
}
