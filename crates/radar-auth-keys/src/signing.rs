// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! JWT signer and verifiers built from loaded key material.

use std::fmt;

use jsonwebtoken::{decode, encode, Header, TokenData, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::algorithm::{KeyAlgorithm, KeyMaterial};

/// Signs tokens with the configured signing key.
///
/// Every header carries the signing alias as `kid`.
#[derive(Clone)]
pub struct Signer {
	material: KeyMaterial,
}

impl Signer {
	pub fn new(material: KeyMaterial) -> Self {
		Self { material }
	}

	pub fn alias(&self) -> &str {
		self.material.alias()
	}

	pub fn algorithm(&self) -> KeyAlgorithm {
		self.material.algorithm()
	}

	pub fn header(&self) -> Header {
		let mut header = Header::new(self.material.algorithm().jwt_algorithm());
		header.kid = Some(self.material.alias().to_string());
		header
	}

	pub fn sign<T: Serialize>(&self, claims: &T) -> jsonwebtoken::errors::Result<String> {
		encode(&self.header(), claims, self.material.encoding_key())
	}
}

impl fmt::Debug for Signer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signer")
			.field("alias", &self.alias())
			.field("algorithm", &self.algorithm())
			.finish()
	}
}

/// Verifies tokens against one key.
#[derive(Clone)]
pub struct Verifier {
	alias: String,
	algorithm: KeyAlgorithm,
	key: jsonwebtoken::DecodingKey,
	validation: Validation,
}

impl Verifier {
	/// Builds a verifier that requires `exp` and, when `audience` is set, the
	/// matching `aud`.
	pub fn new(material: &KeyMaterial, audience: Option<&str>, leeway_secs: u64) -> Self {
		let mut validation = Validation::new(material.algorithm().jwt_algorithm());
		validation.leeway = leeway_secs;
		match audience {
			Some(aud) => validation.set_audience(&[aud]),
			None => validation.validate_aud = false,
		}

		Self {
			alias: material.alias().to_string(),
			algorithm: material.algorithm(),
			key: material.decoding_key().clone(),
			validation,
		}
	}

	pub fn alias(&self) -> &str {
		&self.alias
	}

	pub fn algorithm(&self) -> KeyAlgorithm {
		self.algorithm
	}

	pub fn verify<T: DeserializeOwned>(&self, token: &str) -> jsonwebtoken::errors::Result<TokenData<T>> {
		decode::<T>(token, &self.key, &self.validation)
	}
}

impl fmt::Debug for Verifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Verifier")
			.field("alias", &self.alias)
			.field("algorithm", &self.algorithm)
			.field("audience", &self.validation.aud)
			.finish()
	}
}
