// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Key material manager.
//!
//! Builds one signer and two ordered verifier lists from the configured key
//! store. The signing key always comes first, followed by checking keys in
//! configuration order, so tokens signed by a key that has been demoted to
//! checking-only keep verifying until they expire.

use std::fmt;

use radar_auth_config::{AuthServiceConfig, KeystoreConfig};
use tracing::{info, instrument, warn};

use crate::algorithm::KeyMaterial;
use crate::error::{KeyError, KeyStoreError};
use crate::jwks::JsonWebKeySet;
use crate::pem::PemDirectoryOpener;
use crate::signing::{Signer, Verifier};
use crate::store::{KeyStore, KeyStoreOpener};

/// Validation settings applied to every verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierSettings {
	/// Audience required on access tokens.
	pub audience: String,
	pub leeway_secs: u64,
}

/// Signing key plus verification keys, immutable once built.
pub struct KeyMaterialManager {
	signer: Signer,
	keys: Vec<KeyMaterial>,
	access_verifiers: Vec<Verifier>,
	refresh_verifiers: Vec<Verifier>,
	jwks: JsonWebKeySet,
}

impl KeyMaterialManager {
	/// Loads key material using the PEM directory store.
	pub fn from_config(config: &AuthServiceConfig) -> Result<Self, KeyError> {
		let settings = VerifierSettings {
			audience: config.token.resource_id.clone(),
			leeway_secs: config.token.leeway_secs,
		};
		Self::load(&config.keystore, settings, &PemDirectoryOpener)
	}

	/// Loads key material from the first key store location that opens.
	///
	/// The signing key must load. Checking aliases that are absent from the
	/// store are skipped; any other failure on a checking key is fatal.
	#[instrument(skip_all, fields(signing_alias = %keystore.signing_key_alias))]
	pub fn load(
		keystore: &KeystoreConfig,
		settings: VerifierSettings,
		opener: &dyn KeyStoreOpener,
	) -> Result<Self, KeyError> {
		let store = open_first(keystore, opener)?;

		let signing_alias = keystore.signing_key_alias.as_str();
		let signing_pair = store
			.load(signing_alias)
			.map_err(|source| KeyError::SigningKeyMissing {
				alias: signing_alias.to_string(),
				source,
			})?;
		let signing = KeyMaterial::from_raw(signing_alias, &signing_pair)?;

		let mut keys = vec![signing.clone()];
		for alias in &keystore.checking_key_aliases {
			if keys.iter().any(|k| k.alias() == alias.as_str()) {
				continue;
			}
			match store.load(alias) {
				Ok(pair) => keys.push(KeyMaterial::from_raw(alias, &pair)?),
				Err(KeyStoreError::AliasNotFound { .. }) => {
					warn!(alias = %alias, "checking key not present in key store, skipping");
				}
				Err(e) => return Err(e.into()),
			}
		}

		let access_verifiers = keys
			.iter()
			.map(|k| Verifier::new(k, Some(settings.audience.as_str()), settings.leeway_secs))
			.collect();
		let refresh_verifiers = keys
			.iter()
			.map(|k| Verifier::new(k, None, settings.leeway_secs))
			.collect();
		let jwks = JsonWebKeySet {
			keys: keys.iter().map(|k| k.jwk().clone()).collect(),
		};

		info!(
			location = %store.location().display(),
			algorithm = %signing.algorithm(),
			verifiers = keys.len(),
			"key material loaded"
		);

		Ok(Self {
			signer: Signer::new(signing),
			keys,
			access_verifiers,
			refresh_verifiers,
			jwks,
		})
	}

	pub fn signer(&self) -> &Signer {
		&self.signer
	}

	pub fn signing_alias(&self) -> &str {
		self.signer.alias()
	}

	/// Aliases of the loaded checking keys, excluding the signing key.
	pub fn checking_aliases(&self) -> Vec<&str> {
		self.keys.iter().skip(1).map(|k| k.alias()).collect()
	}

	/// Verifiers bound to the access-token audience, signing key first.
	pub fn access_verifiers(&self) -> &[Verifier] {
		&self.access_verifiers
	}

	/// Verifiers with no audience constraint, signing key first.
	pub fn refresh_verifiers(&self) -> &[Verifier] {
		&self.refresh_verifiers
	}

	/// Public keys of every loaded pair, signing key first.
	pub fn jwks(&self) -> &JsonWebKeySet {
		&self.jwks
	}
}

impl fmt::Debug for KeyMaterialManager {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("KeyMaterialManager")
			.field("signing_alias", &self.signing_alias())
			.field("checking_aliases", &self.checking_aliases())
			.finish()
	}
}

fn open_first(
	keystore: &KeystoreConfig,
	opener: &dyn KeyStoreOpener,
) -> Result<Box<dyn KeyStore>, KeyError> {
	for location in &keystore.locations {
		match opener.open(location, &keystore.password) {
			Ok(store) => return Ok(store),
			Err(e) => warn!(location = %location.display(), error = %e, "key store not usable"),
		}
	}
	Err(KeyError::KeyStoreUnavailable {
		tried: keystore.locations.clone(),
	})
}
