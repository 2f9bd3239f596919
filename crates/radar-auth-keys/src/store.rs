// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Key store abstraction.
//!
//! A key store is an external, password-protected source of key pairs
//! addressed by alias. The manager only sees these traits, so the on-disk
//! format can be swapped without touching key selection or rotation.

use std::fmt;
use std::path::Path;

use radar_auth_config::SecretString;
use zeroize::Zeroizing;

use crate::error::KeyStoreError;

/// DER-encoded key pair as read from a store.
pub struct RawKeyPair {
	/// Unencrypted PKCS#8 `PrivateKeyInfo`.
	pub private_key: Zeroizing<Vec<u8>>,
	/// X.509 `SubjectPublicKeyInfo`.
	pub public_key: Vec<u8>,
}

impl fmt::Debug for RawKeyPair {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RawKeyPair")
			.field("private_key", &"[REDACTED]")
			.field("public_key_len", &self.public_key.len())
			.finish()
	}
}

/// An opened key store.
pub trait KeyStore: Send + Sync {
	/// Where the store was opened from, for logging.
	fn location(&self) -> &Path;

	/// Aliases present in the store, sorted.
	fn aliases(&self) -> Result<Vec<String>, KeyStoreError>;

	/// Loads and decrypts the key pair stored under `alias`.
	///
	/// Returns [`KeyStoreError::AliasNotFound`] when the alias is absent, which
	/// callers treat differently from an entry that exists but is unreadable.
	fn load(&self, alias: &str) -> Result<RawKeyPair, KeyStoreError>;
}

/// Opens key stores at candidate locations.
pub trait KeyStoreOpener: Send + Sync {
	/// Opens the store at `location`, failing if it is absent or the password
	/// does not unlock it.
	fn open(&self, location: &Path, password: &SecretString)
		-> Result<Box<dyn KeyStore>, KeyStoreError>;
}
