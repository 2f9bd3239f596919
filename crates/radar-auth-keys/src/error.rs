// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Key store and key material error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from a single key store.
#[derive(Debug, Error)]
pub enum KeyStoreError {
	/// The store location does not exist or is not a directory.
	#[error("key store not found at {0}")]
	NotAStore(PathBuf),

	/// The store password does not decrypt the store's entries.
	#[error("key store password rejected for {0}")]
	PasswordRejected(PathBuf),

	/// No entry with this alias.
	#[error("key alias not found: {alias}")]
	AliasNotFound { alias: String },

	/// The entry exists but could not be decrypted with the store password.
	#[error("wrong password for key alias: {alias}")]
	WrongPassword { alias: String },

	/// The entry exists but is not a usable key encoding.
	#[error("malformed key entry {alias}: {message}")]
	Malformed { alias: String, message: String },

	#[error("failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Errors while building key material. All are fatal at start-up.
#[derive(Debug, Error)]
pub enum KeyError {
	#[error("no key store could be opened (tried: {})", display_paths(.tried))]
	KeyStoreUnavailable { tried: Vec<PathBuf> },

	#[error("signing key {alias} unavailable: {source}")]
	SigningKeyMissing {
		alias: String,
		#[source]
		source: KeyStoreError,
	},

	#[error("unsupported key type for {alias}: {key_type}")]
	UnsupportedKeyType { alias: String, key_type: String },

	/// The private and public halves of a pair do not belong together.
	#[error("private and public key for {alias} do not match")]
	KeyPairMismatch { alias: String },

	#[error("invalid key material for {alias}: {message}")]
	InvalidKey { alias: String, message: String },

	#[error(transparent)]
	KeyStore(#[from] KeyStoreError),
}

impl KeyError {
	/// Key errors are configuration failures.
	pub fn status_code(&self) -> u16 {
		500
	}
}

fn display_paths(paths: &[PathBuf]) -> String {
	paths
		.iter()
		.map(|p| p.display().to_string())
		.collect::<Vec<_>>()
		.join(", ")
}
