// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! PEM directory key store.
//!
//! Layout, one pair per alias:
//!
//! ```text
//! <dir>/<alias>.key.pem   PKCS#8 private key, normally ENCRYPTED PRIVATE KEY
//! <dir>/<alias>.pub.pem   SubjectPublicKeyInfo (PUBLIC KEY)
//! ```
//!
//! A directory opens with a password when its first encrypted entry, by
//! alias order, decrypts with it. A directory with no encrypted entries
//! always opens.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use pkcs8::der::Document;
use pkcs8::EncryptedPrivateKeyInfo;
use radar_auth_config::SecretString;
use tracing::{debug, trace};
use zeroize::Zeroizing;

use crate::error::KeyStoreError;
use crate::store::{KeyStore, KeyStoreOpener, RawKeyPair};

const PRIVATE_SUFFIX: &str = ".key.pem";
const PUBLIC_SUFFIX: &str = ".pub.pem";

const ENCRYPTED_PRIVATE_KEY_LABEL: &str = "ENCRYPTED PRIVATE KEY";
const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";
const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

/// Opens [`PemDirectoryStore`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PemDirectoryOpener;

impl KeyStoreOpener for PemDirectoryOpener {
	fn open(
		&self,
		location: &Path,
		password: &SecretString,
	) -> Result<Box<dyn KeyStore>, KeyStoreError> {
		Ok(Box::new(PemDirectoryStore::open(location, password.clone())?))
	}
}

/// A directory of PEM-encoded key pairs sharing one password.
pub struct PemDirectoryStore {
	dir: PathBuf,
	password: SecretString,
}

impl PemDirectoryStore {
	pub fn open(dir: impl Into<PathBuf>, password: SecretString) -> Result<Self, KeyStoreError> {
		let dir = dir.into();
		if !dir.is_dir() {
			return Err(KeyStoreError::NotAStore(dir));
		}
		let store = Self { dir, password };

		for alias in store.aliases()? {
			let path = store.private_key_path(&alias);
			let pem = read_pem(&path, &alias)?;
			if pem.label != ENCRYPTED_PRIVATE_KEY_LABEL {
				continue;
			}
			trace!(alias = %alias, "probing store password");
			return match decrypt(&pem.der, &store.password) {
				Some(_) => {
					debug!(location = %store.dir.display(), "opened key store");
					Ok(store)
				}
				None => Err(KeyStoreError::PasswordRejected(store.dir)),
			};
		}

		debug!(location = %store.dir.display(), "opened key store without encrypted entries");
		Ok(store)
	}

	fn private_key_path(&self, alias: &str) -> PathBuf {
		self.dir.join(format!("{alias}{PRIVATE_SUFFIX}"))
	}

	fn public_key_path(&self, alias: &str) -> PathBuf {
		self.dir.join(format!("{alias}{PUBLIC_SUFFIX}"))
	}
}

impl KeyStore for PemDirectoryStore {
	fn location(&self) -> &Path {
		&self.dir
	}

	fn aliases(&self) -> Result<Vec<String>, KeyStoreError> {
		let entries = fs::read_dir(&self.dir).map_err(|source| KeyStoreError::Io {
			path: self.dir.clone(),
			source,
		})?;

		let mut aliases = Vec::new();
		for entry in entries {
			let entry = entry.map_err(|source| KeyStoreError::Io {
				path: self.dir.clone(),
				source,
			})?;
			if let Some(alias) = entry
				.file_name()
				.to_str()
				.and_then(|name| name.strip_suffix(PRIVATE_SUFFIX))
				.filter(|alias| !alias.is_empty())
			{
				aliases.push(alias.to_string());
			}
		}
		aliases.sort();
		Ok(aliases)
	}

	fn load(&self, alias: &str) -> Result<RawKeyPair, KeyStoreError> {
		let private_path = self.private_key_path(alias);
		if !private_path.is_file() {
			return Err(KeyStoreError::AliasNotFound {
				alias: alias.to_string(),
			});
		}

		let private = read_pem(&private_path, alias)?;
		let private_key = match private.label.as_str() {
			ENCRYPTED_PRIVATE_KEY_LABEL => {
				decrypt(&private.der, &self.password).ok_or_else(|| KeyStoreError::WrongPassword {
					alias: alias.to_string(),
				})?
			}
			PRIVATE_KEY_LABEL => Zeroizing::new(private.der.to_vec()),
			other => {
				return Err(KeyStoreError::Malformed {
					alias: alias.to_string(),
					message: format!("unexpected PEM label {other:?} in {}", private_path.display()),
				})
			}
		};

		let public_path = self.public_key_path(alias);
		let public = read_pem(&public_path, alias)?;
		if public.label != PUBLIC_KEY_LABEL {
			return Err(KeyStoreError::Malformed {
				alias: alias.to_string(),
				message: format!("unexpected PEM label {:?} in {}", public.label, public_path.display()),
			});
		}

		Ok(RawKeyPair {
			private_key,
			public_key: public.der.to_vec(),
		})
	}
}

struct Pem {
	label: String,
	der: Zeroizing<Vec<u8>>,
}

fn read_pem(path: &Path, alias: &str) -> Result<Pem, KeyStoreError> {
	let text = Zeroizing::new(fs::read_to_string(path).map_err(|source| {
		if source.kind() == ErrorKind::NotFound {
			KeyStoreError::Malformed {
				alias: alias.to_string(),
				message: format!("missing {}", path.display()),
			}
		} else {
			KeyStoreError::Io {
				path: path.to_path_buf(),
				source,
			}
		}
	})?);

	let (label, document) = Document::from_pem(&text).map_err(|e| KeyStoreError::Malformed {
		alias: alias.to_string(),
		message: format!("invalid PEM in {}: {e}", path.display()),
	})?;

	Ok(Pem {
		label: label.to_string(),
		der: Zeroizing::new(document.as_bytes().to_vec()),
	})
}

/// Decrypts an `EncryptedPrivateKeyInfo`. `None` on a bad password or encoding.
fn decrypt(der: &[u8], password: &SecretString) -> Option<Zeroizing<Vec<u8>>> {
	let info = EncryptedPrivateKeyInfo::try_from(der).ok()?;
	let document = info.decrypt(password.expose().as_bytes()).ok()?;
	Some(Zeroizing::new(document.as_bytes().to_vec()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	fn fixtures() -> PathBuf {
		PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
	}

	fn password(p: &str) -> SecretString {
		SecretString::new(p.to_string())
	}

	mod open {
		use super::*;

		#[test]
		fn opens_with_store_password() {
			let store = PemDirectoryStore::open(fixtures().join("keystore"), password("radar-test-pass"));
			assert!(store.is_ok());
		}

		#[test]
		fn rejects_other_password() {
			let result = PemDirectoryStore::open(fixtures().join("alt-keystore"), password("radar-test-pass"));
			assert!(matches!(result, Err(KeyStoreError::PasswordRejected(_))));
		}

		#[test]
		fn missing_directory_is_not_a_store() {
			let result = PemDirectoryStore::open(fixtures().join("nope"), password("x"));
			assert!(matches!(result, Err(KeyStoreError::NotAStore(_))));
		}

		#[test]
		fn empty_directory_opens() {
			let dir = TempDir::new().unwrap();
			let store = PemDirectoryStore::open(dir.path(), password("anything")).unwrap();
			assert!(store.aliases().unwrap().is_empty());
		}

		#[test]
		fn opener_returns_boxed_store() {
			let store = PemDirectoryOpener
				.open(&fixtures().join("keystore"), &password("radar-test-pass"))
				.unwrap();
			assert_eq!(store.location(), fixtures().join("keystore"));
		}
	}

	mod load {
		use super::*;

		fn store() -> PemDirectoryStore {
			PemDirectoryStore::open(fixtures().join("keystore"), password("radar-test-pass")).unwrap()
		}

		#[test]
		fn lists_aliases_sorted() {
			assert_eq!(
				store().aliases().unwrap(),
				["ec-signing", "ed25519", "rotated", "secp384", "selfsigned", "wrongpass"]
			);
		}

		#[test]
		fn loads_decrypted_pair() {
			let pair = store().load("selfsigned").unwrap();
			assert!(!pair.private_key.is_empty());
			assert!(!pair.public_key.is_empty());
			assert!(format!("{pair:?}").contains("[REDACTED]"));
		}

		#[test]
		fn absent_alias_is_not_found() {
			assert!(matches!(
				store().load("missing"),
				Err(KeyStoreError::AliasNotFound { alias }) if alias == "missing"
			));
		}

		#[test]
		fn entry_with_other_password_is_wrong_password() {
			assert!(matches!(
				store().load("wrongpass"),
				Err(KeyStoreError::WrongPassword { .. })
			));
		}

		#[test]
		fn missing_public_half_is_malformed() {
			let dir = TempDir::new().unwrap();
			fs::copy(
				fixtures().join("keystore/selfsigned.key.pem"),
				dir.path().join("solo.key.pem"),
			)
			.unwrap();
			let store = PemDirectoryStore::open(dir.path(), password("radar-test-pass")).unwrap();
			assert!(matches!(store.load("solo"), Err(KeyStoreError::Malformed { .. })));
		}

		#[test]
		fn garbage_pem_is_malformed() {
			let dir = TempDir::new().unwrap();
			fs::write(dir.path().join("junk.key.pem"), "not a pem").unwrap();
			let store = PemDirectoryStore {
				dir: dir.path().to_path_buf(),
				password: password("x"),
			};
			assert!(matches!(store.load("junk"), Err(KeyStoreError::Malformed { .. })));
		}
	}
}
