// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Algorithm selection and per-key signing material.
//!
//! The signature algorithm follows the private key type, never configuration:
//! RSA keys sign with RS256 and P-256 keys with ES256. Anything else is
//! rejected.

use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL, Engine};
use jsonwebtoken::{crypto, Algorithm, DecodingKey, EncodingKey};
use pkcs8::spki::SubjectPublicKeyInfoRef;
use pkcs8::{ObjectIdentifier, PrivateKeyInfo};
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use tracing::debug;

use crate::error::KeyError;
use crate::jwks::JsonWebKey;
use crate::store::RawKeyPair;

const RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const PRIME256V1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
const SECP384R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
const SECP521R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.35");
const ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");
const ED448: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.113");

const SELF_TEST_PROBE: &[u8] = b"radar-auth key pair self-test";

/// Signature algorithms supported for tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
	Es256,
	Rs256,
}

impl KeyAlgorithm {
	pub fn jwt_algorithm(&self) -> Algorithm {
		match self {
			KeyAlgorithm::Es256 => Algorithm::ES256,
			KeyAlgorithm::Rs256 => Algorithm::RS256,
		}
	}

	/// JOSE `alg` name.
	pub fn name(&self) -> &'static str {
		match self {
			KeyAlgorithm::Es256 => "ES256",
			KeyAlgorithm::Rs256 => "RS256",
		}
	}
}

impl fmt::Display for KeyAlgorithm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A loaded, self-tested key pair with its algorithm.
#[derive(Clone)]
pub struct KeyMaterial {
	alias: String,
	algorithm: KeyAlgorithm,
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
	jwk: JsonWebKey,
}

impl KeyMaterial {
	/// Builds key material from a raw pair, selecting the algorithm from the
	/// private key type and checking that both halves belong together.
	pub fn from_raw(alias: &str, raw: &RawKeyPair) -> Result<Self, KeyError> {
		let private = PrivateKeyInfo::try_from(raw.private_key.as_slice()).map_err(|e| KeyError::InvalidKey {
			alias: alias.to_string(),
			message: format!("invalid PKCS#8 private key: {e}"),
		})?;
		let public = SubjectPublicKeyInfoRef::try_from(raw.public_key.as_slice()).map_err(|e| {
			KeyError::InvalidKey {
				alias: alias.to_string(),
				message: format!("invalid public key: {e}"),
			}
		})?;

		if public.algorithm.oid != private.algorithm.oid {
			return Err(KeyError::KeyPairMismatch {
				alias: alias.to_string(),
			});
		}

		let oid = private.algorithm.oid;
		let material = if oid == RSA_ENCRYPTION {
			Self::rsa(alias, private.private_key, &raw.public_key)?
		} else if oid == EC_PUBLIC_KEY {
			let curve = private.algorithm.parameters_oid().map_err(|e| KeyError::InvalidKey {
				alias: alias.to_string(),
				message: format!("missing EC curve parameters: {e}"),
			})?;
			if curve != PRIME256V1 {
				return Err(KeyError::UnsupportedKeyType {
					alias: alias.to_string(),
					key_type: format!("EC/{}", curve_name(curve)),
				});
			}
			Self::ec_p256(alias, &raw.private_key, public.subject_public_key.raw_bytes())?
		} else {
			return Err(KeyError::UnsupportedKeyType {
				alias: alias.to_string(),
				key_type: key_type_name(oid),
			});
		};

		material.self_test()?;
		debug!(alias, algorithm = %material.algorithm, "loaded key pair");
		Ok(material)
	}

	fn rsa(alias: &str, pkcs1_private: &[u8], spki: &[u8]) -> Result<Self, KeyError> {
		let public = RsaPublicKey::from_public_key_der(spki).map_err(|e| KeyError::InvalidKey {
			alias: alias.to_string(),
			message: format!("invalid RSA public key: {e}"),
		})?;
		let n = BASE64URL.encode(public.n().to_bytes_be());
		let e = BASE64URL.encode(public.e().to_bytes_be());

		let decoding_key = DecodingKey::from_rsa_components(&n, &e).map_err(|err| KeyError::InvalidKey {
			alias: alias.to_string(),
			message: err.to_string(),
		})?;

		Ok(Self {
			alias: alias.to_string(),
			algorithm: KeyAlgorithm::Rs256,
			encoding_key: EncodingKey::from_rsa_der(pkcs1_private),
			decoding_key,
			jwk: JsonWebKey::rsa(alias, KeyAlgorithm::Rs256.name(), n, e),
		})
	}

	fn ec_p256(alias: &str, pkcs8_private: &[u8], point: &[u8]) -> Result<Self, KeyError> {
		// Uncompressed SEC1 point: 0x04 || X || Y
		if point.len() != 65 || point[0] != 0x04 {
			return Err(KeyError::InvalidKey {
				alias: alias.to_string(),
				message: "EC public key is not an uncompressed P-256 point".to_string(),
			});
		}
		let x = BASE64URL.encode(&point[1..33]);
		let y = BASE64URL.encode(&point[33..65]);

		let decoding_key = DecodingKey::from_ec_components(&x, &y).map_err(|err| KeyError::InvalidKey {
			alias: alias.to_string(),
			message: err.to_string(),
		})?;

		Ok(Self {
			alias: alias.to_string(),
			algorithm: KeyAlgorithm::Es256,
			encoding_key: EncodingKey::from_ec_der(pkcs8_private),
			decoding_key,
			jwk: JsonWebKey::ec(alias, KeyAlgorithm::Es256.name(), "P-256", x, y),
		})
	}

	/// Signs a probe with the private key and verifies it with the public key.
	fn self_test(&self) -> Result<(), KeyError> {
		let alg = self.algorithm.jwt_algorithm();
		let signature = crypto::sign(SELF_TEST_PROBE, &self.encoding_key, alg).map_err(|e| {
			KeyError::InvalidKey {
				alias: self.alias.clone(),
				message: format!("private key cannot sign: {e}"),
			}
		})?;
		match crypto::verify(&signature, SELF_TEST_PROBE, &self.decoding_key, alg) {
			Ok(true) => Ok(()),
			_ => Err(KeyError::KeyPairMismatch {
				alias: self.alias.clone(),
			}),
		}
	}

	pub fn alias(&self) -> &str {
		&self.alias
	}

	pub fn algorithm(&self) -> KeyAlgorithm {
		self.algorithm
	}

	pub fn encoding_key(&self) -> &EncodingKey {
		&self.encoding_key
	}

	pub fn decoding_key(&self) -> &DecodingKey {
		&self.decoding_key
	}

	pub fn jwk(&self) -> &JsonWebKey {
		&self.jwk
	}
}

impl fmt::Debug for KeyMaterial {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("KeyMaterial")
			.field("alias", &self.alias)
			.field("algorithm", &self.algorithm)
			.field("encoding_key", &"[REDACTED]")
			.finish()
	}
}

fn curve_name(oid: ObjectIdentifier) -> String {
	if oid == SECP384R1 {
		"P-384".to_string()
	} else if oid == SECP521R1 {
		"P-521".to_string()
	} else {
		oid.to_string()
	}
}

fn key_type_name(oid: ObjectIdentifier) -> String {
	if oid == ED25519 {
		"Ed25519".to_string()
	} else if oid == ED448 {
		"Ed448".to_string()
	} else {
		oid.to_string()
	}
}
