// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Signing and verification key material for RADAR tokens.
//!
//! Key pairs come from an external, password-protected key store. One alias
//! is the signing key; further checking aliases stay verifiable during key
//! rotation. The algorithm is selected from the private key type.
//!
//! ```ignore
//! use radar_auth_keys::{KeyMaterialManager, SharedKeyMaterial};
//!
//! let keys = SharedKeyMaterial::new(KeyMaterialManager::from_config(&config)?);
//! let jwks = serde_json::to_string(keys.current().jwks())?;
//! ```

pub mod algorithm;
pub mod error;
pub mod jwks;
pub mod manager;
pub mod pem;
pub mod shared;
pub mod signing;
pub mod store;

pub use algorithm::{KeyAlgorithm, KeyMaterial};
pub use error::{KeyError, KeyStoreError};
pub use jwks::{JsonWebKey, JsonWebKeySet};
pub use manager::{KeyMaterialManager, VerifierSettings};
pub use pem::{PemDirectoryOpener, PemDirectoryStore};
pub use shared::SharedKeyMaterial;
pub use signing::{Signer, Verifier};
pub use store::{KeyStore, KeyStoreOpener, RawKeyPair};
