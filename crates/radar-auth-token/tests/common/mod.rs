// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#![allow(dead_code)]

use std::path::PathBuf;

use radar_auth_config::{KeystoreConfig, SecretString};
use radar_auth_keys::{KeyMaterialManager, PemDirectoryOpener, SharedKeyMaterial, VerifierSettings};
use radar_auth_token::TokenCodec;

pub const AUDIENCE: &str = "res_ManagementPortal";

pub fn keystore_dir() -> PathBuf {
	PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../radar-auth-keys/tests/fixtures/keystore")
}

pub fn keystore(signing: &str, checking: &[&str]) -> KeystoreConfig {
	KeystoreConfig {
		locations: vec![keystore_dir()],
		password: SecretString::new("radar-test-pass".to_string()),
		signing_key_alias: signing.to_string(),
		checking_key_aliases: checking.iter().map(|s| s.to_string()).collect(),
	}
}

pub fn manager_with_leeway(signing: &str, checking: &[&str], leeway_secs: u64) -> KeyMaterialManager {
	KeyMaterialManager::load(
		&keystore(signing, checking),
		VerifierSettings {
			audience: AUDIENCE.to_string(),
			leeway_secs,
		},
		&PemDirectoryOpener,
	)
	.unwrap()
}

pub fn manager(signing: &str, checking: &[&str]) -> KeyMaterialManager {
	manager_with_leeway(signing, checking, 0)
}

pub fn codec(signing: &str, checking: &[&str]) -> TokenCodec {
	TokenCodec::new(SharedKeyMaterial::new(manager(signing, checking)))
}
