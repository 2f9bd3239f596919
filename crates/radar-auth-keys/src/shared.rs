// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Hot-swappable handle to the current key material.

use std::sync::{Arc, PoisonError, RwLock};

use radar_auth_config::AuthServiceConfig;
use tracing::info;

use crate::error::KeyError;
use crate::manager::KeyMaterialManager;

/// Shared, atomically replaceable [`KeyMaterialManager`].
///
/// Readers take a snapshot with [`current`](Self::current) and keep using it
/// for the whole request. A reload builds a complete manager first, so a
/// failed reload leaves the previous keys in place.
#[derive(Debug, Clone)]
pub struct SharedKeyMaterial {
	inner: Arc<RwLock<Arc<KeyMaterialManager>>>,
}

impl SharedKeyMaterial {
	pub fn new(manager: KeyMaterialManager) -> Self {
		Self {
			inner: Arc::new(RwLock::new(Arc::new(manager))),
		}
	}

	pub fn current(&self) -> Arc<KeyMaterialManager> {
		let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
		Arc::clone(&guard)
	}

	/// Swaps in an already built manager, returning the previous one.
	pub fn replace(&self, manager: KeyMaterialManager) -> Arc<KeyMaterialManager> {
		let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
		let previous = std::mem::replace(&mut *guard, Arc::new(manager));
		info!(
			previous = previous.signing_alias(),
			current = guard.signing_alias(),
			"key material replaced"
		);
		previous
	}

	/// Rebuilds key material from configuration and swaps it in.
	pub fn reload(&self, config: &AuthServiceConfig) -> Result<(), KeyError> {
		let manager = KeyMaterialManager::from_config(config)?;
		self.replace(manager);
		Ok(())
	}
}

impl From<KeyMaterialManager> for SharedKeyMaterial {
	fn from(manager: KeyMaterialManager) -> Self {
		Self::new(manager)
	}
}
