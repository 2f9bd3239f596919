// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redacting wrapper for key store passwords and other sensitive values.
//!
//! A [`Secret<T>`] prints and serializes as `[REDACTED]`, is zeroized on drop,
//! and has no `Deref`. Call sites read the value with `.expose()`.
//!
//! ```
//! use radar_auth_config::Secret;
//!
//! let password = Secret::new("keystore-pass".to_string());
//! assert_eq!(format!("{password}"), "[REDACTED]");
//! assert_eq!(password.expose(), "keystore-pass");
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Placeholder printed in place of secret values.
pub const REDACTED: &str = "[REDACTED]";

#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Reads the secret value.
	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

impl<T> Serialize for Secret<T>
where
	T: Zeroize,
{
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(REDACTED)
	}
}

impl<'de, T> Deserialize<'de> for Secret<T>
where
	T: Deserialize<'de> + Zeroize,
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		T::deserialize(deserializer).map(Secret::new)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn debug_and_display_hide_value() {
		let secret = Secret::new("radar-test-pass".to_string());
		assert_eq!(format!("{secret}"), REDACTED);
		assert!(!format!("{secret:?}").contains("radar-test-pass"));
		assert!(!format!("{:?}", Some(secret.clone())).contains("radar-test-pass"));
	}

	#[test]
	fn serializes_redacted_and_deserializes_plain() {
		let secret = Secret::new("hunter2".to_string());
		assert_eq!(serde_json::to_string(&secret).unwrap(), "\"[REDACTED]\"");

		let parsed: SecretString = serde_json::from_str("\"hunter2\"").unwrap();
		assert_eq!(parsed, secret);
	}

	proptest! {
		#[test]
		fn display_never_contains_value(inner in "[a-zA-Z0-9!@#$%^&*_+=;:,.<>?/-]{3,40}") {
			prop_assume!(!REDACTED.contains(&inner));
			let secret = Secret::new(inner.clone());
			let shown = format!("{secret}");
			let debugged = format!("{secret:?}");
			prop_assert!(!shown.contains(&inner));
			prop_assert!(!debugged.contains(&inner));
		}

		#[test]
		fn expose_returns_original(inner in ".*") {
			let secret = Secret::new(inner.clone());
			prop_assert_eq!(secret.expose(), &inner);
		}
	}
}
