// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization error types.

use std::fmt;

use thiserror::Error;

use crate::permission::Permission;

/// Errors raised while looking up catalog entries or parsing claim values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
	// =========================================================================
	// Catalog Errors
	// =========================================================================
	/// The entity/operation pair or scope string is not in the catalog.
	#[error("permission not found: {0}")]
	PermissionNotFound(String),

	/// The role name is not in the role catalog.
	#[error("unknown role: {0}")]
	UnknownRole(String),

	// =========================================================================
	// Claim Errors
	// =========================================================================
	/// A role claim could not be decoded.
	#[error("invalid role claim: {0}")]
	InvalidRoleClaim(String),
}

impl AuthError {
	/// Returns the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			AuthError::PermissionNotFound(_) => 500,
			AuthError::UnknownRole(_) | AuthError::InvalidRoleClaim(_) => 401,
		}
	}
}

/// The level of the target chain a permission was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeLevel {
	Global,
	Organization,
	Project,
	Subject,
	Source,
}

impl fmt::Display for ScopeLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			ScopeLevel::Global => "global",
			ScopeLevel::Organization => "organization",
			ScopeLevel::Project => "project",
			ScopeLevel::Subject => "subject",
			ScopeLevel::Source => "source",
		})
	}
}

/// A resolver check evaluated to false.
///
/// Carries enough context for diagnostic logging. Request handlers should
/// surface only a 403 and never echo these fields back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct AuthorizationDenied {
	pub permission: Permission,
	pub level: ScopeLevel,
	pub referent: Option<String>,
}

impl AuthorizationDenied {
	pub fn status_code(&self) -> u16 {
		403
	}
}

impl fmt::Display for AuthorizationDenied {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.referent {
			Some(referent) => write!(
				f,
				"permission {} denied at {} scope {}",
				self.permission, self.level, referent
			),
			None => write!(f, "permission {} denied at {} scope", self.permission, self.level),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unknown_role_is_401() {
		assert_eq!(AuthError::UnknownRole("X".into()).status_code(), 401);
	}

	#[test]
	fn missing_permission_is_internal() {
		assert_eq!(AuthError::PermissionNotFound("X.Y".into()).status_code(), 500);
	}

	#[test]
	fn denial_is_403_and_names_the_target() {
		let denied = AuthorizationDenied {
			permission: Permission::SUBJECT_DELETE,
			level: ScopeLevel::Project,
			referent: Some("proj-1".into()),
		};
		assert_eq!(denied.status_code(), 403);
		assert_eq!(
			denied.to_string(),
			"permission SUBJECT.DELETE denied at project scope proj-1"
		);
	}

	#[test]
	fn global_denial_has_no_referent() {
		let denied = AuthorizationDenied {
			permission: Permission::AUDIT_READ,
			level: ScopeLevel::Global,
			referent: None,
		};
		assert_eq!(denied.to_string(), "permission AUDIT.READ denied at global scope");
	}
}
