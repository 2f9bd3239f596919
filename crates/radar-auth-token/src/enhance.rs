// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Mint-time token enhancement.
//!
//! Requested scopes are narrowed to what the subject's roles can actually
//! use. Over-broad requests are trimmed, never rejected.

use std::collections::BTreeSet;

use radar_auth::{is_role_allowed, ClaimsToken, Permission, Role, RoleAssignment};
use tracing::debug;

/// Subject data folded into a token at mint time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectProfile {
	pub subject: String,
	pub username: String,
	pub roles: Vec<RoleAssignment>,
	/// Global authorities, e.g. `ROLE_SYS_ADMIN`.
	pub authorities: Vec<String>,
	/// Sources bound to the subject's devices.
	pub sources: Vec<String>,
}

impl SubjectProfile {
	pub fn new(subject: impl Into<String>, username: impl Into<String>) -> Self {
		Self {
			subject: subject.into(),
			username: username.into(),
			..Default::default()
		}
	}

	pub fn with_role(mut self, assignment: RoleAssignment) -> Self {
		self.roles.push(assignment);
		self
	}

	pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
		self.authorities.push(authority.into());
		self
	}

	pub fn with_source(mut self, source: impl Into<String>) -> Self {
		self.sources.push(source.into());
		self
	}

	/// Roles from assignments and recognised authorities.
	pub fn effective_roles(&self) -> BTreeSet<Role> {
		self.roles
			.iter()
			.map(RoleAssignment::role)
			.chain(self.authorities.iter().filter_map(|a| a.parse::<Role>().ok()))
			.collect()
	}
}

/// Keeps the requested scopes whose permission at least one of `roles` holds.
///
/// Order of `requested` is preserved. Scopes outside the permission catalog
/// are dropped.
pub fn grantable_scopes<'a, I>(requested: I, roles: &BTreeSet<Role>) -> Vec<String>
where
	I: IntoIterator<Item = &'a str>,
{
	let mut granted: Vec<String> = Vec::new();
	for scope in requested {
		let allowed = Permission::from_scope(scope)
			.map(|p| roles.iter().any(|r| is_role_allowed(p, *r)))
			.unwrap_or(false);
		if !allowed {
			debug!(scope, "dropping scope not held by any role");
			continue;
		}
		if !granted.iter().any(|g| g == scope) {
			granted.push(scope.to_string());
		}
	}
	granted
}

/// Enhances an access token with the subject's identity, roles and sources,
/// narrowing its scopes to those the roles allow.
pub fn enhance(token: &ClaimsToken, profile: &SubjectProfile) -> ClaimsToken {
	let roles = profile.effective_roles();
	let scopes = grantable_scopes(token.scopes().iter().map(String::as_str), &roles);

	token
		.with_scopes(scopes)
		.to_builder()
		.subject(profile.subject.clone())
		.username(profile.username.clone())
		.roles(profile.roles.iter().cloned())
		.authorities(profile.authorities.iter().cloned())
		.sources(profile.sources.iter().cloned())
		.build()
}
