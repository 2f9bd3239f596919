// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Claims token: the authorization-relevant content of a bearer token.
//!
//! A [`ClaimsToken`] is an immutable snapshot. It is built once, either from
//! decoded JWT claims or from role and scope data at issuance time. Adding a
//! role or scope produces a new value.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::role::{Role, RoleAssignment, RoleTier};

/// Grant type of machine clients acting without a personal identity.
pub const CLIENT_CREDENTIALS: &str = "client_credentials";

/// Immutable token snapshot.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ClaimsToken {
	subject: Option<String>,
	username: Option<String>,
	roles: BTreeSet<RoleAssignment>,
	authorities: Vec<String>,
	scopes: Vec<String>,
	sources: Vec<String>,
	grant_type: Option<String>,
	audience: Vec<String>,
	issuer: Option<String>,
	issued_at: Option<DateTime<Utc>>,
	expires_at: Option<DateTime<Utc>>,
	token: Option<String>,
	token_type: Option<String>,
	client_id: Option<String>,
	token_id: Option<String>,
	access_token_id: Option<String>,
}

impl ClaimsToken {
	pub fn builder() -> ClaimsTokenBuilder {
		ClaimsTokenBuilder::default()
	}

	/// Returns a builder seeded with this token's values.
	pub fn to_builder(&self) -> ClaimsTokenBuilder {
		ClaimsTokenBuilder {
			inner: self.clone(),
		}
	}

	/// A copy of this token with one more role assignment.
	pub fn with_role(&self, assignment: RoleAssignment) -> Self {
		let mut next = self.clone();
		next.roles.insert(assignment);
		next
	}

	/// A copy of this token with one more scope. Duplicates are ignored.
	pub fn with_scope(&self, scope: impl Into<String>) -> Self {
		let mut next = self.clone();
		let scope = scope.into();
		if !next.scopes.contains(&scope) {
			next.scopes.push(scope);
		}
		next
	}

	/// A copy of this token whose scope list is replaced by `scopes`, deduplicated.
	pub fn with_scopes(&self, scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
		let mut next = self.clone();
		next.scopes.clear();
		for scope in scopes {
			let scope = scope.into();
			if !next.scopes.contains(&scope) {
				next.scopes.push(scope);
			}
		}
		next
	}

	pub fn subject(&self) -> Option<&str> {
		self.subject.as_deref()
	}

	pub fn username(&self) -> Option<&str> {
		self.username.as_deref()
	}

	/// Scoped role assignments, not including authorities.
	pub fn roles(&self) -> &BTreeSet<RoleAssignment> {
		&self.roles
	}

	/// Raw authority names as carried in the token.
	pub fn authorities(&self) -> &[String] {
		&self.authorities
	}

	pub fn scopes(&self) -> &[String] {
		&self.scopes
	}

	pub fn sources(&self) -> &[String] {
		&self.sources
	}

	pub fn grant_type(&self) -> Option<&str> {
		self.grant_type.as_deref()
	}

	pub fn audience(&self) -> &[String] {
		&self.audience
	}

	pub fn issuer(&self) -> Option<&str> {
		self.issuer.as_deref()
	}

	pub fn issued_at(&self) -> Option<DateTime<Utc>> {
		self.issued_at
	}

	pub fn expires_at(&self) -> Option<DateTime<Utc>> {
		self.expires_at
	}

	/// The raw encoded token, if this value came from or was turned into one.
	pub fn token(&self) -> Option<&str> {
		self.token.as_deref()
	}

	pub fn token_type(&self) -> Option<&str> {
		self.token_type.as_deref()
	}

	pub fn client_id(&self) -> Option<&str> {
		self.client_id.as_deref()
	}

	pub fn token_id(&self) -> Option<&str> {
		self.token_id.as_deref()
	}

	/// On refresh tokens, the id of the paired access token.
	pub fn access_token_id(&self) -> Option<&str> {
		self.access_token_id.as_deref()
	}

	pub fn is_refresh_token(&self) -> bool {
		self.access_token_id.is_some()
	}

	pub fn is_client_credentials(&self) -> bool {
		self.grant_type.as_deref() == Some(CLIENT_CREDENTIALS)
	}

	/// True when `now` is at or past the expiry. Tokens without expiry never expire.
	pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
		self.expires_at.is_some_and(|exp| now >= exp)
	}

	/// Every role assignment, with authorities folded in as referent-less assignments.
	///
	/// Authorities that do not name a known role are skipped.
	pub fn assignments(&self) -> impl Iterator<Item = RoleAssignment> + '_ {
		self.roles.iter().cloned().chain(
			self.authorities
				.iter()
				.filter_map(|a| a.parse::<Role>().ok())
				.map(RoleAssignment::global),
		)
	}

	/// Global-tier roles, from assignments or authorities.
	pub fn global_roles(&self) -> BTreeSet<Role> {
		self.assignments()
			.map(|a| a.role())
			.filter(|r| r.tier() == RoleTier::Global)
			.collect()
	}

	/// Project-tier roles assigned for `project`.
	pub fn roles_in_project(&self, project: &str) -> BTreeSet<Role> {
		self.roles_at(RoleTier::Project, project)
	}

	/// Organization-tier roles assigned for `organization`.
	pub fn roles_in_organization(&self, organization: &str) -> BTreeSet<Role> {
		self.roles_at(RoleTier::Organization, organization)
	}

	fn roles_at(&self, tier: RoleTier, referent: &str) -> BTreeSet<Role> {
		self.roles
			.iter()
			.filter(|a| a.role().tier() == tier && a.referent() == Some(referent))
			.map(RoleAssignment::role)
			.collect()
	}
}

impl fmt::Debug for ClaimsToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClaimsToken")
			.field("subject", &self.subject)
			.field("username", &self.username)
			.field("roles", &self.roles)
			.field("authorities", &self.authorities)
			.field("scopes", &self.scopes)
			.field("sources", &self.sources)
			.field("grant_type", &self.grant_type)
			.field("audience", &self.audience)
			.field("issuer", &self.issuer)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
			.field("token_type", &self.token_type)
			.field("client_id", &self.client_id)
			.field("token_id", &self.token_id)
			.field("access_token_id", &self.access_token_id)
			.finish()
	}
}

/// Builder for [`ClaimsToken`].
#[derive(Debug, Clone, Default)]
pub struct ClaimsTokenBuilder {
	inner: ClaimsToken,
}

impl ClaimsTokenBuilder {
	pub fn subject(mut self, subject: impl Into<String>) -> Self {
		self.inner.subject = Some(subject.into());
		self
	}

	pub fn username(mut self, username: impl Into<String>) -> Self {
		self.inner.username = Some(username.into());
		self
	}

	pub fn role(mut self, assignment: RoleAssignment) -> Self {
		self.inner.roles.insert(assignment);
		self
	}

	pub fn roles(mut self, assignments: impl IntoIterator<Item = RoleAssignment>) -> Self {
		self.inner.roles.extend(assignments);
		self
	}

	/// Adds decoded role claims. Claims naming unknown roles are logged and dropped.
	pub fn role_claims<I, S>(mut self, claims: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		for claim in claims {
			match RoleAssignment::parse_claim(claim.as_ref()) {
				Ok(assignment) => {
					self.inner.roles.insert(assignment);
				}
				Err(e) => warn!(claim = claim.as_ref(), error = %e, "Dropping unrecognized role claim"),
			}
		}
		self
	}

	pub fn authorities(mut self, authorities: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.inner.authorities.extend(authorities.into_iter().map(Into::into));
		self
	}

	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		let scope = scope.into();
		if !self.inner.scopes.contains(&scope) {
			self.inner.scopes.push(scope);
		}
		self
	}

	pub fn scopes(self, scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
		scopes.into_iter().fold(self, |b, s| b.scope(s))
	}

	pub fn sources(mut self, sources: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.inner.sources.extend(sources.into_iter().map(Into::into));
		self
	}

	pub fn grant_type(mut self, grant_type: impl Into<String>) -> Self {
		self.inner.grant_type = Some(grant_type.into());
		self
	}

	pub fn audience(mut self, audience: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.inner.audience.extend(audience.into_iter().map(Into::into));
		self
	}

	pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
		self.inner.issuer = Some(issuer.into());
		self
	}

	pub fn issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
		self.inner.issued_at = Some(issued_at);
		self
	}

	pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
		self.inner.expires_at = Some(expires_at);
		self
	}

	pub fn token(mut self, token: impl Into<String>) -> Self {
		self.inner.token = Some(token.into());
		self
	}

	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.inner.token_type = Some(token_type.into());
		self
	}

	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.inner.client_id = Some(client_id.into());
		self
	}

	pub fn token_id(mut self, token_id: impl Into<String>) -> Self {
		self.inner.token_id = Some(token_id.into());
		self
	}

	pub fn access_token_id(mut self, access_token_id: impl Into<String>) -> Self {
		self.inner.access_token_id = Some(access_token_id.into());
		self
	}

	pub fn build(self) -> ClaimsToken {
		self.inner
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Duration;

	fn sample() -> ClaimsToken {
		ClaimsToken::builder()
			.subject("sub-1")
			.username("alice")
			.role(RoleAssignment::scoped(Role::ProjectOwner, "p1"))
			.role(RoleAssignment::scoped(Role::Participant, "p2"))
			.role(RoleAssignment::scoped(Role::OrganizationAdmin, "org-1"))
			.authorities(["ROLE_SYS_ADMIN", "ROLE_UNKNOWN"])
			.scopes(["SUBJECT.READ", "SUBJECT.READ", "PROJECT.READ"])
			.build()
	}

	mod queries {
		use super::*;

		#[test]
		fn scopes_are_deduplicated() {
			assert_eq!(sample().scopes(), ["SUBJECT.READ", "PROJECT.READ"]);
		}

		#[test]
		fn with_scopes_replaces_list() {
			let original = sample();
			let narrowed = original.with_scopes(["MEASUREMENT.READ", "MEASUREMENT.READ"]);
			assert_eq!(narrowed.scopes(), ["MEASUREMENT.READ"]);
			assert_eq!(original.scopes(), ["SUBJECT.READ", "PROJECT.READ"]);
		}

		#[test]
		fn authorities_fold_into_global_roles() {
			let roles: Vec<_> = sample().global_roles().into_iter().collect();
			assert_eq!(roles, vec![Role::SysAdmin]);
		}

		#[test]
		fn roles_are_grouped_by_referent() {
			let token = sample();
			assert_eq!(
				token.roles_in_project("p1").into_iter().collect::<Vec<_>>(),
				vec![Role::ProjectOwner]
			);
			assert!(token.roles_in_project("org-1").is_empty());
			assert_eq!(
				token.roles_in_organization("org-1").into_iter().collect::<Vec<_>>(),
				vec![Role::OrganizationAdmin]
			);
		}

		#[test]
		fn client_credentials_detected() {
			let token = ClaimsToken::builder().grant_type(CLIENT_CREDENTIALS).build();
			assert!(token.is_client_credentials());
			assert!(!sample().is_client_credentials());
		}

		#[test]
		fn expiry_is_inclusive() {
			let now = Utc::now();
			let token = ClaimsToken::builder().expires_at(now).build();
			assert!(token.is_expired_at(now));
			assert!(!token.is_expired_at(now - Duration::seconds(1)));
			assert!(!ClaimsToken::default().is_expired_at(now));
		}

		#[test]
		fn refresh_tokens_carry_access_token_id() {
			let token = ClaimsToken::builder().access_token_id("jti-1").build();
			assert!(token.is_refresh_token());
			assert!(!sample().is_refresh_token());
		}
	}

	mod immutability {
		use super::*;

		#[test]
		fn with_role_returns_new_value() {
			let original = sample();
			let extended = original.with_role(RoleAssignment::scoped(Role::ProjectAnalyst, "p3"));
			assert!(original.roles_in_project("p3").is_empty());
			assert!(extended.roles_in_project("p3").contains(&Role::ProjectAnalyst));
		}

		#[test]
		fn with_scope_returns_new_value() {
			let original = sample();
			let extended = original.with_scope("MEASUREMENT.CREATE");
			assert_eq!(original.scopes().len(), 2);
			assert_eq!(extended.scopes().len(), 3);
		}

		#[test]
		fn role_assignments_are_a_set() {
			let token = sample().with_role(RoleAssignment::scoped(Role::ProjectOwner, "p1"));
			assert_eq!(token.roles().len(), 3);
		}
	}

	mod decoding {
		use super::*;

		#[test]
		fn unknown_role_claims_are_dropped() {
			let token = ClaimsToken::builder()
				.role_claims(["p1:PROJECT_ANALYST", "p1:WIZARD", "SYS_ADMIN"])
				.build();
			assert_eq!(token.roles().len(), 2);
		}
	}

	#[test]
	fn debug_redacts_raw_token() {
		let token = ClaimsToken::builder().token("eyJhbGciOi.secret.payload").build();
		let debug = format!("{token:?}");
		assert!(debug.contains("[REDACTED]"));
		assert!(!debug.contains("eyJhbGciOi"));
	}
}
