// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission catalog.
//!
//! A [`Permission`] is an `(Entity, Operation)` pair. The catalog is the full
//! cross-product of the closed [`Entity`] and [`Operation`] sets, so
//! [`Permission::of`] is total. Every permission has a stable scope name of the
//! form `ENTITY.OPERATION` (for example `SUBJECT.READ`) which is used verbatim as
//! an OAuth scope string and as a claim value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

// =============================================================================
// Entities
// =============================================================================

/// Entity kinds that permissions apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Entity {
	SourceType,
	SourceData,
	Source,
	Subject,
	User,
	Role,
	Organization,
	Project,
	OAuthClients,
	Audit,
	Authority,
	Measurement,
}

impl Entity {
	/// Returns all entity kinds in catalog order.
	pub fn all() -> &'static [Entity] {
		&[
			Entity::SourceType,
			Entity::SourceData,
			Entity::Source,
			Entity::Subject,
			Entity::User,
			Entity::Role,
			Entity::Organization,
			Entity::Project,
			Entity::OAuthClients,
			Entity::Audit,
			Entity::Authority,
			Entity::Measurement,
		]
	}

	/// Canonical upper-case name used in scope strings.
	pub fn as_str(&self) -> &'static str {
		match self {
			Entity::SourceType => "SOURCETYPE",
			Entity::SourceData => "SOURCEDATA",
			Entity::Source => "SOURCE",
			Entity::Subject => "SUBJECT",
			Entity::User => "USER",
			Entity::Role => "ROLE",
			Entity::Organization => "ORGANIZATION",
			Entity::Project => "PROJECT",
			Entity::OAuthClients => "OAUTHCLIENTS",
			Entity::Audit => "AUDIT",
			Entity::Authority => "AUTHORITY",
			Entity::Measurement => "MEASUREMENT",
		}
	}
}

impl fmt::Display for Entity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Entity {
	type Err = AuthError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Entity::all()
			.iter()
			.copied()
			.find(|e| e.as_str() == s)
			.ok_or_else(|| AuthError::PermissionNotFound(s.to_string()))
	}
}

// =============================================================================
// Operations
// =============================================================================

/// Operations that can be performed on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
	Create,
	Read,
	Update,
	Delete,
}

impl Operation {
	/// Returns all operations in catalog order.
	pub fn all() -> &'static [Operation] {
		&[
			Operation::Create,
			Operation::Read,
			Operation::Update,
			Operation::Delete,
		]
	}

	/// Canonical upper-case name used in scope strings.
	pub fn as_str(&self) -> &'static str {
		match self {
			Operation::Create => "CREATE",
			Operation::Read => "READ",
			Operation::Update => "UPDATE",
			Operation::Delete => "DELETE",
		}
	}
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Operation {
	type Err = AuthError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Operation::all()
			.iter()
			.copied()
			.find(|o| o.as_str() == s)
			.ok_or_else(|| AuthError::PermissionNotFound(s.to_string()))
	}
}

// =============================================================================
// Permissions
// =============================================================================

/// A unit of grantable access: one operation on one entity kind.
///
/// Serializes as its scope name (`"SUBJECT.READ"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Permission {
	entity: Entity,
	operation: Operation,
}

macro_rules! permission_catalog {
	($($name:ident = $entity:ident . $operation:ident;)*) => {
		impl Permission {
			$(
				#[doc = concat!("`", stringify!($name), "`")]
				pub const $name: Permission = Permission::of(Entity::$entity, Operation::$operation);
			)*
		}

		static ALL_PERMISSIONS: &[Permission] = &[$(Permission::$name),*];
	};
}

permission_catalog! {
	SOURCETYPE_CREATE = SourceType.Create;
	SOURCETYPE_READ = SourceType.Read;
	SOURCETYPE_UPDATE = SourceType.Update;
	SOURCETYPE_DELETE = SourceType.Delete;
	SOURCEDATA_CREATE = SourceData.Create;
	SOURCEDATA_READ = SourceData.Read;
	SOURCEDATA_UPDATE = SourceData.Update;
	SOURCEDATA_DELETE = SourceData.Delete;
	SOURCE_CREATE = Source.Create;
	SOURCE_READ = Source.Read;
	SOURCE_UPDATE = Source.Update;
	SOURCE_DELETE = Source.Delete;
	SUBJECT_CREATE = Subject.Create;
	SUBJECT_READ = Subject.Read;
	SUBJECT_UPDATE = Subject.Update;
	SUBJECT_DELETE = Subject.Delete;
	USER_CREATE = User.Create;
	USER_READ = User.Read;
	USER_UPDATE = User.Update;
	USER_DELETE = User.Delete;
	ROLE_CREATE = Role.Create;
	ROLE_READ = Role.Read;
	ROLE_UPDATE = Role.Update;
	ROLE_DELETE = Role.Delete;
	ORGANIZATION_CREATE = Organization.Create;
	ORGANIZATION_READ = Organization.Read;
	ORGANIZATION_UPDATE = Organization.Update;
	ORGANIZATION_DELETE = Organization.Delete;
	PROJECT_CREATE = Project.Create;
	PROJECT_READ = Project.Read;
	PROJECT_UPDATE = Project.Update;
	PROJECT_DELETE = Project.Delete;
	OAUTHCLIENTS_CREATE = OAuthClients.Create;
	OAUTHCLIENTS_READ = OAuthClients.Read;
	OAUTHCLIENTS_UPDATE = OAuthClients.Update;
	OAUTHCLIENTS_DELETE = OAuthClients.Delete;
	AUDIT_CREATE = Audit.Create;
	AUDIT_READ = Audit.Read;
	AUDIT_UPDATE = Audit.Update;
	AUDIT_DELETE = Audit.Delete;
	AUTHORITY_CREATE = Authority.Create;
	AUTHORITY_READ = Authority.Read;
	AUTHORITY_UPDATE = Authority.Update;
	AUTHORITY_DELETE = Authority.Delete;
	MEASUREMENT_CREATE = Measurement.Create;
	MEASUREMENT_READ = Measurement.Read;
	MEASUREMENT_UPDATE = Measurement.Update;
	MEASUREMENT_DELETE = Measurement.Delete;
}

impl Permission {
	/// Returns the permission for an entity and operation.
	///
	/// The catalog covers the full entity × operation cross-product, so this
	/// never fails.
	pub const fn of(entity: Entity, operation: Operation) -> Self {
		Self { entity, operation }
	}

	/// Looks up a permission by canonical entity and operation names.
	pub fn lookup(entity: &str, operation: &str) -> Result<Self, AuthError> {
		let not_found = || AuthError::PermissionNotFound(format!("{entity}.{operation}"));
		let entity = entity.parse::<Entity>().map_err(|_| not_found())?;
		let operation = operation.parse::<Operation>().map_err(|_| not_found())?;
		Ok(Self::of(entity, operation))
	}

	/// Parses a scope string (`ENTITY.OPERATION`, case-sensitive).
	pub fn from_scope(scope: &str) -> Result<Self, AuthError> {
		let (entity, operation) = scope
			.split_once('.')
			.ok_or_else(|| AuthError::PermissionNotFound(scope.to_string()))?;
		Self::lookup(entity, operation)
	}

	/// Returns every permission in the catalog, in stable entity-then-operation order.
	pub fn all() -> &'static [Permission] {
		ALL_PERMISSIONS
	}

	/// Iterates the scope names of every permission in the catalog.
	pub fn scopes() -> impl Iterator<Item = String> {
		ALL_PERMISSIONS.iter().map(Permission::scope_name)
	}

	pub fn entity(&self) -> Entity {
		self.entity
	}

	pub fn operation(&self) -> Operation {
		self.operation
	}

	/// The OAuth scope name for this permission, e.g. `MEASUREMENT.CREATE`.
	pub fn scope_name(&self) -> String {
		format!("{}.{}", self.entity, self.operation)
	}
}

impl fmt::Display for Permission {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.entity, self.operation)
	}
}

impl FromStr for Permission {
	type Err = AuthError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_scope(s)
	}
}

impl From<Permission> for String {
	fn from(permission: Permission) -> Self {
		permission.scope_name()
	}
}

impl TryFrom<String> for Permission {
	type Error = AuthError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::from_scope(&value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use std::collections::HashSet;

	#[test]
	fn catalog_is_full_cross_product() {
		assert_eq!(
			Permission::all().len(),
			Entity::all().len() * Operation::all().len()
		);
		let unique: HashSet<_> = Permission::all().iter().collect();
		assert_eq!(unique.len(), Permission::all().len());
	}

	#[test]
	fn catalog_order_is_entity_then_operation() {
		let expected: Vec<Permission> = Entity::all()
			.iter()
			.flat_map(|e| Operation::all().iter().map(move |o| Permission::of(*e, *o)))
			.collect();
		assert_eq!(Permission::all(), expected.as_slice());
	}

	#[test]
	fn scope_name_uses_canonical_names() {
		assert_eq!(Permission::SUBJECT_READ.scope_name(), "SUBJECT.READ");
		assert_eq!(Permission::OAUTHCLIENTS_DELETE.scope_name(), "OAUTHCLIENTS.DELETE");
		assert_eq!(Permission::SOURCETYPE_CREATE.to_string(), "SOURCETYPE.CREATE");
	}

	#[test]
	fn from_scope_is_case_sensitive() {
		assert_eq!(
			Permission::from_scope("MEASUREMENT.CREATE").unwrap(),
			Permission::MEASUREMENT_CREATE
		);
		assert!(matches!(
			Permission::from_scope("measurement.create"),
			Err(AuthError::PermissionNotFound(_))
		));
	}

	#[test]
	fn from_scope_rejects_garbage() {
		for scope in ["", "SUBJECT", "SUBJECT.", ".READ", "SUBJECT.READ.EXTRA", "openid"] {
			assert!(Permission::from_scope(scope).is_err(), "accepted {scope:?}");
		}
	}

	#[test]
	fn lookup_reports_full_pair() {
		let err = Permission::lookup("PROJECT", "ARCHIVE").unwrap_err();
		assert_eq!(err.to_string(), "permission not found: PROJECT.ARCHIVE");
	}

	#[test]
	fn serializes_as_scope_string() {
		let json = serde_json::to_string(&Permission::SOURCE_UPDATE).unwrap();
		assert_eq!(json, "\"SOURCE.UPDATE\"");
		let back: Permission = serde_json::from_str(&json).unwrap();
		assert_eq!(back, Permission::SOURCE_UPDATE);
	}

	proptest! {
		#[test]
		fn scope_name_parses_back(index in 0usize..48) {
			let permission = Permission::all()[index];
			prop_assert_eq!(Permission::from_scope(&permission.scope_name()).unwrap(), permission);
		}
	}
}
