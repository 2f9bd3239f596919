// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization resolver.
//!
//! Pure predicates over a [`ClaimsToken`]. Each predicate first requires the
//! permission's scope string to be present in the token, then looks for a
//! grant at the requested level:
//!
//! ```text
//! has_scope
//!     │
//!     ├── client credentials      → granted
//!     ├── global authority        → granted
//!     └── level-specific check:
//!         ├── Global        any assignment, any referent
//!         ├── Organization  organization-tier assignment for the org
//!         ├── Project       project-tier assignment for the project
//!         ├── Subject       self-only if the project role set is {PARTICIPANT},
//!         │                 otherwise the project check
//!         └── Source        subject check and source bound to the token
//! ```
//!
//! The `check*` variants return [`AuthorizationDenied`] instead of `false`.

use tracing::{debug, instrument};

use crate::error::{AuthorizationDenied, ScopeLevel};
use crate::matrix::is_role_allowed;
use crate::permission::Permission;
use crate::role::Role;
use crate::token::ClaimsToken;

/// The resource chain a permission is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
	Global,
	Organization(&'a str),
	Project(&'a str),
	OrganizationAndProject {
		organization: &'a str,
		project: &'a str,
	},
	Subject {
		project: &'a str,
		subject: &'a str,
	},
	Source {
		project: &'a str,
		subject: &'a str,
		source: &'a str,
	},
}

impl Target<'_> {
	pub fn level(&self) -> ScopeLevel {
		match self {
			Target::Global => ScopeLevel::Global,
			Target::Organization(_) => ScopeLevel::Organization,
			Target::Project(_) | Target::OrganizationAndProject { .. } => ScopeLevel::Project,
			Target::Subject { .. } => ScopeLevel::Subject,
			Target::Source { .. } => ScopeLevel::Source,
		}
	}

	/// The most specific identifier in the chain.
	pub fn referent(&self) -> Option<&str> {
		match self {
			Target::Global => None,
			Target::Organization(org) => Some(org),
			Target::Project(project) | Target::OrganizationAndProject { project, .. } => Some(project),
			Target::Subject { subject, .. } => Some(subject),
			Target::Source { source, .. } => Some(source),
		}
	}
}

// =============================================================================
// Predicates
// =============================================================================

/// The coarse OAuth scope gate.
pub fn has_scope(token: &ClaimsToken, permission: Permission) -> bool {
	let scope = permission.scope_name();
	token.scopes().iter().any(|s| *s == scope)
}

pub fn is_client_credentials(token: &ClaimsToken) -> bool {
	token.is_client_credentials()
}

/// True if a global-tier role held by the token is allowed the permission.
pub fn has_global_authority(token: &ClaimsToken, permission: Permission) -> bool {
	token
		.global_roles()
		.into_iter()
		.any(|role| is_role_allowed(permission, role))
}

/// Permission regardless of referent.
pub fn has_permission(token: &ClaimsToken, permission: Permission) -> bool {
	has_scope(token, permission)
		&& (token.is_client_credentials()
			|| has_global_authority(token, permission)
			|| token
				.assignments()
				.any(|a| is_role_allowed(permission, a.role())))
}

pub fn has_permission_on_organization(
	token: &ClaimsToken,
	permission: Permission,
	organization: &str,
) -> bool {
	has_scope(token, permission)
		&& (token.is_client_credentials()
			|| has_global_authority(token, permission)
			|| any_allowed(token.roles_in_organization(organization), permission))
}

pub fn has_permission_on_project(token: &ClaimsToken, permission: Permission, project: &str) -> bool {
	has_scope(token, permission)
		&& (token.is_client_credentials()
			|| has_global_authority(token, permission)
			|| any_allowed(token.roles_in_project(project), permission))
}

/// Granted by a matching organization-tier or project-tier assignment.
pub fn has_permission_on_organization_and_project(
	token: &ClaimsToken,
	permission: Permission,
	organization: &str,
	project: &str,
) -> bool {
	has_scope(token, permission)
		&& (token.is_client_credentials()
			|| has_global_authority(token, permission)
			|| any_allowed(token.roles_in_organization(organization), permission)
			|| any_allowed(token.roles_in_project(project), permission))
}

/// Subject-level check.
///
/// When the token's only role in `project` is [`Role::Participant`], access is
/// limited to the token's own subject. Any other role set falls back to the
/// project check, so non-personal roles see every subject in the project.
pub fn has_permission_on_subject(
	token: &ClaimsToken,
	permission: Permission,
	project: &str,
	subject: &str,
) -> bool {
	if !has_scope(token, permission) {
		return false;
	}
	if token.is_client_credentials() || has_global_authority(token, permission) {
		return true;
	}
	let roles = token.roles_in_project(project);
	if roles.len() == 1 && roles.contains(&Role::Participant) {
		return token.subject() == Some(subject) && is_role_allowed(permission, Role::Participant);
	}
	has_permission_on_project(token, permission, project)
}

/// Subject check plus the source being bound to the token.
pub fn has_permission_on_source(
	token: &ClaimsToken,
	permission: Permission,
	project: &str,
	subject: &str,
	source: &str,
) -> bool {
	has_permission_on_subject(token, permission, project, subject)
		&& token.sources().iter().any(|s| s == source)
}

/// Evaluates the predicate matching the target.
pub fn is_granted(token: &ClaimsToken, permission: Permission, target: Target<'_>) -> bool {
	match target {
		Target::Global => has_permission(token, permission),
		Target::Organization(organization) => {
			has_permission_on_organization(token, permission, organization)
		}
		Target::Project(project) => has_permission_on_project(token, permission, project),
		Target::OrganizationAndProject {
			organization,
			project,
		} => has_permission_on_organization_and_project(token, permission, organization, project),
		Target::Subject { project, subject } => {
			has_permission_on_subject(token, permission, project, subject)
		}
		Target::Source {
			project,
			subject,
			source,
		} => has_permission_on_source(token, permission, project, subject, source),
	}
}

// =============================================================================
// Checks
// =============================================================================

/// Like [`is_granted`], returning the failed target on denial.
#[instrument(
	level = "debug",
	skip(token),
	fields(permission = %permission, level = %target.level(), referent = ?target.referent())
)]
pub fn check(
	token: &ClaimsToken,
	permission: Permission,
	target: Target<'_>,
) -> Result<(), AuthorizationDenied> {
	if is_granted(token, permission, target) {
		debug!("Permission granted");
		Ok(())
	} else {
		debug!(subject = ?token.subject(), "Permission denied");
		Err(AuthorizationDenied {
			permission,
			level: target.level(),
			referent: target.referent().map(str::to_string),
		})
	}
}

pub fn check_permission(token: &ClaimsToken, permission: Permission) -> Result<(), AuthorizationDenied> {
	check(token, permission, Target::Global)
}

pub fn check_permission_on_organization(
	token: &ClaimsToken,
	permission: Permission,
	organization: &str,
) -> Result<(), AuthorizationDenied> {
	check(token, permission, Target::Organization(organization))
}

pub fn check_permission_on_project(
	token: &ClaimsToken,
	permission: Permission,
	project: &str,
) -> Result<(), AuthorizationDenied> {
	check(token, permission, Target::Project(project))
}

pub fn check_permission_on_subject(
	token: &ClaimsToken,
	permission: Permission,
	project: &str,
	subject: &str,
) -> Result<(), AuthorizationDenied> {
	check(token, permission, Target::Subject { project, subject })
}

pub fn check_permission_on_source(
	token: &ClaimsToken,
	permission: Permission,
	project: &str,
	subject: &str,
	source: &str,
) -> Result<(), AuthorizationDenied> {
	check(
		token,
		permission,
		Target::Source {
			project,
			subject,
			source,
		},
	)
}

fn any_allowed(roles: impl IntoIterator<Item = Role>, permission: Permission) -> bool {
	roles.into_iter().any(|role| is_role_allowed(permission, role))
}
