// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role catalog and scoped role assignments.
//!
//! Every [`Role`] is bound to exactly one [`RoleTier`]. A [`RoleAssignment`]
//! attaches a role to a referent (an organization or project identifier) and
//! has a compact wire form:
//!
//! ```text
//! SYS_ADMIN                 global, no referent
//! proj-42:PROJECT_ANALYST   project-tier role in project "proj-42"
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Legacy prefix carried by authority names (`ROLE_SYS_ADMIN`).
pub const AUTHORITY_PREFIX: &str = "ROLE_";

// =============================================================================
// Tiers
// =============================================================================

/// The level at which a role assignment applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleTier {
	Global,
	Organization,
	Project,
}

impl fmt::Display for RoleTier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RoleTier::Global => write!(f, "global"),
			RoleTier::Organization => write!(f, "organization"),
			RoleTier::Project => write!(f, "project"),
		}
	}
}

// =============================================================================
// Roles
// =============================================================================

/// The closed role catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
	/// Platform administrator. Holds every permission.
	SysAdmin,
	/// Administers one organization.
	OrganizationAdmin,
	/// Administers one project.
	ProjectAdmin,
	ProjectOwner,
	ProjectAffiliate,
	ProjectAnalyst,
	/// Data subject enrolled in a project. Personal.
	Participant,
	/// Former participant. Personal, holds nothing.
	InactiveParticipant,
}

impl Role {
	/// Returns all roles in catalog order.
	pub fn all() -> &'static [Role] {
		&[
			Role::SysAdmin,
			Role::OrganizationAdmin,
			Role::ProjectAdmin,
			Role::ProjectOwner,
			Role::ProjectAffiliate,
			Role::ProjectAnalyst,
			Role::Participant,
			Role::InactiveParticipant,
		]
	}

	/// Canonical role name, without the authority prefix.
	pub fn name(&self) -> &'static str {
		match self {
			Role::SysAdmin => "SYS_ADMIN",
			Role::OrganizationAdmin => "ORGANIZATION_ADMIN",
			Role::ProjectAdmin => "PROJECT_ADMIN",
			Role::ProjectOwner => "PROJECT_OWNER",
			Role::ProjectAffiliate => "PROJECT_AFFILIATE",
			Role::ProjectAnalyst => "PROJECT_ANALYST",
			Role::Participant => "PARTICIPANT",
			Role::InactiveParticipant => "INACTIVE_PARTICIPANT",
		}
	}

	/// Legacy authority form (`ROLE_SYS_ADMIN`).
	pub fn authority(&self) -> String {
		format!("{AUTHORITY_PREFIX}{}", self.name())
	}

	pub fn tier(&self) -> RoleTier {
		match self {
			Role::SysAdmin => RoleTier::Global,
			Role::OrganizationAdmin => RoleTier::Organization,
			Role::ProjectAdmin
			| Role::ProjectOwner
			| Role::ProjectAffiliate
			| Role::ProjectAnalyst
			| Role::Participant
			| Role::InactiveParticipant => RoleTier::Project,
		}
	}

	/// Personal roles may only act on data where the holder is the data subject.
	pub fn is_personal(&self) -> bool {
		matches!(self, Role::Participant | Role::InactiveParticipant)
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for Role {
	type Err = AuthError;

	/// Accepts both `SYS_ADMIN` and `ROLE_SYS_ADMIN`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let name = s.strip_prefix(AUTHORITY_PREFIX).unwrap_or(s);
		Role::all()
			.iter()
			.copied()
			.find(|role| role.name() == name)
			.ok_or_else(|| AuthError::UnknownRole(s.to_string()))
	}
}

// =============================================================================
// Assignments
// =============================================================================

/// A role attached to an optional referent.
///
/// Global roles have no referent. Organization and project roles carry the
/// organization or project identifier they apply to. Serializes as the role
/// claim string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RoleAssignment {
	role: Role,
	referent: Option<String>,
}

impl RoleAssignment {
	/// A role with no referent.
	pub fn global(role: Role) -> Self {
		Self {
			role,
			referent: None,
		}
	}

	/// A role attached to an organization or project identifier.
	///
	/// An empty referent is normalized to none.
	pub fn scoped(role: Role, referent: impl Into<String>) -> Self {
		let referent = referent.into();
		Self {
			role,
			referent: (!referent.is_empty()).then_some(referent),
		}
	}

	pub fn role(&self) -> Role {
		self.role
	}

	pub fn referent(&self) -> Option<&str> {
		self.referent.as_deref()
	}

	/// Decodes a role claim.
	///
	/// The referent is everything before the last `:`. A missing or empty
	/// referent yields a bare role.
	pub fn parse_claim(claim: &str) -> Result<Self, AuthError> {
		match claim.rsplit_once(':') {
			Some((referent, role)) => {
				let role = role
					.parse::<Role>()
					.map_err(|_| AuthError::InvalidRoleClaim(claim.to_string()))?;
				Ok(Self::scoped(role, referent))
			}
			None => Ok(Self::global(claim.parse()?)),
		}
	}

	/// Encodes this assignment as a role claim.
	pub fn to_claim(&self) -> String {
		match &self.referent {
			Some(referent) => format!("{referent}:{}", self.role),
			None => self.role.name().to_string(),
		}
	}
}

impl fmt::Display for RoleAssignment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_claim())
	}
}

impl FromStr for RoleAssignment {
	type Err = AuthError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse_claim(s)
	}
}

impl From<RoleAssignment> for String {
	fn from(assignment: RoleAssignment) -> Self {
		assignment.to_claim()
	}
}

impl TryFrom<String> for RoleAssignment {
	type Error = AuthError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse_claim(&value)
	}
}
