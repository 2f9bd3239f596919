// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The permission matrix: which roles hold which permission.
//!
//! Built once from a fixed rule table. Rules only add roles. The audit,
//! authority and user entities are never blanket-readable.

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use crate::permission::{Entity, Operation, Permission};
use crate::role::Role;

static EMPTY: BTreeSet<Role> = BTreeSet::new();

/// Immutable mapping from permission to the roles that hold it.
#[derive(Debug, Clone)]
pub struct PermissionMatrix {
	allowed: HashMap<Permission, BTreeSet<Role>>,
}

impl PermissionMatrix {
	/// Builds the matrix by applying the rule table in order.
	pub fn build() -> Self {
		let mut matrix = Self {
			allowed: HashMap::new(),
		};
		let all = Permission::all();

		// 1. System administrators hold everything.
		matrix.grant(all.iter().copied(), Role::SysAdmin);

		// 2. Project administrators hold everything except creating projects.
		matrix.grant(
			all.iter().copied().filter(|p| *p != Permission::PROJECT_CREATE),
			Role::ProjectAdmin,
		);

		// 3-4. Project owners.
		matrix.grant(of_entity(Entity::Subject), Role::ProjectOwner);
		matrix.grant(broad_reads(), Role::ProjectOwner);

		// 5-6. Project affiliates.
		matrix.grant(
			[
				Permission::SUBJECT_CREATE,
				Permission::SUBJECT_READ,
				Permission::SUBJECT_UPDATE,
			],
			Role::ProjectAffiliate,
		);
		matrix.grant(broad_reads(), Role::ProjectAffiliate);

		// 7. Project analysts.
		matrix.grant(broad_reads(), Role::ProjectAnalyst);
		matrix.grant([Permission::SOURCE_UPDATE], Role::ProjectAnalyst);

		// 8. Participants.
		matrix.grant(
			[
				Permission::SUBJECT_READ,
				Permission::SUBJECT_UPDATE,
				Permission::MEASUREMENT_CREATE,
				Permission::MEASUREMENT_READ,
			],
			Role::Participant,
		);

		// 9. Inactive participants and organization admins receive nothing.

		matrix
	}

	/// The process-wide matrix, built on first use.
	pub fn global() -> &'static PermissionMatrix {
		static MATRIX: OnceLock<PermissionMatrix> = OnceLock::new();
		MATRIX.get_or_init(PermissionMatrix::build)
	}

	/// Roles allowed the permission. Empty if none were granted.
	pub fn allowed_roles(&self, permission: Permission) -> &BTreeSet<Role> {
		self.allowed.get(&permission).unwrap_or(&EMPTY)
	}

	pub fn is_role_allowed(&self, permission: Permission, role: Role) -> bool {
		self.allowed_roles(permission).contains(&role)
	}

	/// Every permission the role holds, in catalog order.
	pub fn permissions_of(&self, role: Role) -> Vec<Permission> {
		Permission::all()
			.iter()
			.copied()
			.filter(|p| self.is_role_allowed(*p, role))
			.collect()
	}

	fn grant(&mut self, permissions: impl IntoIterator<Item = Permission>, role: Role) {
		for permission in permissions {
			self.allowed.entry(permission).or_default().insert(role);
		}
	}
}

impl Default for PermissionMatrix {
	fn default() -> Self {
		Self::build()
	}
}

/// Looks up allowed roles in the process-wide matrix.
pub fn allowed_roles(permission: Permission) -> &'static BTreeSet<Role> {
	PermissionMatrix::global().allowed_roles(permission)
}

/// Membership test against the process-wide matrix.
pub fn is_role_allowed(permission: Permission, role: Role) -> bool {
	PermissionMatrix::global().is_role_allowed(permission, role)
}

fn of_entity(entity: Entity) -> impl Iterator<Item = Permission> {
	Operation::all().iter().map(move |op| Permission::of(entity, *op))
}

fn broad_reads() -> impl Iterator<Item = Permission> {
	Entity::all()
		.iter()
		.filter(|e| !matches!(e, Entity::Audit | Entity::Authority | Entity::User))
		.map(|e| Permission::of(*e, Operation::Read))
}
