// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role-based authorization for RADAR.
//!
//! This crate provides:
//! - The closed permission catalog (`ENTITY.OPERATION` pairs)
//! - The role catalog with global, organization and project tiers
//! - The permission matrix mapping each permission to the roles holding it
//! - [`ClaimsToken`], the immutable view of a bearer token's claims
//! - The resolver predicates deciding whether a token grants a permission at
//!   a given organization, project, subject or source
//!
//! Everything here is pure and synchronous. The matrix is built once and is
//! safe to read from any number of threads.
//!
//! # Example
//!
//! ```
//! use radar_auth::{has_permission_on_subject, ClaimsToken, Permission, Role, RoleAssignment};
//!
//! let token = ClaimsToken::builder()
//!     .subject("sub-1")
//!     .role(RoleAssignment::scoped(Role::Participant, "proj-1"))
//!     .scope("SUBJECT.READ")
//!     .build();
//!
//! assert!(has_permission_on_subject(&token, Permission::SUBJECT_READ, "proj-1", "sub-1"));
//! assert!(!has_permission_on_subject(&token, Permission::SUBJECT_READ, "proj-1", "sub-2"));
//! ```

pub mod error;
pub mod matrix;
pub mod permission;
pub mod resolver;
pub mod role;
pub mod token;

pub use error::{AuthError, AuthorizationDenied, ScopeLevel};
pub use matrix::{allowed_roles, is_role_allowed, PermissionMatrix};
pub use permission::{Entity, Operation, Permission};
pub use resolver::{
	check, check_permission, check_permission_on_organization, check_permission_on_project,
	check_permission_on_source, check_permission_on_subject, has_global_authority, has_permission,
	has_permission_on_organization, has_permission_on_organization_and_project,
	has_permission_on_project, has_permission_on_source, has_permission_on_subject, has_scope,
	is_client_credentials, is_granted, Target,
};
pub use role::{Role, RoleAssignment, RoleTier, AUTHORITY_PREFIX};
pub use token::{ClaimsToken, ClaimsTokenBuilder, CLIENT_CREDENTIALS};
