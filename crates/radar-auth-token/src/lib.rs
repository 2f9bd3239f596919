// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Token codec for RADAR bearer tokens.
//!
//! This crate provides:
//! - [`TokenCodec`] to sign claim sets and verify presented tokens against
//!   every known key, in order
//! - [`enhance`] to narrow requested scopes to what a subject's roles allow
//! - [`TokenIssuer`] for the grant flow, including refresh and audit
//! - [`ApprovalStore`] for refresh-token approval checks

pub mod approval;
pub mod audit;
pub mod claims;
pub mod codec;
pub mod enhance;
pub mod error;
pub mod grant;

pub use approval::{ApprovalStore, MemoryApprovalStore};
pub use audit::{AuditSink, MemoryAuditSink, TokenGrantEvent, TracingAuditSink, TOKEN_GRANT_ACTION};
pub use claims::{JwtClaims, JWT_TOKEN_TYPE};
pub use codec::TokenCodec;
pub use enhance::{enhance, grantable_scopes, SubjectProfile};
pub use error::{AuditSinkError, TokenError};
pub use grant::{GrantRequest, GrantedTokens, TokenIssuer, BEARER_TOKEN_TYPE, REFRESH_TOKEN_GRANT};
