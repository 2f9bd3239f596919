// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Token codec error types.

use radar_auth_keys::KeyError;
use thiserror::Error;

/// Errors from encoding, decoding and granting tokens.
#[derive(Debug, Error)]
pub enum TokenError {
	// ========================================================================
	// Presented tokens (rejected at the boundary)
	// ========================================================================
	/// The token is not a structurally valid JWT with the expected claims.
	#[error("malformed token: {0}")]
	Malformed(String),

	/// No known verification key accepted the signature.
	#[error("token signature rejected by every verification key")]
	SignatureRejected,

	/// The signature is valid but the token was minted for another audience.
	#[error("token audience rejected")]
	AudienceRejected,

	/// The signature is valid but the token has expired.
	#[error("token expired")]
	Expired,

	/// The user no longer approves every scope of this refresh token.
	#[error("approval revoked for client {client_id}")]
	ApprovalRevoked { client_id: String },

	/// A refresh token was expected but an access token was presented.
	#[error("not a refresh token")]
	NotRefreshToken,

	/// An access token was expected but a refresh token was presented.
	#[error("refresh token presented as an access token")]
	RefreshTokenPresented,

	#[error("invalid claim {claim}: {message}")]
	InvalidClaim { claim: &'static str, message: String },

	// ========================================================================
	// Issuance
	// ========================================================================
	#[error("missing claim: {0}")]
	MissingClaim(&'static str),

	#[error("invalid grant: {0}")]
	InvalidGrant(String),

	#[error("token signing failed: {0}")]
	Signing(#[source] jsonwebtoken::errors::Error),

	#[error(transparent)]
	Key(#[from] KeyError),
}

impl TokenError {
	pub fn status_code(&self) -> u16 {
		match self {
			TokenError::Malformed(_)
			| TokenError::SignatureRejected
			| TokenError::AudienceRejected
			| TokenError::Expired
			| TokenError::ApprovalRevoked { .. }
			| TokenError::NotRefreshToken
			| TokenError::RefreshTokenPresented
			| TokenError::InvalidClaim { .. } => 401,
			TokenError::InvalidGrant(_) => 400,
			TokenError::MissingClaim(_) | TokenError::Signing(_) | TokenError::Key(_) => 500,
		}
	}
}

/// Errors from an audit sink. Never propagated to the grant caller.
#[derive(Debug, Error)]
pub enum AuditSinkError {
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}
