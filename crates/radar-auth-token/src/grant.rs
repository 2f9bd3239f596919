// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Token grants: the issuance path from a client request to signed tokens.

use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use radar_auth::{ClaimsToken, Permission, CLIENT_CREDENTIALS};
use radar_auth_config::TokenConfig;
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::approval::ApprovalStore;
use crate::audit::{AuditSink, TokenGrantEvent};
use crate::codec::TokenCodec;
use crate::enhance::{enhance, SubjectProfile};
use crate::error::TokenError;

pub const BEARER_TOKEN_TYPE: &str = "bearer";
pub const REFRESH_TOKEN_GRANT: &str = "refresh_token";

/// A client's request for tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantRequest {
	pub client_id: String,
	pub grant_type: String,
	/// Requested scopes. Narrowed to what the subject may use.
	pub scopes: Vec<String>,
}

/// Signed tokens returned by a successful grant.
#[derive(Clone, Serialize)]
pub struct GrantedTokens {
	pub access_token: String,
	/// Absent for client-credentials grants.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<String>,
	pub token_type: &'static str,
	pub expires_in: i64,
	#[serde(skip)]
	pub expires_at: DateTime<Utc>,
	pub scope: Vec<String>,
	pub jti: String,
}

impl std::fmt::Debug for GrantedTokens {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GrantedTokens")
			.field("access_token", &"[REDACTED]")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
			.field("token_type", &self.token_type)
			.field("expires_at", &self.expires_at)
			.field("scope", &self.scope)
			.field("jti", &self.jti)
			.finish()
	}
}

/// Mints access and refresh tokens and records one audit event per grant.
pub struct TokenIssuer {
	codec: TokenCodec,
	config: TokenConfig,
	audit: Arc<dyn AuditSink>,
}

impl TokenIssuer {
	pub fn new(codec: TokenCodec, config: TokenConfig, audit: Arc<dyn AuditSink>) -> Self {
		Self { codec, config, audit }
	}

	pub fn codec(&self) -> &TokenCodec {
		&self.codec
	}

	/// Grants tokens for `request`.
	///
	/// Personal grants need a `subject`; its roles narrow the requested
	/// scopes. Client-credentials grants must not name a subject. They get
	/// no refresh token and keep every requested scope that exists in the
	/// catalog.
	#[instrument(skip_all, fields(client_id = %request.client_id, grant_type = %request.grant_type))]
	pub fn grant(
		&self,
		request: &GrantRequest,
		subject: Option<&SubjectProfile>,
	) -> Result<GrantedTokens, TokenError> {
		let client_credentials = request.grant_type == CLIENT_CREDENTIALS;
		match (client_credentials, subject) {
			(false, None) => {
				return Err(TokenError::InvalidGrant(format!(
					"grant type {} requires a subject",
					request.grant_type
				)));
			}
			(true, Some(_)) => {
				return Err(TokenError::InvalidGrant(
					"client credentials grants carry no subject".to_string(),
				));
			}
			_ => {}
		}

		let now = Utc::now().trunc_subsecs(0);
		let expires_at = expiry(now, self.config.access_token_validity_secs)?;
		let jti = Uuid::new_v4().to_string();

		let requested = ClaimsToken::builder()
			.scopes(request.scopes.iter().cloned())
			.client_id(request.client_id.clone())
			.grant_type(request.grant_type.clone())
			.audience([self.config.resource_id.clone()])
			.issuer(self.config.issuer.clone())
			.issued_at(now)
			.expires_at(expires_at)
			.token_id(jti.clone())
			.build();

		let access = match subject {
			Some(profile) => enhance(&requested, profile),
			None => requested.with_scopes(
				request
					.scopes
					.iter()
					.filter(|s| Permission::from_scope(s).is_ok())
					.cloned(),
			),
		};

		let access_token = self.codec.encode(&access)?;
		let refresh_token = if client_credentials {
			None
		} else {
			let refresh = access
				.to_builder()
				.token_id(Uuid::new_v4().to_string())
				.access_token_id(jti.clone())
				.expires_at(expiry(now, self.config.refresh_token_validity_secs)?)
				.build();
			Some(self.codec.encode(&refresh)?)
		};

		let granted = GrantedTokens {
			access_token,
			refresh_token,
			token_type: BEARER_TOKEN_TYPE,
			expires_in: (expires_at - now).num_seconds(),
			expires_at,
			scope: access.scopes().to_vec(),
			jti,
		};

		self.publish(&access, &granted);
		info!(scopes = granted.scope.len(), "token granted");
		Ok(granted)
	}

	/// Exchanges a refresh token for new tokens, re-deriving scopes from the
	/// subject's current roles.
	#[instrument(skip_all)]
	pub fn refresh(
		&self,
		refresh_token: &str,
		approvals: &dyn ApprovalStore,
		subject: &SubjectProfile,
	) -> Result<GrantedTokens, TokenError> {
		let previous = self.codec.read_refresh_token(refresh_token, approvals)?;
		if previous.subject() != Some(subject.subject.as_str()) {
			return Err(TokenError::InvalidGrant(
				"refresh token was issued to another subject".to_string(),
			));
		}

		let request = GrantRequest {
			client_id: previous.client_id().unwrap_or_default().to_string(),
			grant_type: REFRESH_TOKEN_GRANT.to_string(),
			scopes: previous.scopes().to_vec(),
		};
		self.grant(&request, Some(subject))
	}

	fn publish(&self, access: &ClaimsToken, granted: &GrantedTokens) {
		let event = TokenGrantEvent::new(granted.token_type, granted.scope.clone(), granted.expires_at)
			.with_principal(access.username())
			.with_client_id(access.client_id())
			.with_grant_type(access.grant_type());
		if let Err(e) = self.audit.publish(&event) {
			warn!(sink = self.audit.name(), error = %e, "failed to publish audit event");
		}
	}
}

fn expiry(now: DateTime<Utc>, validity_secs: u64) -> Result<DateTime<Utc>, TokenError> {
	i64::try_from(validity_secs)
		.ok()
		.and_then(Duration::try_seconds)
		.and_then(|validity| now.checked_add_signed(validity))
		.ok_or_else(|| TokenError::InvalidClaim {
			claim: "exp",
			message: format!("validity of {validity_secs}s is out of range"),
		})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn expiry_adds_validity() {
		let now = Utc::now().trunc_subsecs(0);
		assert_eq!(expiry(now, 900).unwrap() - now, Duration::seconds(900));
	}

	#[test]
	fn absurd_validity_is_rejected() {
		assert!(matches!(
			expiry(Utc::now(), u64::MAX),
			Err(TokenError::InvalidClaim { claim: "exp", .. })
		));
	}

	#[test]
	fn granted_tokens_debug_is_redacted() {
		let granted = GrantedTokens {
			access_token: "secret-access".into(),
			refresh_token: Some("secret-refresh".into()),
			token_type: BEARER_TOKEN_TYPE,
			expires_in: 900,
			expires_at: Utc::now(),
			scope: vec![],
			jti: "j".into(),
		};
		let debug = format!("{granted:?}");
		assert!(!debug.contains("secret-access"));
		assert!(!debug.contains("secret-refresh"));

		let json = serde_json::to_value(&granted).unwrap();
		assert_eq!(json["token_type"], "bearer");
		assert!(json.get("expires_at").is_none());
	}
}
