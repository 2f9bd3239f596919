// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Token codec: sign claim sets and verify presented tokens.
//!
//! Decoding tries every known verification key in order and accepts the
//! first one that verifies the signature. Access tokens are checked against
//! the audience-bound verifiers; refresh tokens, recognised by their `ati`
//! claim, against the audience-free ones. Authorization goes through
//! [`TokenCodec::read_access_token`], which refuses refresh tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL, Engine};
use jsonwebtoken::errors::ErrorKind;
use radar_auth::ClaimsToken;
use radar_auth_keys::SharedKeyMaterial;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::approval::ApprovalStore;
use crate::claims::JwtClaims;
use crate::error::TokenError;

/// Minimal payload view used to pick the verifier list before verification.
#[derive(Deserialize)]
struct Routing {
	#[serde(default)]
	ati: Option<serde_json::Value>,
}

/// Signs and verifies tokens with the current key material.
#[derive(Debug, Clone)]
pub struct TokenCodec {
	keys: SharedKeyMaterial,
}

impl TokenCodec {
	pub fn new(keys: SharedKeyMaterial) -> Self {
		Self { keys }
	}

	pub fn keys(&self) -> &SharedKeyMaterial {
		&self.keys
	}

	/// Signs `token`'s claims with the current signing key.
	#[instrument(level = "debug", skip_all, fields(jti = token.token_id()))]
	pub fn encode(&self, token: &ClaimsToken) -> Result<String, TokenError> {
		let claims = JwtClaims::from_token(token)?;
		let keys = self.keys.current();
		keys.signer().sign(&claims).map_err(TokenError::Signing)
	}

	/// Verifies and decodes a presented token.
	#[instrument(level = "debug", skip_all)]
	pub fn decode(&self, token: &str) -> Result<ClaimsToken, TokenError> {
		let refresh = is_refresh_payload(token)?;
		let keys = self.keys.current();
		let verifiers = if refresh {
			keys.refresh_verifiers()
		} else {
			keys.access_verifiers()
		};

		let mut audience_rejected = false;
		for verifier in verifiers {
			match verifier.verify::<JwtClaims>(token) {
				Ok(data) => {
					debug!(alias = verifier.alias(), refresh, "token verified");
					return data.claims.into_token(token);
				}
				Err(e) => match e.kind() {
					ErrorKind::InvalidSignature
					| ErrorKind::InvalidAlgorithm
					| ErrorKind::InvalidKeyFormat
					| ErrorKind::InvalidEcdsaKey
					| ErrorKind::InvalidRsaKey(_) => {
						debug!(alias = verifier.alias(), error = %e, "verifier rejected token");
					}
					ErrorKind::InvalidAudience => {
						debug!(alias = verifier.alias(), "token audience rejected");
						audience_rejected = true;
					}
					ErrorKind::ExpiredSignature => return Err(TokenError::Expired),
					_ => return Err(TokenError::Malformed(e.to_string())),
				},
			}
		}

		if audience_rejected {
			Err(TokenError::AudienceRejected)
		} else {
			Err(TokenError::SignatureRejected)
		}
	}

	/// Decodes a bearer token for authorization.
	///
	/// Refresh tokens are verified without an audience, so they are never
	/// accepted here.
	#[instrument(level = "debug", skip_all)]
	pub fn read_access_token(&self, token: &str) -> Result<ClaimsToken, TokenError> {
		let claims = self.decode(token)?;
		if claims.is_refresh_token() {
			debug!(jti = claims.token_id(), "refresh token presented as bearer");
			return Err(TokenError::RefreshTokenPresented);
		}
		Ok(claims)
	}

	/// Decodes a refresh token and checks that the user still approves every
	/// scope it carries for its client. A refresh token with no username has
	/// no approval to check and is rejected.
	#[instrument(level = "debug", skip_all)]
	pub fn read_refresh_token(
		&self,
		token: &str,
		approvals: &dyn ApprovalStore,
	) -> Result<ClaimsToken, TokenError> {
		let claims = self.decode(token)?;
		if !claims.is_refresh_token() {
			return Err(TokenError::NotRefreshToken);
		}

		let client_id = claims.client_id().unwrap_or_default();
		let approved = claims
			.username()
			.is_some_and(|username| approvals.is_approved(username, client_id, claims.scopes()));
		if !approved {
			debug!(client_id, "refresh token approval revoked");
			return Err(TokenError::ApprovalRevoked {
				client_id: client_id.to_string(),
			});
		}
		Ok(claims)
	}
}

/// Reads the unverified payload to see whether an `ati` claim is present.
fn is_refresh_payload(token: &str) -> Result<bool, TokenError> {
	let mut parts = token.split('.');
	let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
		(Some(_), Some(payload), Some(_), None) => payload,
		_ => return Err(TokenError::Malformed("expected three segments".to_string())),
	};
	let bytes = BASE64URL
		.decode(payload)
		.map_err(|e| TokenError::Malformed(format!("payload is not base64url: {e}")))?;
	let routing: Routing = serde_json::from_slice(&bytes)
		.map_err(|e| TokenError::Malformed(format!("payload is not a JSON object: {e}")))?;
	Ok(routing.ati.is_some_and(|v| !v.is_null()))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn segment(json: &str) -> String {
		BASE64URL.encode(json)
	}

	#[test]
	fn routes_on_ati_presence() {
		let access = format!("{}.{}.sig", segment("{}"), segment(r#"{"jti":"a"}"#));
		let refresh = format!("{}.{}.sig", segment("{}"), segment(r#"{"ati":"a"}"#));
		let null_ati = format!("{}.{}.sig", segment("{}"), segment(r#"{"ati":null}"#));

		assert!(!is_refresh_payload(&access).unwrap());
		assert!(is_refresh_payload(&refresh).unwrap());
		assert!(!is_refresh_payload(&null_ati).unwrap());
	}

	#[test]
	fn wrong_segment_count_is_malformed() {
		assert!(matches!(is_refresh_payload("a.b"), Err(TokenError::Malformed(_))));
		assert!(matches!(is_refresh_payload("a.b.c.d"), Err(TokenError::Malformed(_))));
	}

	#[test]
	fn non_json_payload_is_malformed() {
		let token = format!("{}.{}.sig", segment("{}"), segment("not json"));
		assert!(matches!(is_refresh_payload(&token), Err(TokenError::Malformed(_))));
		assert!(matches!(is_refresh_payload("x.!!!.y"), Err(TokenError::Malformed(_))));
	}
}
