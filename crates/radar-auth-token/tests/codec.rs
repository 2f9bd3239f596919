// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod common;

use chrono::{Duration, SubsecRound, Utc};
use radar_auth::{ClaimsToken, Role, RoleAssignment};
use radar_auth_keys::SharedKeyMaterial;
use radar_auth_token::{MemoryApprovalStore, TokenCodec, TokenError, JWT_TOKEN_TYPE};
use serde_json::json;

use common::{codec, manager, manager_with_leeway, AUDIENCE};

fn access_token(expires_in: Duration) -> ClaimsToken {
	let now = Utc::now().trunc_subsecs(0);
	ClaimsToken::builder()
		.subject("sub-1")
		.username("alice")
		.role(RoleAssignment::scoped(Role::ProjectAnalyst, "proj-42"))
		.role(RoleAssignment::scoped(Role::OrganizationAdmin, "org-1"))
		.authorities(["ROLE_SYS_ADMIN"])
		.scopes(["SUBJECT.READ", "MEASUREMENT.READ"])
		.sources(["src-1", "src-2"])
		.grant_type("authorization_code")
		.audience([AUDIENCE])
		.issuer("radar-auth")
		.issued_at(now)
		.expires_at(now + expires_in)
		.client_id("aRMT")
		.token_id("jti-1")
		.build()
}

mod round_trip {
	use super::*;

	#[test]
	fn access_token_claims_are_recovered() {
		let codec = codec("selfsigned", &[]);
		let original = access_token(Duration::minutes(15));

		let encoded = codec.encode(&original).unwrap();
		let decoded = codec.decode(&encoded).unwrap();

		assert_eq!(decoded.subject(), original.subject());
		assert_eq!(decoded.username(), original.username());
		assert_eq!(decoded.roles(), original.roles());
		assert_eq!(decoded.authorities(), original.authorities());
		assert_eq!(decoded.scopes(), original.scopes());
		assert_eq!(decoded.sources(), original.sources());
		assert_eq!(decoded.grant_type(), original.grant_type());
		assert_eq!(decoded.audience(), original.audience());
		assert_eq!(decoded.issuer(), original.issuer());
		assert_eq!(decoded.issued_at(), original.issued_at());
		assert_eq!(decoded.expires_at(), original.expires_at());
		assert_eq!(decoded.client_id(), original.client_id());
		assert_eq!(decoded.token_id(), original.token_id());
		assert_eq!(decoded.token(), Some(encoded.as_str()));
		assert_eq!(decoded.token_type(), Some(JWT_TOKEN_TYPE));
		assert!(!decoded.is_refresh_token());
	}

	#[test]
	fn ecdsa_signing_key_round_trips() {
		let codec = codec("ec-signing", &[]);
		let encoded = codec.encode(&access_token(Duration::minutes(15))).unwrap();
		let header = jsonwebtoken::decode_header(&encoded).unwrap();
		assert_eq!(header.alg, jsonwebtoken::Algorithm::ES256);
		assert_eq!(header.kid.as_deref(), Some("ec-signing"));
		assert!(codec.decode(&encoded).is_ok());
	}

	#[test]
	fn refresh_token_carries_access_token_id() {
		let codec = codec("selfsigned", &[]);
		let refresh = access_token(Duration::hours(24))
			.to_builder()
			.token_id("jti-2")
			.access_token_id("jti-1")
			.build();

		let decoded = codec.decode(&codec.encode(&refresh).unwrap()).unwrap();
		assert!(decoded.is_refresh_token());
		assert_eq!(decoded.access_token_id(), Some("jti-1"));
	}

	#[test]
	fn space_separated_scope_is_accepted() {
		let keys = manager("selfsigned", &[]);
		let exp = (Utc::now() + Duration::minutes(5)).timestamp();
		let token = keys
			.signer()
			.sign(&json!({
				"sub": "sub-1",
				"scope": "SUBJECT.READ PROJECT.READ",
				"aud": AUDIENCE,
				"roles": ["proj-1:PARTICIPANT"],
				"exp": exp,
			}))
			.unwrap();

		let decoded = TokenCodec::new(SharedKeyMaterial::new(keys)).decode(&token).unwrap();
		assert_eq!(decoded.scopes(), ["SUBJECT.READ", "PROJECT.READ"]);
		assert_eq!(decoded.audience(), [AUDIENCE]);
		assert_eq!(decoded.roles_in_project("proj-1").len(), 1);
	}
}

mod rotation {
	use super::*;

	#[test]
	fn token_from_demoted_key_still_decodes() {
		let old = codec("rotated", &[]);
		let token = old.encode(&access_token(Duration::minutes(15))).unwrap();

		let current = codec("selfsigned", &["rotated"]);
		let decoded = current.decode(&token).unwrap();
		assert_eq!(decoded.subject(), Some("sub-1"));
	}

	#[test]
	fn token_from_removed_key_is_rejected() {
		let token = codec("rotated", &[])
			.encode(&access_token(Duration::minutes(15)))
			.unwrap();

		let current = codec("selfsigned", &[]);
		assert!(matches!(current.decode(&token), Err(TokenError::SignatureRejected)));
	}

	#[test]
	fn mixed_algorithms_are_tried_in_order() {
		let token = codec("ec-signing", &[])
			.encode(&access_token(Duration::minutes(15)))
			.unwrap();

		let current = codec("selfsigned", &["rotated", "ec-signing"]);
		assert!(current.decode(&token).is_ok());
	}

	#[test]
	fn hot_swap_applies_to_existing_codec() {
		let keys = SharedKeyMaterial::new(manager("rotated", &[]));
		let codec = TokenCodec::new(keys.clone());
		let token = codec.encode(&access_token(Duration::minutes(15))).unwrap();

		keys.replace(manager("selfsigned", &["rotated"]));
		assert!(codec.decode(&token).is_ok());
		let reissued = codec.encode(&access_token(Duration::minutes(15))).unwrap();
		assert_eq!(
			jsonwebtoken::decode_header(&reissued).unwrap().kid.as_deref(),
			Some("selfsigned")
		);

		keys.replace(manager("selfsigned", &[]));
		assert!(matches!(codec.decode(&token), Err(TokenError::SignatureRejected)));
	}
}

mod rejection {
	use super::*;

	#[test]
	fn expired_token_is_distinguished() {
		let codec = codec("selfsigned", &[]);
		let token = codec.encode(&access_token(Duration::seconds(-120))).unwrap();
		assert!(matches!(codec.decode(&token), Err(TokenError::Expired)));
	}

	#[test]
	fn leeway_admits_recent_expiry() {
		let codec = TokenCodec::new(SharedKeyMaterial::new(manager_with_leeway("selfsigned", &[], 60)));
		let token = codec.encode(&access_token(Duration::seconds(-30))).unwrap();
		assert!(codec.decode(&token).is_ok());
	}

	#[test]
	fn access_token_for_other_resource_is_rejected() {
		let codec = codec("selfsigned", &[]);
		let foreign = ClaimsToken::builder()
			.subject("sub-1")
			.audience(["res_gateway"])
			.expires_at(Utc::now() + Duration::minutes(15))
			.build();

		let token = codec.encode(&foreign).unwrap();
		assert!(matches!(codec.decode(&token), Err(TokenError::AudienceRejected)));
	}

	#[test]
	fn refresh_token_ignores_audience() {
		let codec = codec("selfsigned", &[]);
		let refresh = ClaimsToken::builder()
			.subject("sub-1")
			.audience(["res_gateway"])
			.expires_at(Utc::now() + Duration::hours(1))
			.token_id("jti-2")
			.access_token_id("jti-1")
			.build();

		let decoded = codec.decode(&codec.encode(&refresh).unwrap()).unwrap();
		assert!(decoded.is_refresh_token());
	}

	#[test]
	fn refresh_token_is_not_accepted_as_bearer() {
		let codec = codec("selfsigned", &[]);
		let refresh = ClaimsToken::builder()
			.subject("sub-1")
			.username("alice")
			.scopes(["SUBJECT.DELETE"])
			.audience(["res_gateway"])
			.expires_at(Utc::now() + Duration::hours(24))
			.token_id("jti-2")
			.access_token_id("jti-1")
			.build();
		let token = codec.encode(&refresh).unwrap();

		let err = codec.read_access_token(&token).unwrap_err();
		assert!(matches!(err, TokenError::RefreshTokenPresented));
		assert_eq!(err.status_code(), 401);

		assert!(codec.decode(&token).unwrap().is_refresh_token());
	}

	#[test]
	fn access_token_is_read_as_bearer() {
		let codec = codec("selfsigned", &[]);
		let token = codec.encode(&access_token(Duration::minutes(15))).unwrap();
		let read = codec.read_access_token(&token).unwrap();
		assert_eq!(read.subject(), Some("sub-1"));
	}

	#[test]
	fn refresh_token_without_username_is_rejected() {
		let codec = codec("selfsigned", &[]);
		let refresh = ClaimsToken::builder()
			.subject("sub-1")
			.client_id("aRMT")
			.scopes(["SUBJECT.READ"])
			.audience([AUDIENCE])
			.expires_at(Utc::now() + Duration::hours(1))
			.token_id("jti-2")
			.access_token_id("jti-1")
			.build();
		let token = codec.encode(&refresh).unwrap();

		let err = codec
			.read_refresh_token(&token, &MemoryApprovalStore::new())
			.unwrap_err();
		assert!(matches!(err, TokenError::ApprovalRevoked { ref client_id } if client_id == "aRMT"));
	}

	#[test]
	fn tampered_payload_is_rejected() {
		let codec = codec("selfsigned", &[]);
		let token = codec.encode(&access_token(Duration::minutes(15))).unwrap();
		let other = codec
			.encode(&access_token(Duration::minutes(15)).with_scope("PROJECT.DELETE"))
			.unwrap();

		let parts: Vec<&str> = token.split('.').collect();
		let other_parts: Vec<&str> = other.split('.').collect();
		let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

		assert!(matches!(codec.decode(&forged), Err(TokenError::SignatureRejected)));
	}

	#[test]
	fn garbage_is_malformed() {
		let codec = codec("selfsigned", &[]);
		assert!(matches!(codec.decode("not-a-token"), Err(TokenError::Malformed(_))));
		assert_eq!(codec.decode("a.b").unwrap_err().status_code(), 401);
	}

	#[test]
	fn encoding_without_expiry_fails() {
		let codec = codec("selfsigned", &[]);
		let token = ClaimsToken::builder().subject("sub-1").build();
		assert!(matches!(codec.encode(&token), Err(TokenError::MissingClaim("exp"))));
	}
}
