// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire claim set of a signed token.

use chrono::{DateTime, Utc};
use radar_auth::ClaimsToken;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TokenError;

/// Token type recorded on decoded tokens.
pub const JWT_TOKEN_TYPE: &str = "jwt";

/// JWT claims as signed and verified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sub: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user_name: Option<String>,
	/// Array on the wire; a space-separated string is accepted on decode.
	#[serde(default, deserialize_with = "space_separated_or_seq")]
	pub scope: Vec<String>,
	#[serde(default)]
	pub authorities: Vec<String>,
	#[serde(default)]
	pub roles: Vec<String>,
	#[serde(default)]
	pub sources: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub grant_type: Option<String>,
	#[serde(default, deserialize_with = "single_or_seq")]
	pub aud: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iss: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iat: Option<i64>,
	pub exp: i64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub jti: Option<String>,
	/// Present only on refresh tokens: the `jti` of the paired access token.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ati: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_id: Option<String>,
}

impl JwtClaims {
	/// Claim set for `token`. The token must carry an expiry.
	pub fn from_token(token: &ClaimsToken) -> Result<Self, TokenError> {
		let exp = token.expires_at().ok_or(TokenError::MissingClaim("exp"))?;
		Ok(Self {
			sub: token.subject().map(str::to_string),
			user_name: token.username().map(str::to_string),
			scope: token.scopes().to_vec(),
			authorities: token.authorities().to_vec(),
			roles: token.roles().iter().map(|r| r.to_claim()).collect(),
			sources: token.sources().to_vec(),
			grant_type: token.grant_type().map(str::to_string),
			aud: token.audience().to_vec(),
			iss: token.issuer().map(str::to_string),
			iat: token.issued_at().map(|t| t.timestamp()),
			exp: exp.timestamp(),
			jti: token.token_id().map(str::to_string),
			ati: token.access_token_id().map(str::to_string),
			client_id: token.client_id().map(str::to_string),
		})
	}

	/// Builds a [`ClaimsToken`] carrying `raw` as its token string.
	///
	/// Role claims naming unknown roles are dropped.
	pub fn into_token(self, raw: &str) -> Result<ClaimsToken, TokenError> {
		let mut builder = ClaimsToken::builder()
			.role_claims(&self.roles)
			.authorities(self.authorities)
			.scopes(self.scope)
			.sources(self.sources)
			.audience(self.aud)
			.expires_at(timestamp("exp", self.exp)?)
			.token(raw)
			.token_type(JWT_TOKEN_TYPE);

		if let Some(sub) = self.sub {
			builder = builder.subject(sub);
		}
		if let Some(user_name) = self.user_name {
			builder = builder.username(user_name);
		}
		if let Some(grant_type) = self.grant_type {
			builder = builder.grant_type(grant_type);
		}
		if let Some(iss) = self.iss {
			builder = builder.issuer(iss);
		}
		if let Some(iat) = self.iat {
			builder = builder.issued_at(timestamp("iat", iat)?);
		}
		if let Some(jti) = self.jti {
			builder = builder.token_id(jti);
		}
		if let Some(ati) = self.ati {
			builder = builder.access_token_id(ati);
		}
		if let Some(client_id) = self.client_id {
			builder = builder.client_id(client_id);
		}
		Ok(builder.build())
	}
}

fn timestamp(claim: &'static str, secs: i64) -> Result<DateTime<Utc>, TokenError> {
	DateTime::from_timestamp(secs, 0).ok_or_else(|| TokenError::InvalidClaim {
		claim,
		message: format!("{secs} is out of range"),
	})
}

fn space_separated_or_seq<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
	deserializer.deserialize_any(StringsVisitor { split: true })
}

fn single_or_seq<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
	deserializer.deserialize_any(StringsVisitor { split: false })
}

struct StringsVisitor {
	split: bool,
}

impl<'de> Visitor<'de> for StringsVisitor {
	type Value = Vec<String>;

	fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str("a string or an array of strings")
	}

	fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
		if self.split {
			Ok(value.split_whitespace().map(str::to_string).collect())
		} else {
			Ok(vec![value.to_string()])
		}
	}

	fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
		let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
		while let Some(value) = seq.next_element::<String>()? {
			values.push(value);
		}
		Ok(values)
	}

	fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
		Ok(Vec::new())
	}
}
