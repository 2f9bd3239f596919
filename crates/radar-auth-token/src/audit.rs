// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit events for token grants.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuditSinkError;

pub const TOKEN_GRANT_ACTION: &str = "token.granted";

/// One successful token grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrantEvent {
	pub id: Uuid,
	pub timestamp: DateTime<Utc>,
	pub action: String,
	/// Username of the grantee, absent for client-credentials grants.
	pub principal: Option<String>,
	pub token_type: String,
	pub scope: Vec<String>,
	pub expires_at: DateTime<Utc>,
	pub client_id: Option<String>,
	pub grant_type: Option<String>,
}

impl TokenGrantEvent {
	pub fn new(token_type: impl Into<String>, scope: Vec<String>, expires_at: DateTime<Utc>) -> Self {
		Self {
			id: Uuid::new_v4(),
			timestamp: Utc::now(),
			action: TOKEN_GRANT_ACTION.to_string(),
			principal: None,
			token_type: token_type.into(),
			scope,
			expires_at,
			client_id: None,
			grant_type: None,
		}
	}

	pub fn with_principal(mut self, principal: Option<&str>) -> Self {
		self.principal = principal.map(str::to_string);
		self
	}

	pub fn with_client_id(mut self, client_id: Option<&str>) -> Self {
		self.client_id = client_id.map(str::to_string);
		self
	}

	pub fn with_grant_type(mut self, grant_type: Option<&str>) -> Self {
		self.grant_type = grant_type.map(str::to_string);
		self
	}
}

/// Write-only destination for audit events.
pub trait AuditSink: Send + Sync {
	/// Unique name for this sink (used in logs).
	fn name(&self) -> &str;

	fn publish(&self, event: &TokenGrantEvent) -> Result<(), AuditSinkError>;
}

/// Emits audit events as structured logs under the `radar_audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
	fn name(&self) -> &str {
		"tracing"
	}

	fn publish(&self, event: &TokenGrantEvent) -> Result<(), AuditSinkError> {
		let id = event.id.to_string();
		let timestamp = event.timestamp.to_rfc3339();
		let expires_at = event.expires_at.to_rfc3339();
		let scope = event.scope.join(" ");

		tracing::info!(
			target: "radar_audit",
			id,
			timestamp,
			action = %event.action,
			principal = event.principal.as_deref(),
			token_type = %event.token_type,
			scope,
			expires_at,
			client_id = event.client_id.as_deref(),
			grant_type = event.grant_type.as_deref(),
			"audit event"
		);
		Ok(())
	}
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
	events: Mutex<Vec<TokenGrantEvent>>,
}

impl MemoryAuditSink {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn events(&self) -> Vec<TokenGrantEvent> {
		self.events
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	/// Events serialized as JSON lines.
	pub fn to_json_lines(&self) -> Result<String, AuditSinkError> {
		let mut out = String::new();
		for event in self.events() {
			out.push_str(&serde_json::to_string(&event)?);
			out.push('\n');
		}
		Ok(out)
	}
}

impl AuditSink for MemoryAuditSink {
	fn name(&self) -> &str {
		"memory"
	}

	fn publish(&self, event: &TokenGrantEvent) -> Result<(), AuditSinkError> {
		self.events
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(event.clone());
		Ok(())
	}
}
