// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User approvals of client scopes, consulted when a refresh token is used.

use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};

/// Source of truth for which scopes a user has approved for a client.
pub trait ApprovalStore: Send + Sync {
	/// True when `username` currently approves every one of `scopes` for
	/// `client_id`. An empty scope list is always approved.
	fn is_approved(&self, username: &str, client_id: &str, scopes: &[String]) -> bool;
}

/// In-memory [`ApprovalStore`].
#[derive(Debug, Default)]
pub struct MemoryApprovalStore {
	approvals: RwLock<HashMap<(String, String), BTreeSet<String>>>,
}

impl MemoryApprovalStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn approve<I, S>(&self, username: &str, client_id: &str, scopes: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut approvals = self.approvals.write().unwrap_or_else(PoisonError::into_inner);
		approvals
			.entry((username.to_string(), client_id.to_string()))
			.or_default()
			.extend(scopes.into_iter().map(Into::into));
	}

	pub fn revoke(&self, username: &str, client_id: &str, scope: &str) {
		let mut approvals = self.approvals.write().unwrap_or_else(PoisonError::into_inner);
		if let Some(scopes) = approvals.get_mut(&(username.to_string(), client_id.to_string())) {
			scopes.remove(scope);
		}
	}

	pub fn revoke_all(&self, username: &str, client_id: &str) {
		let mut approvals = self.approvals.write().unwrap_or_else(PoisonError::into_inner);
		approvals.remove(&(username.to_string(), client_id.to_string()));
	}
}

impl ApprovalStore for MemoryApprovalStore {
	fn is_approved(&self, username: &str, client_id: &str, scopes: &[String]) -> bool {
		if scopes.is_empty() {
			return true;
		}
		let approvals = self.approvals.read().unwrap_or_else(PoisonError::into_inner);
		approvals
			.get(&(username.to_string(), client_id.to_string()))
			.is_some_and(|approved| scopes.iter().all(|s| approved.contains(s)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scopes(s: &[&str]) -> Vec<String> {
		s.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn approval_covers_subset() {
		let store = MemoryApprovalStore::new();
		store.approve("alice", "aRMT", ["SUBJECT.READ", "MEASUREMENT.CREATE"]);
		assert!(store.is_approved("alice", "aRMT", &scopes(&["MEASUREMENT.CREATE"])));
		assert!(!store.is_approved("alice", "aRMT", &scopes(&["PROJECT.READ"])));
	}

	#[test]
	fn approvals_are_per_client() {
		let store = MemoryApprovalStore::new();
		store.approve("alice", "aRMT", ["SUBJECT.READ"]);
		assert!(!store.is_approved("alice", "pRMT", &scopes(&["SUBJECT.READ"])));
		assert!(!store.is_approved("bob", "aRMT", &scopes(&["SUBJECT.READ"])));
	}

	#[test]
	fn revoking_one_scope() {
		let store = MemoryApprovalStore::new();
		store.approve("alice", "aRMT", ["SUBJECT.READ", "MEASUREMENT.CREATE"]);
		store.revoke("alice", "aRMT", "SUBJECT.READ");
		assert!(!store.is_approved("alice", "aRMT", &scopes(&["SUBJECT.READ", "MEASUREMENT.CREATE"])));
		assert!(store.is_approved("alice", "aRMT", &scopes(&["MEASUREMENT.CREATE"])));

		store.revoke_all("alice", "aRMT");
		assert!(!store.is_approved("alice", "aRMT", &scopes(&["MEASUREMENT.CREATE"])));
	}

	#[test]
	fn empty_scope_list_is_approved() {
		assert!(MemoryApprovalStore::new().is_approved("alice", "aRMT", &[]));
	}
}
