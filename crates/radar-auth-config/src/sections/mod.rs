// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod keystore;
mod logging;
mod token;

pub use keystore::{KeystoreConfig, KeystoreConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use token::{TokenConfig, TokenConfigLayer};
