// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the probe pipeline and scheduler.

use thiserror::Error;

/// Result type for check operations.
pub type Result<T> = std::result::Result<T, ChecksError>;

/// Errors that can occur while scheduling and running checks.
#[derive(Debug, Error)]
pub enum ChecksError {
	#[error("invalid schedule expression: {0}")]
	InvalidSchedule(String),

	#[error(transparent)]
	Cache(#[from] vigil_server_cache::CacheError),

	#[error(transparent)]
	Db(#[from] vigil_server_db::DbError),
}
