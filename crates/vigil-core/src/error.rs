// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for core domain parsing.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while decoding domain values.
#[derive(Debug, Error)]
pub enum CoreError {
	#[error("unknown graded status: {0}")]
	UnknownGradedStatus(String),

	#[error("unknown monitor status: {0}")]
	UnknownMonitorStatus(String),

	#[error("unknown incident status: {0}")]
	UnknownIncidentStatus(String),

	#[error("invalid monitor id: {0}")]
	InvalidMonitorId(String),
}
