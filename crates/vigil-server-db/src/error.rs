// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for relational-store operations.

use thiserror::Error;

/// Result type for relational-store operations.
pub type Result<T> = std::result::Result<T, DbError>;

/// Errors that can occur against the relational store.
#[derive(Debug, Error)]
pub enum DbError {
	#[error("database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("not found: {0}")]
	NotFound(String),

	#[error("undecodable row: {0}")]
	Decode(String),
}
