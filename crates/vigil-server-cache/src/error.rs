// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for cache operations.

use thiserror::Error;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors that can occur against the cache.
#[derive(Debug, Error)]
pub enum CacheError {
	#[error("cache error: {0}")]
	Redis(#[from] redis::RedisError),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("undecodable monitor hash: {0}")]
	Decode(String),
}
