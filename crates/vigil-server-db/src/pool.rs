// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::error::DbError;

const MAX_CONNECTIONS: u32 = 25;
const MIN_CONNECTIONS: u32 = 5;
const MAX_LIFETIME: Duration = Duration::from_secs(15 * 60);

/// Create a PgPool with the service's standard bounds.
///
/// Connecting eagerly means a bad `POSTGRES_URI` fails startup instead of
/// the first probe.
///
/// # Errors
/// Returns `DbError::Sqlx` if the URI is invalid or connection fails.
#[tracing::instrument(skip(postgres_uri))]
pub async fn create_pool(postgres_uri: &str) -> Result<PgPool, DbError> {
	let pool = PgPoolOptions::new()
		.max_connections(MAX_CONNECTIONS)
		.min_connections(MIN_CONNECTIONS)
		.max_lifetime(MAX_LIFETIME)
		.connect(postgres_uri)
		.await?;

	tracing::debug!("database pool created");
	Ok(pool)
}
