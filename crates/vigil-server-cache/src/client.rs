// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cache client construction.

use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use std::time::Duration;
use tracing::debug;

use crate::error::Result;

/// Connect and response deadlines for every cache operation.
const CACHE_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a managed connection to the cache and verify it with a PING.
///
/// The returned manager is cheaply cloneable and reconnects on its own; one
/// is created at startup and handed to every cache consumer. Failure here is
/// fatal to the process.
pub async fn connect(redis_uri: &str) -> Result<ConnectionManager> {
	let client = redis::Client::open(redis_uri)?;
	let config = ConnectionManagerConfig::new()
		.set_connection_timeout(CACHE_TIMEOUT)
		.set_response_timeout(CACHE_TIMEOUT);

	let mut manager = ConnectionManager::new_with_config(client, config).await?;
	let _: String = redis::cmd("PING").query_async(&mut manager).await?;

	debug!("cache connection established");
	Ok(manager)
}
