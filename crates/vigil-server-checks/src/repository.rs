// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The monitor set the scheduler reconciles against.

use async_trait::async_trait;
use tracing::warn;

use vigil_core::Monitor;
use vigil_server_cache::MonitorCache;
use vigil_server_db::PgMonitorStore;

use crate::error::Result;

/// Source of the declared monitor set.
#[async_trait]
pub trait MonitorSource: Send + Sync {
	async fn list_monitors(&self) -> Result<Vec<Monitor>>;
}

/// Reads monitors from the cache, falling back to the relational store when
/// the cache pipeline fails as a whole.
pub struct CacheFirstMonitorSource {
	cache: MonitorCache,
	fallback: PgMonitorStore,
}

impl CacheFirstMonitorSource {
	pub fn new(cache: MonitorCache, fallback: PgMonitorStore) -> Self {
		Self { cache, fallback }
	}
}

#[async_trait]
impl MonitorSource for CacheFirstMonitorSource {
	async fn list_monitors(&self) -> Result<Vec<Monitor>> {
		match self.cache.list_monitors().await {
			Ok(monitors) => Ok(monitors),
			Err(e) => {
				warn!(error = %e, "cache monitor listing failed, falling back to relational store");
				Ok(self.fallback.list_monitors().await?)
			}
		}
	}
}
