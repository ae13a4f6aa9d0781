// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The per-firing probe pipeline.

use async_trait::async_trait;
use tracing::{info, warn};

use vigil_core::{Classifier, Monitor};
use vigil_server_cache::{MonitorCache, StateRecorder};

use crate::engine::IncidentEngine;
use crate::probe::ProbeExecutor;

/// What a scheduled firing runs. The scheduler only knows this seam, which
/// keeps job tasks from reaching back into scheduling state.
#[async_trait]
pub trait CheckRunner: Send + Sync {
	async fn run(&self, monitor: Monitor);
}

/// Probe → classify → record → incident policy.
///
/// Every error in here is local to the probe: cache writes are best-effort
/// and incident failures are retried implicitly by the next firing.
pub struct Checker {
	executor: ProbeExecutor,
	classifier: Classifier,
	cache: MonitorCache,
	recorder: StateRecorder,
	engine: IncidentEngine,
}

impl Checker {
	pub fn new(
		executor: ProbeExecutor,
		cache: MonitorCache,
		recorder: StateRecorder,
		engine: IncidentEngine,
	) -> Self {
		Self {
			executor,
			classifier: Classifier::new(),
			cache,
			recorder,
			engine,
		}
	}
}

#[async_trait]
impl CheckRunner for Checker {
	async fn run(&self, monitor: Monitor) {
		let outcome = self.executor.probe(&monitor).await;
		let graded = self.classifier.classify(&monitor, &outcome);
		info!(
			monitor_id = %monitor.id,
			url = %monitor.url,
			graded = %graded,
			latency_ms = outcome.latency_ms,
			"probe completed"
		);

		if let Err(e) = self.recorder.record(monitor.id, &outcome, graded).await {
			warn!(monitor_id = %monitor.id, error = %e, "failed to record probe outcome");
		}
		if let Err(e) = self
			.cache
			.write_probe_state(monitor.id, graded, outcome.timestamp)
			.await
		{
			warn!(monitor_id = %monitor.id, error = %e, "failed to write probe state");
		}

		if graded.is_operational() {
			if monitor.auto_resolve_incident {
				if let Err(e) = self.engine.resolve_if_open(&monitor).await {
					warn!(monitor_id = %monitor.id, error = %e, "failed to resolve incident");
				}
			}
		} else if monitor.auto_incident {
			if let Err(e) = self.engine.open_if_needed(&monitor, graded).await {
				warn!(monitor_id = %monitor.id, error = %e, "failed to open incident");
			}
		}
	}
}
