// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Probe history and daily metrics recording.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{instrument, warn};

use vigil_core::{GradedStatus, HistoryEntry, MonitorId, ProbeOutcome};

use crate::error::Result;
use crate::keys;

/// Maximum retained history entries per monitor.
pub const HISTORY_BOUND: isize = 1_000;

/// Counter field for the number of probes recorded on a day.
const TOTAL_CHECKS: &str = "total_checks";

/// Appends probe outcomes to per-monitor history and bumps daily counters.
///
/// All writes here are best-effort: the caller logs failures and carries on
/// with the rest of the probe pipeline.
#[derive(Clone)]
pub struct StateRecorder {
	con: ConnectionManager,
}

impl StateRecorder {
	pub fn new(con: ConnectionManager) -> Self {
		Self { con }
	}

	/// Append the outcome to `monitor:{id}:history` (trimmed to the last
	/// 1000 entries) and increment today's `total_checks` plus the counter
	/// named by the graded status.
	#[instrument(skip(self, outcome), fields(monitor_id = %id))]
	pub async fn record(
		&self,
		id: MonitorId,
		outcome: &ProbeOutcome,
		graded: GradedStatus,
	) -> Result<()> {
		let entry = HistoryEntry {
			timestamp: outcome.timestamp,
			status: graded,
			response_time: outcome.latency_ms,
		};
		let payload = serde_json::to_string(&entry)?;

		let history_key = keys::history(id);
		let metrics_key = keys::metrics(id, outcome.timestamp.date_naive());

		let mut con = self.con.clone();
		let _: () = redis::pipe()
			.rpush(&history_key, payload)
			.ignore()
			.ltrim(&history_key, -HISTORY_BOUND, -1)
			.ignore()
			.hincr(&metrics_key, TOTAL_CHECKS, 1i64)
			.ignore()
			.hincr(&metrics_key, graded.as_str(), 1i64)
			.ignore()
			.query_async(&mut con)
			.await?;

		self.update_uptime(id).await;
		Ok(())
	}

	/// Recompute the uptime percentage over the retained history and stamp
	/// it onto the monitor hash. Best-effort.
	async fn update_uptime(&self, id: MonitorId) {
		let mut con = self.con.clone();
		let history: Vec<String> = match con.lrange(keys::history(id), 0, -1).await {
			Ok(history) => history,
			Err(e) => {
				warn!(monitor_id = %id, error = %e, "failed to read history for uptime");
				return;
			}
		};

		let statuses = history
			.iter()
			.filter_map(|raw| serde_json::from_str::<HistoryEntry>(raw).ok())
			.map(|entry| entry.status);
		let Some(uptime) = uptime_percent(statuses) else {
			return;
		};

		let result: std::result::Result<(), redis::RedisError> = con
			.hset(keys::monitor(id), "uptime", format!("{:.2}", uptime))
			.await;
		if let Err(e) = result {
			warn!(monitor_id = %id, error = %e, "failed to write uptime");
		}
	}
}

/// Percentage of operational entries, `None` when there are no entries.
fn uptime_percent(statuses: impl Iterator<Item = GradedStatus>) -> Option<f64> {
	let mut total = 0u64;
	let mut operational = 0u64;
	for status in statuses {
		total += 1;
		if status.is_operational() {
			operational += 1;
		}
	}
	if total == 0 {
		return None;
	}
	Some(operational as f64 * 100.0 / total as f64)
}
