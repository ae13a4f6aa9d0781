// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Monitor reads from the cache, and the probe-state fields written back.

use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument, warn};

use vigil_core::{
	GradedStatus, IncidentCreationCriteria, Monitor, MonitorGroup, MonitorId, MonitorStatus,
};

use crate::error::{CacheError, Result};
use crate::keys;

/// Read-only view of the monitor set in the cache, plus the per-monitor
/// probe-state fields this service owns (`overall_status`, `last_updated`,
/// `uptime`).
#[derive(Clone)]
pub struct MonitorCache {
	con: ConnectionManager,
}

impl MonitorCache {
	pub fn new(con: ConnectionManager) -> Self {
		Self { con }
	}

	/// List monitors from the cache.
	///
	/// Monitors whose id does not parse or whose hash is missing or
	/// undecodable are skipped; a whole-pipeline failure propagates to the
	/// caller. Only `Active` and `Inactive` monitors are returned.
	#[instrument(skip(self))]
	pub async fn list_monitors(&self) -> Result<Vec<Monitor>> {
		let mut con = self.con.clone();

		let raw_ids: Vec<String> = con.smembers(keys::MONITOR_IDS).await?;
		let mut ids = Vec::with_capacity(raw_ids.len());
		for raw in &raw_ids {
			match raw.parse::<MonitorId>() {
				Ok(id) => ids.push(id),
				Err(_) => debug!(raw_id = %raw, "skipping unparsable monitor id"),
			}
		}
		if ids.is_empty() {
			return Ok(Vec::new());
		}

		let mut pipe = redis::pipe();
		for id in &ids {
			pipe.hgetall(keys::monitor(*id));
		}
		let hashes: Vec<HashMap<String, String>> = pipe.query_async(&mut con).await?;

		let mut monitors = Vec::with_capacity(hashes.len());
		for (id, fields) in ids.into_iter().zip(hashes) {
			if fields.is_empty() {
				debug!(monitor_id = %id, "skipping monitor with missing hash");
				continue;
			}
			match decode_monitor(id, &fields) {
				Ok(monitor) => monitors.push(monitor),
				Err(e) => debug!(monitor_id = %id, error = %e, "skipping undecodable monitor"),
			}
		}

		self.resolve_group_names(&mut con, &mut monitors).await?;
		Ok(monitors)
	}

	/// Fill in denormalized group names with one bounded pipeline over the
	/// distinct group ids.
	async fn resolve_group_names(
		&self,
		con: &mut ConnectionManager,
		monitors: &mut [Monitor],
	) -> Result<()> {
		let group_ids: Vec<i64> = monitors
			.iter()
			.filter_map(|m| m.group_id)
			.collect::<HashSet<_>>()
			.into_iter()
			.collect();
		if group_ids.is_empty() {
			return Ok(());
		}

		let mut pipe = redis::pipe();
		for id in &group_ids {
			pipe.hgetall(keys::monitor_group(*id));
		}
		let hashes: Vec<HashMap<String, String>> = pipe.query_async(con).await?;

		let groups: HashMap<i64, MonitorGroup> = group_ids
			.into_iter()
			.zip(hashes)
			.filter_map(|(id, fields)| decode_monitor_group(id, &fields).map(|group| (id, group)))
			.collect();

		for monitor in monitors.iter_mut() {
			if let Some(group_id) = monitor.group_id {
				monitor.group_name = groups.get(&group_id).map(|group| group.name.clone());
			}
		}
		Ok(())
	}

	/// Stamp the outcome of the latest probe onto the monitor hash.
	#[instrument(skip(self), fields(monitor_id = %id))]
	pub async fn write_probe_state(
		&self,
		id: MonitorId,
		graded: GradedStatus,
		at: DateTime<Utc>,
	) -> Result<()> {
		let mut con = self.con.clone();
		let fields = [
			("overall_status", graded.as_str().to_string()),
			("last_updated", at.to_rfc3339()),
		];
		let _: () = con.hset_multiple(keys::monitor(id), &fields).await?;
		Ok(())
	}
}

/// Decode a monitor hash into the domain type.
///
/// `url`, `status` and `interval` are required; every other field falls back
/// to its default. The id comes from the `monitors:ids` set member, not from
/// the hash.
pub fn decode_monitor(id: MonitorId, fields: &HashMap<String, String>) -> Result<Monitor> {
	let url = require(fields, "url")?;
	let status: MonitorStatus = require(fields, "status")?
		.parse()
		.map_err(|e| CacheError::Decode(format!("{}", e)))?;
	let interval = require(fields, "interval")?;

	let name = fields
		.get("name")
		.cloned()
		.unwrap_or_else(|| format!("monitor-{}", id));

	let criteria = fields
		.get("incident_creation_criteria")
		.map(|s| IncidentCreationCriteria::parse_or_default(s))
		.unwrap_or(IncidentCreationCriteria::Immediate);

	Ok(Monitor {
		id,
		name,
		url,
		status,
		interval,
		expected_status: opt_number(fields, "expected_status"),
		timeout_ms: opt_number(fields, "timeout"),
		auto_incident: opt_bool(fields, "auto_incident"),
		auto_resolve_incident: opt_bool(fields, "auto_resolve_incident"),
		threshold_classification: opt_bool(fields, "threshold_classification"),
		incident_creation_criteria: criteria,
		service_degraded_threshold: opt_number(fields, "service_degraded_threshold"),
		partial_outage_threshold: opt_number(fields, "partial_outage_threshold"),
		major_outage_threshold: opt_number(fields, "major_outage_threshold"),
		escalation_window_minutes: opt_number(fields, "escalation_window"),
		group_id: opt_number(fields, "group_id"),
		group_name: None,
	})
}

/// Decode a `monitor_group:{id}` hash. Groups without a name are treated as
/// missing.
pub fn decode_monitor_group(id: i64, fields: &HashMap<String, String>) -> Option<MonitorGroup> {
	let name = fields.get("name").filter(|v| !v.is_empty())?.clone();
	Some(MonitorGroup {
		id,
		name,
		visibility: opt_bool(fields, "visibility"),
	})
}

fn require(fields: &HashMap<String, String>, name: &str) -> Result<String> {
	fields
		.get(name)
		.filter(|v| !v.is_empty())
		.cloned()
		.ok_or_else(|| CacheError::Decode(format!("missing field: {}", name)))
}

fn opt_number<T: std::str::FromStr>(fields: &HashMap<String, String>, name: &str) -> Option<T> {
	let raw = fields.get(name)?;
	if raw.trim().is_empty() {
		return None;
	}
	match raw.trim().parse() {
		Ok(value) => Some(value),
		Err(_) => {
			warn!(field = name, value = %raw, "ignoring unparsable monitor field");
			None
		}
	}
}

fn opt_bool(fields: &HashMap<String, String>, name: &str) -> bool {
	matches!(
		fields.get(name).map(|s| s.trim()),
		Some("1") | Some("true") | Some("t") | Some("True")
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn hash(pairs: &[(&str, &str)]) -> HashMap<String, String> {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[test]
	fn decodes_full_hash() {
		let fields = hash(&[
			("name", "payments"),
			("url", "https://example.com/health"),
			("status", "Active"),
			("interval", "*/5 * * * *"),
			("expected_status", "204"),
			("timeout", "2000"),
			("auto_incident", "true"),
			("auto_resolve_incident", "1"),
			("threshold_classification", "true"),
			("incident_creation_criteria", "threshold"),
			("service_degraded_threshold", "20"),
			("partial_outage_threshold", "60"),
			("major_outage_threshold", "90"),
			("escalation_window", "10"),
			("group_id", "3"),
		]);

		let m = decode_monitor(MonitorId(7), &fields).unwrap();
		assert_eq!(m.id, MonitorId(7));
		assert_eq!(m.name, "payments");
		assert_eq!(m.expected_status(), 204);
		assert_eq!(m.timeout_ms(), 2_000);
		assert!(m.auto_incident);
		assert!(m.auto_resolve_incident);
		assert_eq!(
			m.incident_creation_criteria,
			IncidentCreationCriteria::Threshold
		);
		assert_eq!(m.thresholds(), Some((20, 60, 90)));
		assert_eq!(m.escalation_window_minutes(), 10);
		assert_eq!(m.group_id, Some(3));
	}

	#[test]
	fn decodes_minimal_hash_with_defaults() {
		let fields = hash(&[
			("url", "https://example.com"),
			("status", "Inactive"),
			("interval", "@every 30s"),
		]);

		let m = decode_monitor(MonitorId(2), &fields).unwrap();
		assert_eq!(m.name, "monitor-2");
		assert_eq!(m.status, MonitorStatus::Inactive);
		assert_eq!(m.expected_status(), 200);
		assert_eq!(m.timeout_ms(), 5_000);
		assert!(!m.auto_incident);
		assert_eq!(
			m.incident_creation_criteria,
			IncidentCreationCriteria::Immediate
		);
		assert_eq!(m.thresholds(), None);
	}

	#[test]
	fn rejects_missing_url_or_unknown_status() {
		let fields = hash(&[("status", "Active"), ("interval", "* * * * *")]);
		assert!(decode_monitor(MonitorId(1), &fields).is_err());

		let fields = hash(&[
			("url", "https://example.com"),
			("status", "Deleted"),
			("interval", "* * * * *"),
		]);
		assert!(decode_monitor(MonitorId(1), &fields).is_err());
	}

	#[test]
	fn decodes_monitor_group_hash() {
		let fields = hash(&[("name", "core"), ("visibility", "true")]);
		let group = decode_monitor_group(3, &fields).unwrap();
		assert_eq!(group.id, 3);
		assert_eq!(group.name, "core");
		assert!(group.visibility);

		let nameless = hash(&[("visibility", "true")]);
		assert!(decode_monitor_group(4, &nameless).is_none());
	}

	#[test]
	fn unparsable_optional_fields_fall_back() {
		let fields = hash(&[
			("url", "https://example.com"),
			("status", "Active"),
			("interval", "* * * * *"),
			("timeout", "soon"),
			("expected_status", ""),
		]);

		let m = decode_monitor(MonitorId(1), &fields).unwrap();
		assert_eq!(m.timeout_ms(), 5_000);
		assert_eq!(m.expected_status(), 200);
	}
}
