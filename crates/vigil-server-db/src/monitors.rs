// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Monitor reads from the relational store.
//!
//! Fallback path behind the cache; the monitor tables are owned and written
//! by the management tool.

use sqlx::PgPool;
use tracing::{debug, instrument};

use vigil_core::{IncidentCreationCriteria, Monitor, MonitorId};

use crate::error::Result;

/// Read-only monitor access against Postgres.
#[derive(Clone)]
pub struct PgMonitorStore {
	pool: PgPool,
}

impl PgMonitorStore {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	/// List `Active` and `Inactive` monitors with their denormalized group
	/// name. Rows that fail domain conversion are skipped.
	#[instrument(skip(self))]
	pub async fn list_monitors(&self) -> Result<Vec<Monitor>> {
		let rows = sqlx::query_as::<_, MonitorRow>(
			r#"
			SELECT
				m.id, m.name, m.url, m.status, m.interval,
				m.expected_status, m.timeout,
				m.auto_incident, m.auto_resolve_incident,
				m.threshold_classification, m.incident_creation_criteria,
				m.service_degraded_threshold, m.partial_outage_threshold,
				m.major_outage_threshold, m.escalation_window, m.group_id,
				g.name AS group_name
			FROM monitors m
			LEFT JOIN monitor_groups g ON m.group_id = g.id
			WHERE m.status IN ('Active', 'Inactive')
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		let mut monitors = Vec::with_capacity(rows.len());
		for row in rows {
			let id = row.id;
			match row.into_monitor() {
				Ok(monitor) => monitors.push(monitor),
				Err(e) => debug!(monitor_id = id, error = %e, "skipping undecodable monitor row"),
			}
		}
		Ok(monitors)
	}
}

#[derive(Debug, sqlx::FromRow)]
struct MonitorRow {
	id: i32,
	name: String,
	url: String,
	status: String,
	interval: String,
	expected_status: Option<i32>,
	timeout: Option<i32>,
	auto_incident: Option<bool>,
	auto_resolve_incident: Option<bool>,
	threshold_classification: Option<bool>,
	incident_creation_criteria: Option<String>,
	service_degraded_threshold: Option<i32>,
	partial_outage_threshold: Option<i32>,
	major_outage_threshold: Option<i32>,
	escalation_window: Option<i32>,
	group_id: Option<i32>,
	group_name: Option<String>,
}

impl MonitorRow {
	fn into_monitor(self) -> vigil_core::Result<Monitor> {
		Ok(Monitor {
			id: MonitorId(self.id as i64),
			name: self.name,
			url: self.url,
			status: self.status.parse()?,
			interval: self.interval,
			expected_status: self.expected_status.and_then(|v| u16::try_from(v).ok()),
			timeout_ms: self.timeout.and_then(|v| u64::try_from(v).ok()),
			auto_incident: self.auto_incident.unwrap_or(false),
			auto_resolve_incident: self.auto_resolve_incident.unwrap_or(false),
			threshold_classification: self.threshold_classification.unwrap_or(false),
			incident_creation_criteria: self
				.incident_creation_criteria
				.as_deref()
				.map(IncidentCreationCriteria::parse_or_default)
				.unwrap_or(IncidentCreationCriteria::Immediate),
			service_degraded_threshold: self
				.service_degraded_threshold
				.and_then(|v| u8::try_from(v).ok()),
			partial_outage_threshold: self
				.partial_outage_threshold
				.and_then(|v| u8::try_from(v).ok()),
			major_outage_threshold: self
				.major_outage_threshold
				.and_then(|v| u8::try_from(v).ok()),
			escalation_window_minutes: self.escalation_window.and_then(|v| u32::try_from(v).ok()),
			group_id: self.group_id.map(i64::from),
			group_name: self.group_name,
		})
	}
}
