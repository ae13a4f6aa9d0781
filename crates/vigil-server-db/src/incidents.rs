// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Incident rows in the relational store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use vigil_core::{Incident, IncidentStatus, MonitorId, NewIncident};

use crate::error::{DbError, Result};

const INCIDENT_COLUMNS: &str = "id, title, description, monitor_id, incident_type, \
	incident_status, notify_subscribers, created_at, updated_at";

/// Durable incident storage.
///
/// This service is the only writer of the incident table, which is what
/// makes the read-then-insert in the engine safe.
#[async_trait]
pub trait IncidentStore: Send + Sync {
	/// The monitor's currently active incident (`open` or `monitoring`),
	/// if any.
	async fn find_active(&self, monitor_id: MonitorId) -> Result<Option<Incident>>;

	/// Insert a new incident with status `open` and return the stored row.
	async fn insert(&self, incident: &NewIncident) -> Result<Incident>;

	/// Transition an incident to `resolved` and return the updated row.
	async fn resolve(&self, incident_id: i64, at: DateTime<Utc>) -> Result<Incident>;
}

/// Postgres implementation of the incident store.
#[derive(Clone)]
pub struct PgIncidentStore {
	pool: PgPool,
}

impl PgIncidentStore {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl IncidentStore for PgIncidentStore {
	#[instrument(skip(self), fields(monitor_id = %monitor_id))]
	async fn find_active(&self, monitor_id: MonitorId) -> Result<Option<Incident>> {
		let row = sqlx::query_as::<_, IncidentRow>(&format!(
			r#"
			SELECT {INCIDENT_COLUMNS}
			FROM incidents
			WHERE monitor_id = $1 AND incident_status IN ('open', 'monitoring')
			ORDER BY created_at DESC
			LIMIT 1
			"#
		))
		.bind(monitor_id.0)
		.fetch_optional(&self.pool)
		.await?;

		row.map(Incident::try_from).transpose()
	}

	#[instrument(skip(self, incident), fields(monitor_id = %incident.monitor_id))]
	async fn insert(&self, incident: &NewIncident) -> Result<Incident> {
		let now = Utc::now();
		let row = sqlx::query_as::<_, IncidentRow>(&format!(
			r#"
			INSERT INTO incidents (
				title, description, monitor_id, incident_type,
				incident_status, notify_subscribers, created_at, updated_at
			)
			VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
			RETURNING {INCIDENT_COLUMNS}
			"#
		))
		.bind(&incident.title)
		.bind(&incident.description)
		.bind(incident.monitor_id.0)
		.bind(incident.incident_type.as_str())
		.bind(IncidentStatus::Open.as_str())
		.bind(incident.notify_subscribers)
		.bind(now)
		.bind(now)
		.fetch_one(&self.pool)
		.await?;

		Incident::try_from(row)
	}

	#[instrument(skip(self))]
	async fn resolve(&self, incident_id: i64, at: DateTime<Utc>) -> Result<Incident> {
		let row = sqlx::query_as::<_, IncidentRow>(&format!(
			r#"
			UPDATE incidents
			SET incident_status = $1, updated_at = $2
			WHERE id = $3
			RETURNING {INCIDENT_COLUMNS}
			"#
		))
		.bind(IncidentStatus::Resolved.as_str())
		.bind(at)
		.bind(incident_id)
		.fetch_optional(&self.pool)
		.await?
		.ok_or_else(|| DbError::NotFound(format!("incident {}", incident_id)))?;

		Incident::try_from(row)
	}
}

#[derive(Debug, sqlx::FromRow)]
struct IncidentRow {
	id: i64,
	title: String,
	description: String,
	monitor_id: i64,
	incident_type: String,
	incident_status: String,
	notify_subscribers: bool,
	created_at: DateTime<Utc>,
	updated_at: DateTime<Utc>,
}

impl TryFrom<IncidentRow> for Incident {
	type Error = DbError;

	fn try_from(row: IncidentRow) -> Result<Self> {
		Ok(Incident {
			id: row.id,
			monitor_id: MonitorId(row.monitor_id),
			title: row.title,
			description: row.description,
			incident_type: row
				.incident_type
				.parse()
				.map_err(|e| DbError::Decode(format!("{}", e)))?,
			incident_status: row
				.incident_status
				.parse()
				.map_err(|e| DbError::Decode(format!("{}", e)))?,
			notify_subscribers: row.notify_subscribers,
			created_at: row.created_at,
			updated_at: row.updated_at,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn row(incident_type: &str, incident_status: &str) -> IncidentRow {
		IncidentRow {
			id: 1,
			title: "Incident for monitor: api".to_string(),
			description: "Automatically detected failure".to_string(),
			monitor_id: 7,
			incident_type: incident_type.to_string(),
			incident_status: incident_status.to_string(),
			notify_subscribers: false,
			created_at: Utc::now(),
			updated_at: Utc::now(),
		}
	}

	#[test]
	fn row_converts_to_domain() {
		let incident = Incident::try_from(row("partial_outage", "open")).unwrap();
		assert_eq!(incident.monitor_id, MonitorId(7));
		assert_eq!(incident.incident_type, vigil_core::GradedStatus::PartialOutage);
		assert!(incident.is_active());
	}

	#[test]
	fn row_with_unknown_status_is_rejected() {
		assert!(Incident::try_from(row("partial_outage", "closed")).is_err());
		assert!(Incident::try_from(row("offline", "open")).is_err());
	}
}
