// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cache mirror of incident rows.
//!
//! The relational store is the source of truth; the mirror is best-effort
//! and re-converges on the next probe that touches the incident.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::instrument;

use vigil_core::Incident;

use crate::error::Result;
use crate::keys;

/// Write side of the incident cache mirror.
#[async_trait]
pub trait IncidentMirror: Send + Sync {
	/// Snapshot the incident row to `incident:{id}` and track its id in
	/// `incidents:ids`.
	async fn mirror(&self, incident: &Incident) -> Result<()>;
}

/// Redis-backed incident mirror.
#[derive(Clone)]
pub struct RedisIncidentMirror {
	con: ConnectionManager,
}

impl RedisIncidentMirror {
	pub fn new(con: ConnectionManager) -> Self {
		Self { con }
	}
}

#[async_trait]
impl IncidentMirror for RedisIncidentMirror {
	#[instrument(skip(self, incident), fields(incident_id = incident.id, monitor_id = %incident.monitor_id))]
	async fn mirror(&self, incident: &Incident) -> Result<()> {
		let fields = [
			("id", incident.id.to_string()),
			("monitor_id", incident.monitor_id.to_string()),
			("title", incident.title.clone()),
			("description", incident.description.clone()),
			("incident_type", incident.incident_type.as_str().to_string()),
			("incident_status", incident.incident_status.as_str().to_string()),
			("notify_subscribers", incident.notify_subscribers.to_string()),
			("created_at", incident.created_at.to_rfc3339()),
			("updated_at", incident.updated_at.to_rfc3339()),
		];

		let mut con = self.con.clone();
		let _: () = redis::pipe()
			.hset_multiple(keys::incident(incident.id), &fields)
			.ignore()
			.sadd(keys::INCIDENT_IDS, incident.id)
			.ignore()
			.query_async(&mut con)
			.await?;
		Ok(())
	}
}
