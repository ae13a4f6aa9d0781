// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Incident policy enforcement.
//!
//! The engine is the single writer of incident rows, which makes its
//! read-then-insert safe: at most one incident per monitor is ever in an
//! active state (`open` or `monitoring`).

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use vigil_core::{GradedStatus, Incident, Monitor, NewIncident};
use vigil_server_cache::IncidentMirror;
use vigil_server_db::IncidentStore;

use crate::error::Result;

pub struct IncidentEngine {
	store: Arc<dyn IncidentStore>,
	mirror: Arc<dyn IncidentMirror>,
}

impl IncidentEngine {
	pub fn new(store: Arc<dyn IncidentStore>, mirror: Arc<dyn IncidentMirror>) -> Self {
		Self { store, mirror }
	}

	/// Open an incident for a non-operational probe unless the monitor
	/// already has an active one.
	///
	/// Both creation criteria open on any non-operational graded status; the
	/// graded-versus-binary distinction is enforced upstream by the
	/// classifier.
	#[instrument(skip(self, monitor), fields(monitor_id = %monitor.id, graded = %graded))]
	pub async fn open_if_needed(
		&self,
		monitor: &Monitor,
		graded: GradedStatus,
	) -> Result<Option<Incident>> {
		if graded.is_operational() {
			return Ok(None);
		}

		if let Some(existing) = self.store.find_active(monitor.id).await? {
			debug!(
				incident_id = existing.id,
				incident_status = %existing.incident_status,
				"active incident exists, suppressing duplicate"
			);
			return Ok(None);
		}

		let new_incident = NewIncident::detected(monitor.id, &monitor.name, graded, Utc::now());
		let incident = self.store.insert(&new_incident).await?;
		info!(
			incident_id = incident.id,
			incident_type = %incident.incident_type,
			"incident opened"
		);

		self.mirror_best_effort(&incident).await;
		Ok(Some(incident))
	}

	/// Resolve the monitor's active incident after a recovery, if one exists.
	#[instrument(skip(self, monitor), fields(monitor_id = %monitor.id))]
	pub async fn resolve_if_open(&self, monitor: &Monitor) -> Result<Option<Incident>> {
		let Some(active) = self.store.find_active(monitor.id).await? else {
			return Ok(None);
		};

		let resolved = self.store.resolve(active.id, Utc::now()).await?;
		info!(incident_id = resolved.id, "incident resolved");

		self.mirror_best_effort(&resolved).await;
		Ok(Some(resolved))
	}

	/// The relational row is authoritative; a failed mirror write converges
	/// on the next probe that touches the incident.
	async fn mirror_best_effort(&self, incident: &Incident) {
		if let Err(e) = self.mirror.mirror(incident).await {
			warn!(incident_id = incident.id, error = %e, "failed to mirror incident to cache");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use chrono::{DateTime, Utc};
	use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
	use std::sync::Mutex;
	use vigil_core::{IncidentCreationCriteria, IncidentStatus, MonitorId, MonitorStatus};
	use vigil_server_db::DbError;

	struct MemoryIncidentStore {
		incidents: Mutex<Vec<Incident>>,
		next_id: AtomicUsize,
	}

	impl MemoryIncidentStore {
		fn new() -> Self {
			Self {
				incidents: Mutex::new(Vec::new()),
				next_id: AtomicUsize::new(1),
			}
		}

		fn with_incident(status: IncidentStatus) -> Self {
			let store = Self::new();
			store.incidents.lock().unwrap().push(Incident {
				id: 99,
				monitor_id: MonitorId(1),
				title: "Incident for monitor: api".to_string(),
				description: "seeded".to_string(),
				incident_type: GradedStatus::MajorOutage,
				incident_status: status,
				notify_subscribers: false,
				created_at: Utc::now(),
				updated_at: Utc::now(),
			});
			store
		}

		fn rows(&self) -> Vec<Incident> {
			self.incidents.lock().unwrap().clone()
		}
	}

	#[async_trait]
	impl IncidentStore for MemoryIncidentStore {
		async fn find_active(&self, monitor_id: MonitorId) -> vigil_server_db::Result<Option<Incident>> {
			Ok(self
				.incidents
				.lock()
				.unwrap()
				.iter()
				.find(|i| i.monitor_id == monitor_id && i.is_active())
				.cloned())
		}

		async fn insert(&self, incident: &NewIncident) -> vigil_server_db::Result<Incident> {
			let now = Utc::now();
			let stored = Incident {
				id: self.next_id.fetch_add(1, Ordering::SeqCst) as i64,
				monitor_id: incident.monitor_id,
				title: incident.title.clone(),
				description: incident.description.clone(),
				incident_type: incident.incident_type,
				incident_status: IncidentStatus::Open,
				notify_subscribers: incident.notify_subscribers,
				created_at: now,
				updated_at: now,
			};
			self.incidents.lock().unwrap().push(stored.clone());
			Ok(stored)
		}

		async fn resolve(
			&self,
			incident_id: i64,
			at: DateTime<Utc>,
		) -> vigil_server_db::Result<Incident> {
			let mut incidents = self.incidents.lock().unwrap();
			let incident = incidents
				.iter_mut()
				.find(|i| i.id == incident_id)
				.ok_or_else(|| DbError::NotFound(format!("incident {}", incident_id)))?;
			incident.incident_status = IncidentStatus::Resolved;
			incident.updated_at = at;
			Ok(incident.clone())
		}
	}

	struct RecordingMirror {
		mirrored: Mutex<Vec<Incident>>,
		fail: AtomicBool,
	}

	impl RecordingMirror {
		fn new() -> Self {
			Self {
				mirrored: Mutex::new(Vec::new()),
				fail: AtomicBool::new(false),
			}
		}

		fn failing() -> Self {
			let mirror = Self::new();
			mirror.fail.store(true, Ordering::SeqCst);
			mirror
		}

		fn count(&self) -> usize {
			self.mirrored.lock().unwrap().len()
		}
	}

	#[async_trait]
	impl IncidentMirror for RecordingMirror {
		async fn mirror(&self, incident: &Incident) -> vigil_server_cache::Result<()> {
			if self.fail.load(Ordering::SeqCst) {
				return Err(vigil_server_cache::CacheError::Decode(
					"mirror unavailable".to_string(),
				));
			}
			self.mirrored.lock().unwrap().push(incident.clone());
			Ok(())
		}
	}

	fn monitor() -> Monitor {
		Monitor {
			id: MonitorId(1),
			name: "api".to_string(),
			url: "https://example.com/health".to_string(),
			status: MonitorStatus::Active,
			interval: "@every 30s".to_string(),
			expected_status: None,
			timeout_ms: None,
			auto_incident: true,
			auto_resolve_incident: true,
			threshold_classification: false,
			incident_creation_criteria: IncidentCreationCriteria::Immediate,
			service_degraded_threshold: None,
			partial_outage_threshold: None,
			major_outage_threshold: None,
			escalation_window_minutes: None,
			group_id: None,
			group_name: None,
		}
	}

	fn engine(
		store: Arc<MemoryIncidentStore>,
		mirror: Arc<RecordingMirror>,
	) -> IncidentEngine {
		IncidentEngine::new(store, mirror)
	}

	#[tokio::test]
	async fn failure_opens_one_incident() {
		let store = Arc::new(MemoryIncidentStore::new());
		let mirror = Arc::new(RecordingMirror::new());
		let engine = engine(Arc::clone(&store), Arc::clone(&mirror));

		let opened = engine
			.open_if_needed(&monitor(), GradedStatus::MajorOutage)
			.await
			.unwrap()
			.unwrap();

		assert_eq!(opened.incident_status, IncidentStatus::Open);
		assert_eq!(opened.incident_type, GradedStatus::MajorOutage);
		assert_eq!(opened.title, "Incident for monitor: api");
		assert_eq!(store.rows().len(), 1);
		assert_eq!(mirror.count(), 1);
	}

	#[tokio::test]
	async fn duplicate_open_is_suppressed() {
		let store = Arc::new(MemoryIncidentStore::new());
		let mirror = Arc::new(RecordingMirror::new());
		let engine = engine(Arc::clone(&store), Arc::clone(&mirror));

		engine
			.open_if_needed(&monitor(), GradedStatus::MajorOutage)
			.await
			.unwrap();
		let second = engine
			.open_if_needed(&monitor(), GradedStatus::PartialOutage)
			.await
			.unwrap();

		assert!(second.is_none());
		assert_eq!(store.rows().len(), 1);
		assert_eq!(mirror.count(), 1);
	}

	#[tokio::test]
	async fn monitoring_counts_as_active_for_suppression() {
		let store = Arc::new(MemoryIncidentStore::with_incident(IncidentStatus::Monitoring));
		let mirror = Arc::new(RecordingMirror::new());
		let engine = engine(Arc::clone(&store), mirror);

		let opened = engine
			.open_if_needed(&monitor(), GradedStatus::MajorOutage)
			.await
			.unwrap();

		assert!(opened.is_none());
		assert_eq!(store.rows().len(), 1);
	}

	#[tokio::test]
	async fn operational_probe_never_opens() {
		let store = Arc::new(MemoryIncidentStore::new());
		let mirror = Arc::new(RecordingMirror::new());
		let engine = engine(Arc::clone(&store), mirror);

		let opened = engine
			.open_if_needed(&monitor(), GradedStatus::Operational)
			.await
			.unwrap();

		assert!(opened.is_none());
		assert!(store.rows().is_empty());
	}

	#[tokio::test]
	async fn recovery_resolves_active_incident() {
		let store = Arc::new(MemoryIncidentStore::with_incident(IncidentStatus::Open));
		let mirror = Arc::new(RecordingMirror::new());
		let engine = engine(Arc::clone(&store), Arc::clone(&mirror));

		let resolved = engine.resolve_if_open(&monitor()).await.unwrap().unwrap();

		assert_eq!(resolved.incident_status, IncidentStatus::Resolved);
		assert_eq!(store.rows()[0].incident_status, IncidentStatus::Resolved);
		assert_eq!(mirror.count(), 1);

		// A second recovery has nothing left to resolve.
		let again = engine.resolve_if_open(&monitor()).await.unwrap();
		assert!(again.is_none());
	}

	#[tokio::test]
	async fn recovery_resolves_monitoring_incident() {
		let store = Arc::new(MemoryIncidentStore::with_incident(IncidentStatus::Monitoring));
		let mirror = Arc::new(RecordingMirror::new());
		let engine = engine(Arc::clone(&store), mirror);

		let resolved = engine.resolve_if_open(&monitor()).await.unwrap().unwrap();
		assert_eq!(resolved.incident_status, IncidentStatus::Resolved);
	}

	#[tokio::test]
	async fn resolve_without_active_incident_is_noop() {
		let store = Arc::new(MemoryIncidentStore::new());
		let mirror = Arc::new(RecordingMirror::new());
		let engine = engine(store, Arc::clone(&mirror));

		let resolved = engine.resolve_if_open(&monitor()).await.unwrap();
		assert!(resolved.is_none());
		assert_eq!(mirror.count(), 0);
	}

	#[tokio::test]
	async fn mirror_failure_does_not_undo_durable_write() {
		let store = Arc::new(MemoryIncidentStore::new());
		let mirror = Arc::new(RecordingMirror::failing());
		let engine = engine(Arc::clone(&store), mirror);

		let opened = engine
			.open_if_needed(&monitor(), GradedStatus::MajorOutage)
			.await
			.unwrap();

		assert!(opened.is_some());
		assert_eq!(store.rows().len(), 1);
	}
}
