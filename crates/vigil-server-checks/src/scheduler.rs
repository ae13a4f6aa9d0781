// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Dynamic monitor scheduling.
//!
//! The scheduler owns a private job table mapping monitor ids to running
//! probe-loop tasks. A reconciliation pass aligns that table with the
//! declared monitor set: it runs once at startup and then every 15 seconds,
//! adding jobs for new `Active` monitors, replacing jobs whose cron
//! expression changed, and cancelling jobs for monitors that went `Inactive`
//! or disappeared.
//!
//! Each job captures its monitor by value, so a reconciliation that replaces
//! the job never mutates a running probe's view of its configuration.

use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use vigil_core::{Monitor, MonitorId};

use crate::checker::CheckRunner;
use crate::repository::MonitorSource;
use crate::schedule::ScheduleSpec;

/// How often the job table is reconciled with the declared monitor set.
pub const RECONCILE_INTERVAL: Duration = Duration::from_secs(15);

/// Cooperative cancellation flag for one scheduled job.
#[derive(Clone, Default)]
struct CancellationToken {
	cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
	fn new() -> Self {
		Self::default()
	}

	fn cancel(&self) {
		self.cancelled.store(true, Ordering::SeqCst);
	}

	fn is_cancelled(&self) -> bool {
		self.cancelled.load(Ordering::SeqCst)
	}
}

struct ScheduledJob {
	cron_expression: String,
	cancellation_token: CancellationToken,
	handle: JoinHandle<()>,
}

impl ScheduledJob {
	/// Stop the job immediately. Used when a monitor is replaced, goes
	/// inactive or disappears; process shutdown goes through the broadcast
	/// path instead so in-flight probes finish.
	fn cancel(self) {
		self.cancellation_token.cancel();
		self.handle.abort();
	}
}

pub struct MonitorScheduler {
	source: Arc<dyn MonitorSource>,
	runner: Arc<dyn CheckRunner>,
	jobs: Mutex<HashMap<MonitorId, ScheduledJob>>,
	shutdown_tx: broadcast::Sender<()>,
}

impl MonitorScheduler {
	pub fn new(source: Arc<dyn MonitorSource>, runner: Arc<dyn CheckRunner>) -> Self {
		let (shutdown_tx, _) = broadcast::channel(1);
		Self {
			source,
			runner,
			jobs: Mutex::new(HashMap::new()),
			shutdown_tx,
		}
	}

	/// Run the startup reconciliation, then keep reconciling on the fixed
	/// interval until shutdown.
	pub async fn start(self: Arc<Self>) -> JoinHandle<()> {
		self.reconcile().await;

		let scheduler = Arc::clone(&self);
		let mut shutdown_rx = self.shutdown_tx.subscribe();
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(RECONCILE_INTERVAL);
			ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
			// The interval fires immediately; the startup pass already ran.
			ticker.tick().await;
			loop {
				tokio::select! {
					_ = ticker.tick() => scheduler.reconcile().await,
					_ = shutdown_rx.recv() => break,
				}
			}
		})
	}

	/// Align the job table with the declared monitor set.
	///
	/// A listing failure leaves the table untouched; the next tick retries.
	#[instrument(skip(self))]
	pub async fn reconcile(&self) {
		let monitors = match self.source.list_monitors().await {
			Ok(monitors) => monitors,
			Err(e) => {
				warn!(error = %e, "skipping reconciliation, failed to list monitors");
				return;
			}
		};

		let mut jobs = self.jobs.lock().await;
		let declared: HashSet<MonitorId> = monitors.iter().map(|m| m.id).collect();

		for monitor in monitors {
			if !monitor.is_active() {
				// Inactive monitors lose their job but keep their cached state.
				if let Some(job) = jobs.remove(&monitor.id) {
					info!(monitor_id = %monitor.id, "cancelling job for inactive monitor");
					job.cancel();
				}
				continue;
			}

			if let Some(job) = jobs.get(&monitor.id) {
				if job.cron_expression == monitor.interval {
					continue;
				}
				info!(
					monitor_id = %monitor.id,
					expression = %monitor.interval,
					"replacing job with changed schedule"
				);
				if let Some(job) = jobs.remove(&monitor.id) {
					job.cancel();
				}
			} else {
				info!(
					monitor_id = %monitor.id,
					expression = %monitor.interval,
					"scheduling monitor job"
				);
			}

			let spec = match ScheduleSpec::parse(&monitor.interval) {
				Ok(spec) => spec,
				Err(e) => {
					warn!(
						monitor_id = %monitor.id,
						expression = %monitor.interval,
						error = %e,
						"skipping monitor with invalid schedule"
					);
					continue;
				}
			};

			let id = monitor.id;
			let job = self.spawn_job(monitor, spec);
			jobs.insert(id, job);
		}

		let stale: Vec<MonitorId> = jobs
			.keys()
			.filter(|id| !declared.contains(id))
			.copied()
			.collect();
		for id in stale {
			if let Some(job) = jobs.remove(&id) {
				info!(monitor_id = %id, "cancelling job for removed monitor");
				job.cancel();
			}
		}
	}

	fn spawn_job(&self, monitor: Monitor, spec: ScheduleSpec) -> ScheduledJob {
		let cron_expression = monitor.interval.clone();
		let cancellation_token = CancellationToken::new();
		let job_token = cancellation_token.clone();
		let runner = Arc::clone(&self.runner);
		let mut shutdown_rx = self.shutdown_tx.subscribe();

		let handle = tokio::spawn(async move {
			loop {
				let now = Utc::now();
				let Some(next) = spec.next_after(now) else {
					warn!(monitor_id = %monitor.id, "schedule yields no further firings");
					break;
				};
				let delay = (next - now).to_std().unwrap_or(Duration::ZERO);

				tokio::select! {
					_ = tokio::time::sleep(delay) => {
						if job_token.is_cancelled() {
							break;
						}
						// Awaiting the run before computing the next firing
						// means a probe that outlives its tick skips it; no
						// queueing.
						runner.run(monitor.clone()).await;
					}
					_ = shutdown_rx.recv() => {
						debug!(monitor_id = %monitor.id, "job shutting down");
						break;
					}
				}
			}
		});

		ScheduledJob {
			cron_expression,
			cancellation_token,
			handle,
		}
	}

	/// Broadcast shutdown and wait for job tasks; in-flight probes complete
	/// up to their own deadline.
	pub async fn shutdown(&self) {
		let _ = self.shutdown_tx.send(());

		let mut jobs = self.jobs.lock().await;
		for (_, job) in jobs.drain() {
			let _ = job.handle.await;
		}
		info!("monitor scheduler shut down");
	}

	/// Snapshot of the scheduled jobs and the expressions that produced them.
	pub async fn scheduled_expressions(&self) -> HashMap<MonitorId, String> {
		self.jobs
			.lock()
			.await
			.iter()
			.map(|(id, job)| (*id, job.cron_expression.clone()))
			.collect()
	}
}
