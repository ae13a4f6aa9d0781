// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Probe outcome classification.
//!
//! Two policy modes map a raw probe outcome to a graded status. The default
//! mode is binary: anything that is not the expected response is a major
//! outage. Threshold mode grades the failure by how much of the monitor's
//! timeout budget the probe consumed, which gives operators hysteresis
//! against transient latency spikes.

use std::collections::HashSet;
use std::sync::Mutex;

use tracing::warn;

use crate::monitor::{Monitor, MonitorId};
use crate::probe::ProbeOutcome;
use crate::status::GradedStatus;

/// Failure indicator for threshold mode: the percentage of the timeout
/// budget consumed, `floor(100 * latency_ms / timeout_ms)`, clamped to
/// `[0, 100]`.
pub fn failure_indicator(latency_ms: u64, timeout_ms: u64) -> u8 {
	if timeout_ms == 0 {
		return 100;
	}
	let pct = latency_ms.saturating_mul(100) / timeout_ms;
	pct.min(100) as u8
}

/// Maps probe outcomes to graded statuses.
///
/// Total over its inputs: every outcome/policy combination yields exactly one
/// of the four statuses. The only state is the set of monitors already warned
/// about an invalid threshold configuration, so the log line fires once per
/// monitor rather than once per probe.
#[derive(Debug, Default)]
pub struct Classifier {
	warned_invalid: Mutex<HashSet<MonitorId>>,
}

impl Classifier {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn classify(&self, monitor: &Monitor, outcome: &ProbeOutcome) -> GradedStatus {
		if outcome.matches(monitor.expected_status()) {
			return GradedStatus::Operational;
		}

		if !monitor.threshold_classification {
			return GradedStatus::MajorOutage;
		}

		// Threshold classification without incident automation is an invalid
		// configuration; treat the probe as a hard failure.
		if !monitor.auto_incident {
			self.warn_invalid_once(monitor);
			return GradedStatus::MajorOutage;
		}

		let Some((degraded, partial, major)) = monitor.thresholds() else {
			warn!(
				monitor_id = %monitor.id,
				"threshold classification enabled with unset thresholds, treating as major outage"
			);
			return GradedStatus::MajorOutage;
		};

		let indicator = failure_indicator(outcome.latency_ms, monitor.timeout_ms());
		if indicator < degraded {
			GradedStatus::Operational
		} else if indicator < partial {
			GradedStatus::ServiceDegraded
		} else if indicator < major {
			GradedStatus::PartialOutage
		} else {
			GradedStatus::MajorOutage
		}
	}

	fn warn_invalid_once(&self, monitor: &Monitor) {
		let mut warned = self
			.warned_invalid
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner());
		if warned.insert(monitor.id) {
			warn!(
				monitor_id = %monitor.id,
				"threshold classification enabled without incident automation, treating failures as major outage"
			);
		}
	}
}
