// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Monitor types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::CoreError;

/// Default expected HTTP status for a probe.
pub const DEFAULT_EXPECTED_STATUS: u16 = 200;
/// Default probe timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
/// Default escalation lookback window in minutes.
pub const DEFAULT_ESCALATION_WINDOW_MINUTES: u32 = 5;

/// Unique identifier for a monitor. Ids are assigned by the management tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonitorId(pub i64);

impl fmt::Display for MonitorId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for MonitorId {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		s.trim()
			.parse::<i64>()
			.map(Self)
			.map_err(|_| CoreError::InvalidMonitorId(s.to_string()))
	}
}

/// Lifecycle status of a monitor. Only `Active` monitors receive scheduled
/// probes; `Inactive` monitors keep their cached state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorStatus {
	Active,
	Inactive,
}

impl fmt::Display for MonitorStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Active => write!(f, "Active"),
			Self::Inactive => write!(f, "Inactive"),
		}
	}
}

impl FromStr for MonitorStatus {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"Active" => Ok(Self::Active),
			"Inactive" => Ok(Self::Inactive),
			_ => Err(CoreError::UnknownMonitorStatus(s.to_string())),
		}
	}
}

/// When incident automation opens an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentCreationCriteria {
	/// Open according to the graded threshold classification.
	Threshold,
	/// Open on any non-operational probe.
	Immediate,
}

impl IncidentCreationCriteria {
	/// Decode the management-tool value; anything unrecognized means
	/// open-on-any-failure.
	pub fn parse_or_default(s: &str) -> Self {
		match s {
			"threshold" => Self::Threshold,
			_ => Self::Immediate,
		}
	}
}

impl fmt::Display for IncidentCreationCriteria {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Threshold => write!(f, "threshold"),
			Self::Immediate => write!(f, "immediate"),
		}
	}
}

/// A configured HTTP endpoint probed on a schedule.
///
/// Monitor definitions are written by the management tool; this service only
/// reads them. Optional probe parameters default at the accessor so a decoded
/// monitor always has a usable probe configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monitor {
	pub id: MonitorId,
	pub name: String,
	pub url: String,
	pub status: MonitorStatus,

	/// Cron expression (5-field, or an `@every` shortcut).
	pub interval: String,

	pub expected_status: Option<u16>,
	pub timeout_ms: Option<u64>,

	// Incident policy
	pub auto_incident: bool,
	pub auto_resolve_incident: bool,
	pub threshold_classification: bool,
	pub incident_creation_criteria: IncidentCreationCriteria,

	// Thresholds in percent, monotonically non-decreasing when present.
	pub service_degraded_threshold: Option<u8>,
	pub partial_outage_threshold: Option<u8>,
	pub major_outage_threshold: Option<u8>,

	pub escalation_window_minutes: Option<u32>,

	pub group_id: Option<i64>,
	pub group_name: Option<String>,
}

impl Monitor {
	pub fn expected_status(&self) -> u16 {
		self.expected_status.unwrap_or(DEFAULT_EXPECTED_STATUS)
	}

	pub fn timeout_ms(&self) -> u64 {
		self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms())
	}

	pub fn escalation_window_minutes(&self) -> u32 {
		self.escalation_window_minutes
			.unwrap_or(DEFAULT_ESCALATION_WINDOW_MINUTES)
	}

	/// The threshold triple, only when all three are configured.
	pub fn thresholds(&self) -> Option<(u8, u8, u8)> {
		match (
			self.service_degraded_threshold,
			self.partial_outage_threshold,
			self.major_outage_threshold,
		) {
			(Some(deg), Some(part), Some(maj)) => Some((deg, part, maj)),
			_ => None,
		}
	}

	pub fn is_active(&self) -> bool {
		self.status == MonitorStatus::Active
	}
}

/// A monitor group, denormalized onto monitors for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorGroup {
	pub id: i64,
	pub name: String,
	pub visibility: bool,
}
