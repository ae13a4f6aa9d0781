// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Incident types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::monitor::MonitorId;
use crate::status::GradedStatus;

/// Lifecycle status of an incident.
///
/// `Monitoring` is set externally (an operator acknowledged the incident and
/// is watching it); this service treats it as equivalent to `Open` for both
/// duplicate suppression and auto-resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
	Open,
	Monitoring,
	Resolved,
}

impl IncidentStatus {
	/// Whether the incident still counts against the one-active-incident
	/// invariant.
	pub fn is_active(&self) -> bool {
		matches!(self, Self::Open | Self::Monitoring)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Open => "open",
			Self::Monitoring => "monitoring",
			Self::Resolved => "resolved",
		}
	}
}

impl fmt::Display for IncidentStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for IncidentStatus {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"open" => Ok(Self::Open),
			"monitoring" => Ok(Self::Monitoring),
			"resolved" => Ok(Self::Resolved),
			_ => Err(CoreError::UnknownIncidentStatus(s.to_string())),
		}
	}
}

/// A durable record that a monitor is (or was) in a non-operational state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
	pub id: i64,
	pub monitor_id: MonitorId,
	pub title: String,
	pub description: String,
	/// Graded status observed when the incident was opened.
	pub incident_type: GradedStatus,
	pub incident_status: IncidentStatus,
	pub notify_subscribers: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Incident {
	pub fn is_active(&self) -> bool {
		self.incident_status.is_active()
	}
}

/// Insert payload for a new incident row.
#[derive(Debug, Clone)]
pub struct NewIncident {
	pub monitor_id: MonitorId,
	pub title: String,
	pub description: String,
	pub incident_type: GradedStatus,
	pub notify_subscribers: bool,
}

impl NewIncident {
	/// Build the insert payload for an automatically detected incident.
	pub fn detected(monitor_id: MonitorId, monitor_name: &str, graded: GradedStatus, at: DateTime<Utc>) -> Self {
		Self {
			monitor_id,
			title: format!("Incident for monitor: {}", monitor_name),
			description: format!("Automatically detected failure at {}", at.to_rfc3339()),
			incident_type: graded,
			notify_subscribers: false,
		}
	}
}
