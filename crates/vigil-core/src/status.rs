// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Graded operational statuses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Graded status of a monitor as observed by a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradedStatus {
	/// Service is working normally.
	Operational,
	/// Failure indicator exceeds the minimal threshold.
	ServiceDegraded,
	/// Failure indicator is between the degraded and critical thresholds.
	PartialOutage,
	/// Failure indicator meets or exceeds the critical threshold.
	MajorOutage,
}

impl GradedStatus {
	/// Stable wire name, also used as the per-day metrics counter field.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Operational => "operational",
			Self::ServiceDegraded => "service_degraded",
			Self::PartialOutage => "partial_outage",
			Self::MajorOutage => "major_outage",
		}
	}

	pub fn is_operational(&self) -> bool {
		matches!(self, Self::Operational)
	}
}

impl fmt::Display for GradedStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for GradedStatus {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"operational" => Ok(Self::Operational),
			"service_degraded" => Ok(Self::ServiceDegraded),
			"partial_outage" => Ok(Self::PartialOutage),
			"major_outage" => Ok(Self::MajorOutage),
			_ => Err(CoreError::UnknownGradedStatus(s.to_string())),
		}
	}
}
