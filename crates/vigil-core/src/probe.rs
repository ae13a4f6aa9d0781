// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Probe outcome and history entry types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::GradedStatus;

/// Raw result of one probe against a monitor's URL.
///
/// Outcomes are ephemeral: they feed the classifier and the state recorder
/// and are never persisted individually in the relational store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
	/// Wall-clock start of the probe.
	pub timestamp: DateTime<Utc>,
	/// Whether the transport produced a response before the deadline.
	pub reached: bool,
	/// HTTP status code, when reached.
	pub status_code: Option<u16>,
	/// Elapsed time, including timed-out and failed attempts.
	pub latency_ms: u64,
}

impl ProbeOutcome {
	/// Whether the probe reached the endpoint and saw the expected status.
	pub fn matches(&self, expected_status: u16) -> bool {
		self.reached && self.status_code == Some(expected_status)
	}
}

/// One serialized record in `monitor:{id}:history`.
///
/// `responseTime` is camelCase on the wire; the management tool's readers
/// expect it that way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
	pub timestamp: DateTime<Utc>,
	pub status: GradedStatus,
	#[serde(rename = "responseTime")]
	pub response_time: u64,
}
