// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cache key layout.
//!
//! The layout is shared with the management tool; changing any of these
//! breaks the other side.

use chrono::NaiveDate;
use vigil_core::MonitorId;

/// Set of monitor ids (string-encoded integers).
pub const MONITOR_IDS: &str = "monitors:ids";

/// Set of incident ids.
pub const INCIDENT_IDS: &str = "incidents:ids";

/// Hash of monitor fields.
pub fn monitor(id: MonitorId) -> String {
	format!("monitor:{}", id)
}

/// List of JSON-encoded probe outcomes, capped at the retention bound.
pub fn history(id: MonitorId) -> String {
	format!("monitor:{}:history", id)
}

/// Hash of integer counters for one UTC calendar day.
pub fn metrics(id: MonitorId, day: NaiveDate) -> String {
	format!("monitor:{}:metrics:{}", id, day.format("%Y-%m-%d"))
}

/// Hash mirror of an incident row.
pub fn incident(id: i64) -> String {
	format!("incident:{}", id)
}

/// Hash with a monitor group's `name` and `visibility`.
pub fn monitor_group(id: i64) -> String {
	format!("monitor_group:{}", id)
}
