// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Outbound probe execution.

use chrono::Utc;
use reqwest::Client;
use std::time::Instant;
use tracing::debug;

use vigil_core::{Monitor, ProbeOutcome};

/// Issues one HTTP GET per monitor with the monitor's own deadline.
///
/// No retries: a transport failure or an elapsed deadline is an outcome,
/// not an error.
#[derive(Clone)]
pub struct ProbeExecutor {
	client: Client,
}

impl ProbeExecutor {
	pub fn new() -> Self {
		let client = Client::builder()
			.user_agent(concat!("vigil/", env!("CARGO_PKG_VERSION")))
			.build()
			.expect("failed to build HTTP client");
		Self { client }
	}

	/// Probe the monitor's URL once.
	///
	/// The per-request timeout is `monitor.timeout_ms()`; elapsed wall-clock
	/// time is reported either way. The response body is discarded.
	pub async fn probe(&self, monitor: &Monitor) -> ProbeOutcome {
		let timestamp = Utc::now();
		let started = Instant::now();

		let result = self
			.client
			.get(&monitor.url)
			.timeout(monitor.timeout())
			.send()
			.await;
		let latency_ms = started.elapsed().as_millis() as u64;

		match result {
			Ok(response) => ProbeOutcome {
				timestamp,
				reached: true,
				status_code: Some(response.status().as_u16()),
				latency_ms,
			},
			Err(e) => {
				debug!(monitor_id = %monitor.id, error = %e, "probe did not reach endpoint");
				ProbeOutcome {
					timestamp,
					reached: false,
					status_code: None,
					latency_ms,
				}
			}
		}
	}
}

impl Default for ProbeExecutor {
	fn default() -> Self {
		Self::new()
	}
}
