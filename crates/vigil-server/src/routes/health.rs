// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Liveness HTTP handler.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: u16,
	pub message: String,
}

/// GET /api/v1/health - liveness only.
///
/// Probe failures are never surfaced here; operators observe them via logs
/// and by inspecting cache/store state.
pub async fn health_check() -> Json<HealthResponse> {
	Json(HealthResponse {
		status: 200,
		message: "ok".to_string(),
	})
}
