// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP router construction.

use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes;

/// Build the service router. The HTTP surface is liveness only; all
/// business state lives in the cache and the relational store.
pub fn create_router() -> Router {
	Router::new()
		.route("/api/v1/health", get(routes::health::health_check))
		.layer(TraceLayer::new_for_http())
		.layer(cors_layer())
}

/// Permit any origin while keeping credentials allowed: a wildcard origin
/// cannot be combined with credentials, so the request origin is mirrored.
fn cors_layer() -> CorsLayer {
	CorsLayer::new()
		.allow_origin(AllowOrigin::mirror_request())
		.allow_methods([
			Method::GET,
			Method::POST,
			Method::PUT,
			Method::DELETE,
			Method::OPTIONS,
		])
		.allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
		.expose_headers([header::CONTENT_LENGTH])
		.allow_credentials(true)
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::body::Body;
	use axum::http::{Request, StatusCode};
	use http_body_util::BodyExt;
	use tower::ServiceExt;

	#[tokio::test]
	async fn health_returns_ok_body() {
		let app = create_router();

		let response = app
			.oneshot(
				Request::builder()
					.uri("/api/v1/health")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::OK);

		let body = response.into_body().collect().await.unwrap().to_bytes();
		let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
		assert_eq!(json["status"], 200);
		assert_eq!(json["message"], "ok");
	}

	#[tokio::test]
	async fn cors_mirrors_origin_and_allows_credentials() {
		let app = create_router();

		let response = app
			.oneshot(
				Request::builder()
					.method(Method::OPTIONS)
					.uri("/api/v1/health")
					.header(header::ORIGIN, "https://status.example.com")
					.header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();

		let headers = response.headers();
		assert_eq!(
			headers
				.get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
				.and_then(|v| v.to_str().ok()),
			Some("https://status.example.com")
		);
		assert_eq!(
			headers
				.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
				.and_then(|v| v.to_str().ok()),
			Some("true")
		);
	}

	#[tokio::test]
	async fn unknown_routes_are_not_found() {
		let app = create_router();

		let response = app
			.oneshot(
				Request::builder()
					.uri("/api/v1/monitors")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::NOT_FOUND);
	}
}
