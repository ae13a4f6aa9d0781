// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! vigil server binary.
//!
//! Wires the stores to the probe scheduler, starts the reconciliation loop
//! and serves the liveness endpoint until shutdown.

use clap::Parser;
use std::sync::Arc;

use vigil_server::{api, Config};
use vigil_server_cache::{MonitorCache, RedisIncidentMirror, StateRecorder};
use vigil_server_checks::{
	CacheFirstMonitorSource, Checker, IncidentEngine, MonitorScheduler, ProbeExecutor,
};
use vigil_server_db::{PgIncidentStore, PgMonitorStore};

/// vigil - dynamic health-check scheduler.
#[derive(Parser, Debug)]
#[command(name = "vigil-server", about = "Dynamic health-check scheduler", version)]
struct Args {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let _args = Args::parse();

	// Load .env before reading configuration; its absence is only a warning.
	let dotenv = dotenvy::dotenv();

	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "info".into()),
		)
		.init();

	if dotenv.is_err() {
		tracing::warn!("no .env file found");
	}

	let config = Config::from_env();
	tracing::info!(port = config.port, "starting vigil-server");

	// Either store being unreachable at startup is fatal.
	let pool = vigil_server_db::create_pool(&config.postgres_uri).await?;
	let redis = vigil_server_cache::connect(&config.redis_uri).await?;

	let cache = MonitorCache::new(redis.clone());
	let recorder = StateRecorder::new(redis.clone());
	let engine = IncidentEngine::new(
		Arc::new(PgIncidentStore::new(pool.clone())),
		Arc::new(RedisIncidentMirror::new(redis)),
	);
	let checker = Arc::new(Checker::new(
		ProbeExecutor::new(),
		cache.clone(),
		recorder,
		engine,
	));

	let source = Arc::new(CacheFirstMonitorSource::new(
		cache,
		PgMonitorStore::new(pool),
	));
	let scheduler = Arc::new(MonitorScheduler::new(source, checker));
	Arc::clone(&scheduler).start().await;

	let router = api::create_router();
	let addr = config.socket_addr();
	let listener = tokio::net::TcpListener::bind(&addr).await?;
	tracing::info!("listening on {}", addr);

	axum::serve(listener, router)
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	scheduler.shutdown().await;
	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "failed to install shutdown signal handler");
	}
}
