// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment configuration.

use tracing::warn;

const DEFAULT_PORT: u16 = 8081;
const DEFAULT_POSTGRES_URI: &str = "localhost";
const DEFAULT_REDIS_URI: &str = "localhost";

/// Resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
	/// HTTP listen port.
	pub port: u16,
	/// Relational-store connection string.
	pub postgres_uri: String,
	/// Cache connection string.
	pub redis_uri: String,
}

impl Config {
	/// Load configuration from the environment, defaulting every variable.
	pub fn from_env() -> Self {
		Self {
			port: parse_port(&env_or("PORT", &DEFAULT_PORT.to_string())),
			postgres_uri: env_or("POSTGRES_URI", DEFAULT_POSTGRES_URI),
			redis_uri: env_or("REDIS_URI", DEFAULT_REDIS_URI),
		}
	}

	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("0.0.0.0:{}", self.port)
	}
}

fn env_or(key: &str, default: &str) -> String {
	std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_port(raw: &str) -> u16 {
	match raw.parse() {
		Ok(port) => port,
		Err(_) => {
			warn!(value = %raw, "unparsable PORT, using default");
			DEFAULT_PORT
		}
	}
}
