// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Postgres layer for vigil.
//!
//! This service is the sole writer of the incident table and a reader of the
//! monitor tables (as the fallback behind the cache). Schema is owned by the
//! management tool; no migrations run here.

pub mod error;
pub mod incidents;
pub mod monitors;
pub mod pool;

pub use error::{DbError, Result};
pub use incidents::{IncidentStore, PgIncidentStore};
pub use monitors::PgMonitorStore;
pub use pool::create_pool;
