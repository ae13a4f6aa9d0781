// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Schedule parsing and next-firing calculation.
//!
//! Monitor intervals are standard 5-field Unix cron expressions, or an
//! `@every <duration>` shortcut for fixed intervals.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use cron::Schedule;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ChecksError, Result};

/// A parsed monitor schedule.
#[derive(Debug, Clone)]
pub enum ScheduleSpec {
	/// Cron expression evaluated in UTC.
	Cron(Schedule),
	/// Fixed interval between firings.
	Every(Duration),
}

impl ScheduleSpec {
	/// Parse a monitor interval: `@every <duration>` or a cron expression.
	pub fn parse(expression: &str) -> Result<Self> {
		let expression = expression.trim();
		if let Some(duration) = expression.strip_prefix("@every") {
			return parse_every(duration.trim()).map(Self::Every);
		}

		let cron_expr = convert_to_cron_crate_format(expression);
		let schedule = Schedule::from_str(&cron_expr)
			.map_err(|e| ChecksError::InvalidSchedule(e.to_string()))?;
		Ok(Self::Cron(schedule))
	}

	/// The next firing strictly after the given time, in UTC.
	pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
		match self {
			Self::Cron(schedule) => schedule.after(&after).next(),
			Self::Every(interval) => {
				let interval = ChronoDuration::from_std(*interval).ok()?;
				after.checked_add_signed(interval)
			}
		}
	}
}

/// Convert a standard 5-field Unix cron expression to the 7-field format
/// expected by the `cron` crate.
///
/// 5-field format: minute hour day-of-month month day-of-week
/// 7-field format: second minute hour day-of-month month day-of-week year
///
/// We add "0" for seconds (run at :00 of each minute) and "*" for year (any
/// year). 6- and 7-field expressions pass through untouched.
fn convert_to_cron_crate_format(expression: &str) -> String {
	let field_count = expression.split_whitespace().count();
	if field_count == 5 {
		format!("0 {} *", expression)
	} else {
		expression.to_string()
	}
}

/// Parse an `@every` duration: one or more `<n><unit>` segments with units
/// `ms`, `s`, `m`, `h` (e.g. "15s", "1m30s", "200ms").
fn parse_every(input: &str) -> Result<Duration> {
	if input.is_empty() {
		return Err(ChecksError::InvalidSchedule(
			"@every requires a duration".to_string(),
		));
	}

	let mut total = Duration::ZERO;
	let mut rest = input;
	while !rest.is_empty() {
		let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
		if digits == 0 {
			return Err(ChecksError::InvalidSchedule(format!(
				"invalid @every duration: {}",
				input
			)));
		}
		let (number, remainder) = rest.split_at(digits);
		let value: u64 = number
			.parse()
			.map_err(|_| ChecksError::InvalidSchedule(format!("invalid @every duration: {}", input)))?;

		let units = remainder.len()
			- remainder
				.trim_start_matches(|c: char| c.is_ascii_alphabetic())
				.len();
		let (unit, remainder) = remainder.split_at(units);
		let segment = match unit {
			"ms" => Duration::from_millis(value),
			"s" => Duration::from_secs(value),
			"m" => Duration::from_secs(value * 60),
			"h" => Duration::from_secs(value * 3_600),
			_ => {
				return Err(ChecksError::InvalidSchedule(format!(
					"invalid @every unit in: {}",
					input
				)))
			}
		};
		total += segment;
		rest = remainder;
	}

	if total.is_zero() {
		return Err(ChecksError::InvalidSchedule(
			"@every duration must be positive".to_string(),
		));
	}
	Ok(total)
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[test]
	fn cron_daily_midnight() {
		let spec = ScheduleSpec::parse("0 0 * * *").unwrap();

		let after = Utc.with_ymd_and_hms(2026, 1, 19, 10, 30, 0).unwrap();
		let next = spec.next_after(after).unwrap();

		assert_eq!(next.date_naive().to_string(), "2026-01-20");
		assert_eq!(next.time().to_string(), "00:00:00");
	}

	#[test]
	fn cron_every_15_minutes() {
		let spec = ScheduleSpec::parse("*/15 * * * *").unwrap();

		let after = Utc.with_ymd_and_hms(2026, 1, 19, 10, 32, 0).unwrap();
		let next = spec.next_after(after).unwrap();

		assert_eq!(next.time().to_string(), "10:45:00");
	}

	#[test]
	fn six_field_expression_passes_through() {
		let spec = ScheduleSpec::parse("*/10 * * * * *").unwrap();

		let after = Utc.with_ymd_and_hms(2026, 1, 19, 10, 32, 5).unwrap();
		let next = spec.next_after(after).unwrap();

		assert_eq!(next.time().to_string(), "10:32:10");
	}

	#[test]
	fn every_shortcut_adds_interval() {
		let spec = ScheduleSpec::parse("@every 30s").unwrap();

		let after = Utc.with_ymd_and_hms(2026, 1, 19, 10, 30, 0).unwrap();
		let next = spec.next_after(after).unwrap();

		assert_eq!(next.time().to_string(), "10:30:30");
	}

	#[test]
	fn every_supports_compound_durations() {
		assert!(matches!(
			ScheduleSpec::parse("@every 1m30s").unwrap(),
			ScheduleSpec::Every(d) if d == Duration::from_secs(90)
		));
		assert!(matches!(
			ScheduleSpec::parse("@every 200ms").unwrap(),
			ScheduleSpec::Every(d) if d == Duration::from_millis(200)
		));
		assert!(matches!(
			ScheduleSpec::parse("@every 2h").unwrap(),
			ScheduleSpec::Every(d) if d == Duration::from_secs(7_200)
		));
	}

	#[test]
	fn invalid_expressions_are_rejected() {
		assert!(ScheduleSpec::parse("not a cron").is_err());
		assert!(ScheduleSpec::parse("@every").is_err());
		assert!(ScheduleSpec::parse("@every fast").is_err());
		assert!(ScheduleSpec::parse("@every 0s").is_err());
		assert!(ScheduleSpec::parse("@every 10d").is_err());
	}
}
