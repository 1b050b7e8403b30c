//! Schedules for periodic commands.
//!
//! Two spellings are accepted: `@every <n><unit>` (units `s`, `m`, `h`, `d`)
//! and cron expressions with 5, 6 or 7 fields.

use std::{fmt, str::FromStr, time::Duration};

use {
    chrono::{DateTime, Utc},
    cron::Schedule,
};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub enum PeriodicSchedule {
    Every(Duration),
    Cron { expr: String, schedule: Schedule },
}

impl PeriodicSchedule {
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if let Some(rest) = spec.strip_prefix("@every") {
            return parse_duration(rest.trim())
                .map(Self::Every)
                .map_err(|reason| Error::invalid_schedule(spec, reason));
        }

        // The `cron` crate wants a seconds field; classic 5-field expressions
        // get one prepended.
        let normalized = match spec.split_whitespace().count() {
            5 => format!("0 {spec}"),
            6 | 7 => spec.to_string(),
            n => {
                return Err(Error::invalid_schedule(
                    spec,
                    format!("expected 5 to 7 cron fields, got {n}"),
                ));
            },
        };
        let schedule = Schedule::from_str(&normalized)?;
        Ok(Self::Cron {
            expr: spec.to_string(),
            schedule,
        })
    }

    /// Fire every `minutes` minutes, aligned to the wall clock.
    pub fn every_minutes(minutes: u32) -> Result<Self> {
        if minutes == 0 {
            return Err(Error::invalid_schedule("0", "interval must be > 0"));
        }
        Self::parse(&format!("0 */{minutes} * * * *"))
    }

    /// Next fire time strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Every(interval) => {
                let step = chrono::Duration::from_std(*interval).ok()?;
                now.checked_add_signed(step)
            },
            Self::Cron { schedule, .. } => schedule.after(&now).next(),
        }
    }

    /// Time to wait from `now` until the next fire.
    pub fn delay_from(&self, now: DateTime<Utc>) -> Option<Duration> {
        let next = self.next_after(now)?;
        (next - now).to_std().ok()
    }
}

impl fmt::Display for PeriodicSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Every(d) => write!(f, "@every {}s", d.as_secs()),
            Self::Cron { expr, .. } => f.write_str(expr),
        }
    }
}

fn parse_duration(input: &str) -> std::result::Result<Duration, String> {
    if input.is_empty() {
        return Err("empty duration".into());
    }
    let split = input
        .find(|c: char| c.is_alphabetic())
        .ok_or_else(|| format!("duration missing unit suffix (s/m/h/d): {input}"))?;
    let (num, unit) = input.split_at(split);
    let value: u64 = num
        .parse()
        .map_err(|_| format!("invalid number in duration: {num}"))?;
    if value == 0 {
        return Err("duration must be > 0".into());
    }
    let scale = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 3_600,
        "d" => 86_400,
        _ => return Err(format!("unknown duration suffix: {unit} (expected s/m/h/d)")),
    };
    let secs = value
        .checked_mul(scale)
        .ok_or_else(|| format!("invalid number in duration: {num}"))?;
    Ok(Duration::from_secs(secs))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {chrono::TimeZone, rstest::rstest};

    use super::*;

    #[rstest]
    #[case("@every 1m", 60)]
    #[case("@every 30s", 30)]
    #[case("@every  2h", 7_200)]
    #[case("@every 1d", 86_400)]
    fn parses_every(#[case] spec: &str, #[case] secs: u64) {
        match PeriodicSchedule::parse(spec).unwrap() {
            PeriodicSchedule::Every(d) => assert_eq!(d.as_secs(), secs),
            other => panic!("expected Every, got {other:?}"),
        }
    }

    #[rstest]
    #[case("@every")]
    #[case("@every 0m")]
    #[case("@every 10")]
    #[case("@every 5x")]
    #[case("not a cron")]
    #[case("* * *")]
    #[case("@every 18446744073709551615d")]
    #[case("@every 307445734561825861m")]
    fn rejects_bad_specs(#[case] spec: &str) {
        assert!(PeriodicSchedule::parse(spec).is_err());
    }

    #[test]
    fn every_adds_interval() {
        let s = PeriodicSchedule::parse("@every 1m").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 30).unwrap();
        let next = s.next_after(now).unwrap();
        assert_eq!((next - now).num_seconds(), 60);
    }

    #[test]
    fn five_field_cron_gets_seconds() {
        let s = PeriodicSchedule::parse("*/5 * * * *").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 10, 2, 0).unwrap();
        let next = s.next_after(now).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 2, 1, 10, 5, 0).unwrap());
        assert_eq!(s.to_string(), "*/5 * * * *");
    }

    #[test]
    fn every_minutes_aligns_to_clock() {
        let s = PeriodicSchedule::every_minutes(1).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 10, 2, 15).unwrap();
        assert_eq!(
            s.next_after(now).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 10, 3, 0).unwrap()
        );
        assert!(PeriodicSchedule::every_minutes(0).is_err());
    }
}
