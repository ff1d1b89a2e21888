//! Relative time spans (`3D`, `4W`, `6M`, `7Y`) and the cutoff instant derived from them.
//!
//! Months and years are fixed-length approximations: a month is 30 days and a
//! year is 365 days. The cutoff is therefore not calendar-aware; `1M` on March 31
//! lands on March 1, not February 28/29.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime};

use crate::core::errors::{PurgeError, Result};

const SECS_PER_DAY: u64 = 86_400;

/// Unit suffix of a [`TimeSpan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Days,
    Weeks,
    /// 30 days.
    Months,
    /// 365 days.
    Years,
}

impl TimeUnit {
    /// All units in suffix order.
    pub const ALL: [Self; 4] = [Self::Days, Self::Weeks, Self::Months, Self::Years];

    /// Parse a unit suffix. Case-sensitive.
    #[must_use]
    pub const fn from_suffix(c: char) -> Option<Self> {
        match c {
            'D' => Some(Self::Days),
            'W' => Some(Self::Weeks),
            'M' => Some(Self::Months),
            'Y' => Some(Self::Years),
            _ => None,
        }
    }

    #[must_use]
    pub const fn suffix(self) -> char {
        match self {
            Self::Days => 'D',
            Self::Weeks => 'W',
            Self::Months => 'M',
            Self::Years => 'Y',
        }
    }

    /// Length of one unit in days.
    #[must_use]
    pub const fn days(self) -> u64 {
        match self {
            Self::Days => 1,
            Self::Weeks => 7,
            Self::Months => 30,
            Self::Years => 365,
        }
    }
}

/// A parsed `<integer><unit>` span. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSpan {
    value: u64,
    unit: TimeUnit,
    duration: Duration,
}

impl TimeSpan {
    /// Build a span from its parts, rejecting values whose duration overflows.
    pub fn new(value: u64, unit: TimeUnit) -> Result<Self> {
        let secs = value
            .checked_mul(unit.days())
            .and_then(|days| days.checked_mul(SECS_PER_DAY))
            .ok_or_else(|| PurgeError::InvalidTimeSpan {
                input: format!("{value}{}", unit.suffix()),
                reason: "duration overflows".to_string(),
            })?;
        Ok(Self {
            value,
            unit,
            duration: Duration::from_secs(secs),
        })
    }

    /// Parse a span such as `"3D"`.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: String| PurgeError::InvalidTimeSpan {
            input: input.to_string(),
            reason,
        };

        let Some(last) = input.chars().last() else {
            return Err(invalid("empty time span".to_string()));
        };
        let unit = TimeUnit::from_suffix(last).ok_or_else(|| {
            invalid(format!(
                "unknown unit {last:?}, expected one of D, W, M, Y"
            ))
        })?;

        let digits = &input[..input.len() - last.len_utf8()];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(format!(
                "value {digits:?} is not a non-negative integer"
            )));
        }
        let value: u64 = digits
            .parse()
            .map_err(|e| invalid(format!("value {digits:?}: {e}")))?;

        Self::new(value, unit).map_err(|_| invalid("duration overflows".to_string()))
    }

    #[must_use]
    pub const fn value(&self) -> u64 {
        self.value
    }

    #[must_use]
    pub const fn unit(&self) -> TimeUnit {
        self.unit
    }

    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Cutoff instant relative to `now`.
    #[must_use]
    pub fn cutoff_from(&self, now: SystemTime) -> Cutoff {
        Cutoff::new(now, self.duration)
    }
}

impl FromStr for TimeSpan {
    type Err = PurgeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

/// Fixed point in time below which files are eligible for deletion.
///
/// Computed once per run; a file is expired iff its modification time is
/// strictly earlier than the cutoff. Cutoffs before 1970 are kept exact. When
/// `now - span` is not representable at all, nothing is old enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cutoff {
    instant: Option<SystemTime>,
}

impl Cutoff {
    #[must_use]
    pub fn new(now: SystemTime, span: Duration) -> Self {
        Self {
            instant: now.checked_sub(span),
        }
    }

    /// `None` when the cutoff lies before the earliest representable time.
    #[must_use]
    pub const fn instant(&self) -> Option<SystemTime> {
        self.instant
    }

    #[must_use]
    pub fn is_expired(&self, modified: SystemTime) -> bool {
        self.instant.is_some_and(|cutoff| modified < cutoff)
    }

    /// RFC 3339 rendering for log lines.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        let Some(instant) = self.instant else {
            return "unbounded".to_string();
        };
        unix_seconds(instant)
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
            .map_or_else(
                || format!("{instant:?}"),
                |dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            )
    }
}

/// Whole seconds relative to the Unix epoch, floored.
fn unix_seconds(instant: SystemTime) -> Option<i64> {
    match instant.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs()).ok(),
        Err(before) => {
            let before = before.duration();
            let secs = i64::try_from(before.as_secs()).ok()?;
            Some(if before.subsec_nanos() > 0 { -secs - 1 } else { -secs })
        }
    }
}
