use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, TimeZone};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Report window selectable by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    Yesterday,
    Last7Days,
    Last30Days,
}

/// Millisecond epoch bounds sent as `startTimestamp` / `endTimestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("no period entered")]
    Empty,

    #[error("unrecognised period: {0}")]
    Unrecognized(String),
}

impl Period {
    pub const ALL: [Period; 4] = [
        Period::Today,
        Period::Yesterday,
        Period::Last7Days,
        Period::Last30Days,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Yesterday => "yesterday",
            Period::Last7Days => "last 7 days",
            Period::Last30Days => "last 30 days",
        }
    }

    /// Resolves the period against the local wall clock.
    pub fn calculate_timestamps(&self) -> TimeRange {
        self.range_at(Local::now())
    }

    /// Resolves the period against `now` in `now`'s time zone.
    pub fn range_at<Tz: TimeZone>(&self, now: DateTime<Tz>) -> TimeRange {
        let end_now = now.timestamp_millis();
        let tz = now.timezone();
        let today = now.date_naive();

        match self {
            Period::Today => TimeRange {
                start_ms: start_of_day(&tz, today).min(end_now),
                end_ms: end_now,
            },
            Period::Yesterday => {
                let yesterday = today.pred_opt().unwrap_or(today);
                TimeRange {
                    start_ms: start_of_day(&tz, yesterday),
                    end_ms: start_of_day(&tz, today).min(end_now),
                }
            }
            Period::Last7Days => TimeRange {
                start_ms: (now - Duration::days(7)).timestamp_millis(),
                end_ms: end_now,
            },
            Period::Last30Days => TimeRange {
                start_ms: (now - Duration::days(30)).timestamp_millis(),
                end_ms: end_now,
            },
        }
    }
}

// Midnight can be skipped or repeated by a DST change; take the first instant
// of the day that exists.
fn start_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> i64 {
    let mut candidate = day.and_time(chrono::NaiveTime::MIN);
    for _ in 0..4 {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return dt.timestamp_millis(),
            LocalResult::Ambiguous(earliest, _) => return earliest.timestamp_millis(),
            LocalResult::None => candidate += Duration::minutes(30),
        }
    }
    tz.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN))
        .timestamp_millis()
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(PeriodError::Empty);
        }

        Period::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == input)
            .ok_or_else(|| PeriodError::Unrecognized(input.to_string()))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
