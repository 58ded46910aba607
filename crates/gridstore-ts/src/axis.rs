//! Time axes of wide tables.
//!
//! RTS-style tables carry `Year, Month, Day, Period` columns where period 1
//! is midnight and each period adds one resolution step. 5-bus-style tables
//! carry a single datetime column.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use gridstore_core::{GridError, GridResult};
use serde::{Deserialize, Serialize};

/// Rendering used for `initial_timestamp` and every point timestamp.
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Timestamp of a 1-indexed period on `date`.
///
/// ```
/// use chrono::NaiveDate;
/// use gridstore_ts::period_to_timestamp;
///
/// let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
/// let ts = period_to_timestamp(day, 3, 5).unwrap();
/// assert_eq!(ts.to_string(), "2020-01-01 00:10:00");
/// ```
pub fn period_to_timestamp(
    date: NaiveDate,
    period: i64,
    resolution_minutes: i64,
) -> GridResult<NaiveDateTime> {
    if period < 1 {
        return Err(GridError::Parse(format!(
            "period must be 1 or greater, got {}",
            period
        )));
    }
    (period - 1)
        .checked_mul(resolution_minutes)
        .and_then(Duration::try_minutes)
        .and_then(|offset| date.and_time(chrono::NaiveTime::MIN).checked_add_signed(offset))
        .ok_or_else(|| GridError::Parse(format!("period {} out of range", period)))
}

/// Parse a datetime cell in any of the accepted textual formats.
pub fn parse_datetime(raw: &str) -> GridResult<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .ok_or_else(|| GridError::Parse(format!("unrecognized datetime '{}'", raw)))
}

/// One `Year, Month, Day, Period` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRow {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub period: i64,
}

/// Ordered timestamps of a wide table, one per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeAxis {
    timestamps: Vec<NaiveDateTime>,
}

impl TimeAxis {
    pub fn new(timestamps: Vec<NaiveDateTime>) -> Self {
        Self { timestamps }
    }

    pub fn from_periods(rows: &[PeriodRow], resolution_minutes: i64) -> GridResult<Self> {
        let timestamps = rows
            .iter()
            .map(|row| {
                let date = NaiveDate::from_ymd_opt(row.year, row.month, row.day).ok_or_else(|| {
                    GridError::Parse(format!(
                        "invalid date {}-{}-{}",
                        row.year, row.month, row.day
                    ))
                })?;
                period_to_timestamp(date, row.period, resolution_minutes)
            })
            .collect::<GridResult<Vec<_>>>()?;
        Ok(Self { timestamps })
    }

    pub fn from_datetimes<S: AsRef<str>>(cells: &[S]) -> GridResult<Self> {
        let timestamps = cells
            .iter()
            .map(|cell| parse_datetime(cell.as_ref()))
            .collect::<GridResult<Vec<_>>>()?;
        Ok(Self { timestamps })
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// First row's timestamp, ISO-formatted.
    pub fn initial_timestamp(&self) -> Option<String> {
        self.timestamps.first().map(|ts| ts.format(ISO_FORMAT).to_string())
    }

    /// Whole hours between the earliest and latest timestamp.
    pub fn elapsed_hours(&self) -> i64 {
        match (self.timestamps.iter().min(), self.timestamps.iter().max()) {
            (Some(min), Some(max)) => (*max - *min).num_hours(),
            _ => 0,
        }
    }

    pub fn iso(&self) -> impl Iterator<Item = String> + '_ {
        self.timestamps.iter().map(|ts| ts.format(ISO_FORMAT).to_string())
    }
}
