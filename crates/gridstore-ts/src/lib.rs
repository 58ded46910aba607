//! # gridstore-ts: wide-to-long time-series materialization
//!
//! Source profiles are wide: one row per timestamp, one column per owning
//! entity. Each column becomes a time-series header bound to its owner plus
//! one point row per timestamp.
//!
//! ```
//! use gridstore_core::{PlanningRegion, TimeSeriesKind};
//! use gridstore_db::{SchemaStore, Store};
//! use gridstore_ts::{materialize_column, PeriodRow, SeriesSpec, TimeAxis};
//!
//! let store = Store::open_in_memory().unwrap();
//! store.apply_default().unwrap();
//! let region = store.insert_planning_region(&PlanningRegion::for_area(1)).unwrap();
//!
//! let rows: Vec<_> = (1..=4).map(|period| PeriodRow { year: 2020, month: 1, day: 1, period }).collect();
//! let axis = TimeAxis::from_periods(&rows, 5).unwrap();
//! let spec = SeriesSpec::real_time("RT Load");
//!
//! let id = materialize_column(&store, &spec, &axis, &[1.0, 2.0, 3.0, 4.0], region.entity).unwrap();
//! assert_eq!(store.point_count(TimeSeriesKind::Static, id).unwrap(), 4);
//! ```

use gridstore_core::{
    EntityId, GridError, GridResult, TimeSeriesHeader, TimeSeriesId, TimeSeriesKind,
    TimeSeriesPoint,
};
use gridstore_db::Store;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

pub mod axis;

pub use axis::{parse_datetime, period_to_timestamp, PeriodRow, TimeAxis, ISO_FORMAT};

/// Resolution of day-ahead series, in true milliseconds.
///
/// Databases built by earlier loaders hold 3600 here (seconds written into
/// `resolution_ms`); headers from this crate differ on purpose.
pub const HOURLY_MS: i64 = 3_600_000;
/// Resolution of real-time series, in true milliseconds.
///
/// Earlier loaders wrote 300 for the same five-minute series.
pub const FIVE_MINUTE_MS: i64 = 300_000;

/// How a header's `length` is derived from its axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthRule {
    /// Number of rows, which equals the number of points written
    #[default]
    RowCount,
    /// Whole hours between the first and last timestamp
    ElapsedHours,
}

impl LengthRule {
    pub fn length(self, axis: &TimeAxis) -> i64 {
        match self {
            LengthRule::RowCount => axis.len() as i64,
            LengthRule::ElapsedHours => axis.elapsed_hours(),
        }
    }
}

/// Header fields shared by every column of one wide table.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub name: String,
    pub kind: TimeSeriesKind,
    pub resolution_ms: i64,
    pub horizon: Option<i64>,
    pub interval: Option<i64>,
    pub length_rule: LengthRule,
    pub features: Option<String>,
    pub metadata: Option<String>,
}

impl SeriesSpec {
    /// Hourly deterministic forecast.
    pub fn day_ahead(name: impl Into<String>) -> Self {
        Self::new(name, TimeSeriesKind::DeterministicForecast, HOURLY_MS)
    }

    /// Five-minute static series.
    pub fn real_time(name: impl Into<String>) -> Self {
        Self::new(name, TimeSeriesKind::Static, FIVE_MINUTE_MS)
    }

    pub fn new(name: impl Into<String>, kind: TimeSeriesKind, resolution_ms: i64) -> Self {
        Self {
            name: name.into(),
            kind,
            resolution_ms,
            horizon: Some(1),
            interval: Some(1),
            length_rule: LengthRule::RowCount,
            features: None,
            metadata: None,
        }
    }

    pub fn with_length_rule(mut self, rule: LengthRule) -> Self {
        self.length_rule = rule;
        self
    }

    /// Record the value unit in `features`, e.g. `{"unit":"MW"}`.
    pub fn with_unit(mut self, unit: &str) -> Self {
        self.features = Some(serde_json::json!({ "unit": unit }).to_string());
        self
    }

    pub fn with_metadata(mut self, metadata: &serde_json::Value) -> Self {
        self.metadata = Some(metadata.to_string());
        self
    }

    fn header(&self, axis: &TimeAxis) -> GridResult<TimeSeriesHeader> {
        let initial_timestamp = axis
            .initial_timestamp()
            .ok_or_else(|| GridError::Parse(format!("'{}' has no rows", self.name)))?;
        Ok(TimeSeriesHeader {
            kind: self.kind,
            name: self.name.clone(),
            initial_timestamp,
            resolution_ms: self.resolution_ms,
            horizon: self.horizon,
            interval: self.interval,
            length: self.length_rule.length(axis),
            uuid: Some(Uuid::new_v4().to_string()),
            features: self.features.clone(),
            metadata: self.metadata.clone(),
        })
    }
}

/// Write one column as a series owned by `owner`.
pub fn materialize_column(
    store: &Store,
    spec: &SeriesSpec,
    axis: &TimeAxis,
    values: &[f64],
    owner: EntityId,
) -> GridResult<TimeSeriesId> {
    if values.len() != axis.len() {
        return Err(GridError::Parse(format!(
            "'{}' has {} values for {} timestamps",
            spec.name,
            values.len(),
            axis.len()
        )));
    }

    let header = spec.header(axis)?;
    let series = store.insert_time_series(&header)?;
    store.associate_time_series(series, owner)?;

    let points: Vec<TimeSeriesPoint> = axis
        .iso()
        .zip(values)
        .map(|(timestamp, &value)| TimeSeriesPoint {
            timestamp,
            value,
            uuid: Some(Uuid::new_v4().to_string()),
        })
        .collect();
    store.insert_points(spec.kind, series, &points)?;

    debug!(
        name = %spec.name,
        series = series.value(),
        owner = owner.value(),
        points = points.len(),
        "materialized time series"
    );
    Ok(series)
}

/// Write every `(column key, values)` pair as its own series.
///
/// The owner of each column is resolved from its key before anything for
/// that column is written, so a failed lookup leaves no orphan header.
pub fn materialize_wide<F>(
    store: &Store,
    spec: &SeriesSpec,
    axis: &TimeAxis,
    columns: &[(String, Vec<f64>)],
    mut resolve_owner: F,
) -> GridResult<Vec<TimeSeriesId>>
where
    F: FnMut(&str) -> GridResult<EntityId>,
{
    columns
        .iter()
        .map(|(key, values)| {
            let owner = resolve_owner(key)?;
            materialize_column(store, spec, axis, values, owner)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use gridstore_core::{EntityType, NaturalKey, PlanningRegion};
    use gridstore_db::SchemaStore;

    fn store_with_regions(areas: &[i64]) -> Store {
        let store = Store::open_in_memory().unwrap();
        store.apply_default().unwrap();
        for &area in areas {
            store.insert_planning_region(&PlanningRegion::for_area(area)).unwrap();
        }
        store
    }

    #[test]
    fn resolutions_are_milliseconds() {
        assert_eq!(SeriesSpec::day_ahead("DA Load").resolution_ms, 60 * 60 * 1000);
        assert_eq!(SeriesSpec::real_time("RT Load").resolution_ms, 5 * 60 * 1000);
    }

    fn hourly_axis(hours: u32) -> TimeAxis {
        let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        TimeAxis::new((0..hours).map(|h| day.and_hms_opt(h, 0, 0).unwrap()).collect())
    }

    fn region_owner(store: &Store) -> impl FnMut(&str) -> GridResult<EntityId> + '_ {
        move |key| {
            let area: i64 = key
                .parse()
                .map_err(|_| GridError::Parse(format!("region column '{}'", key)))?;
            store.require(EntityType::PlanningRegions, &NaturalKey::Int(area))
        }
    }

    #[test]
    fn one_header_per_column_and_points_match_length() {
        let store = store_with_regions(&[1, 2]);
        let axis = hourly_axis(24);
        let spec = SeriesSpec::day_ahead("DA Load").with_unit("MW");
        let columns = vec![
            ("1".to_string(), vec![10.0; 24]),
            ("2".to_string(), vec![20.0; 24]),
        ];

        let ids = materialize_wide(&store, &spec, &axis, &columns, region_owner(&store)).unwrap();
        assert_eq!(ids.len(), 2);
        for id in ids {
            let (length, resolution, features): (i64, i64, String) = store
                .conn()
                .query_row(
                    "SELECT length, resolution_ms, features FROM time_series WHERE id = ?1",
                    [id.value()],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .unwrap();
            assert_eq!(length, 24);
            assert_eq!(resolution, HOURLY_MS);
            assert_eq!(features, r#"{"unit":"MW"}"#);
            assert_eq!(
                store.point_count(TimeSeriesKind::DeterministicForecast, id).unwrap(),
                length
            );
        }
    }

    #[test]
    fn elapsed_hours_rule() {
        let store = store_with_regions(&[1]);
        let axis = hourly_axis(24);
        let spec = SeriesSpec::day_ahead("DA Load").with_length_rule(LengthRule::ElapsedHours);
        let owner = store.require(EntityType::PlanningRegions, &NaturalKey::Int(1)).unwrap();

        let id = materialize_column(&store, &spec, &axis, &[0.0; 24], owner).unwrap();
        let length: i64 = store
            .conn()
            .query_row("SELECT length FROM time_series WHERE id = ?1", [id.value()], |row| row.get(0))
            .unwrap();
        assert_eq!(length, 23);
        assert_eq!(store.point_count(TimeSeriesKind::DeterministicForecast, id).unwrap(), 24);
    }

    #[test]
    fn unresolved_owner_aborts_without_orphan_header() {
        let store = store_with_regions(&[1]);
        let axis = hourly_axis(2);
        let spec = SeriesSpec::real_time("RT Load");
        let columns = vec![
            ("1".to_string(), vec![1.0, 2.0]),
            ("7".to_string(), vec![1.0, 2.0]),
        ];

        let err = materialize_wide(&store, &spec, &axis, &columns, region_owner(&store)).unwrap_err();
        assert!(matches!(err, GridError::UnresolvedReference { ref key, .. } if key == "7"));
        // the first column was written and committed, the failing one left nothing behind
        assert_eq!(store.row_count("time_series").unwrap(), 1);
        assert_eq!(store.row_count("static_time_series").unwrap(), 2);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let store = store_with_regions(&[1]);
        let owner = store.require(EntityType::PlanningRegions, &NaturalKey::Int(1)).unwrap();
        let err = materialize_column(&store, &SeriesSpec::real_time("x"), &hourly_axis(3), &[1.0], owner)
            .unwrap_err();
        assert!(matches!(err, GridError::Parse(_)));
        assert_eq!(store.row_count("time_series").unwrap(), 0);
    }

    #[test]
    fn points_carry_iso_timestamps_and_uuids() {
        let store = store_with_regions(&[1]);
        let owner = store.require(EntityType::PlanningRegions, &NaturalKey::Int(1)).unwrap();
        let id = materialize_column(&store, &SeriesSpec::real_time("RT Load"), &hourly_axis(2), &[5.0, 6.0], owner)
            .unwrap();

        let mut stmt = store
            .conn()
            .prepare("SELECT timestamp, uuid FROM static_time_series WHERE time_series_id = ?1 ORDER BY id")
            .unwrap();
        let rows: Vec<(String, String)> = stmt
            .query_map([id.value()], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows[0].0, "2020-01-01T00:00:00");
        assert_eq!(rows[1].0, "2020-01-01T01:00:00");
        assert_ne!(rows[0].1, rows[1].1);
    }
}
