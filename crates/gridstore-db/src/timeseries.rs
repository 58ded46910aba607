//! Time-series rows: headers, owner associations and points.

use gridstore_core::{
    EntityId, GridResult, TimeSeriesHeader, TimeSeriesId, TimeSeriesKind, TimeSeriesPoint,
};
use rusqlite::params;

use crate::Store;

impl Store {
    pub fn insert_time_series(&self, header: &TimeSeriesHeader) -> GridResult<TimeSeriesId> {
        self.conn.execute(
            "INSERT INTO time_series
               (time_series_type, name, initial_timestamp, resolution_ms, horizon, interval, length, uuid, features, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                header.kind.table_name(),
                header.name,
                header.initial_timestamp,
                header.resolution_ms,
                header.horizon,
                header.interval,
                header.length,
                header.uuid,
                header.features,
                header.metadata,
            ],
        )?;
        Ok(TimeSeriesId::new(self.conn.last_insert_rowid()))
    }

    pub fn associate_time_series(&self, series: TimeSeriesId, owner: EntityId) -> GridResult<i64> {
        self.conn.execute(
            "INSERT INTO time_series_associations (time_series_id, owner_id) VALUES (?1, ?2)",
            params![series.value(), owner.value()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Append points to the table for `kind`, one autocommitted row each.
    pub fn insert_points(
        &self,
        kind: TimeSeriesKind,
        series: TimeSeriesId,
        points: &[TimeSeriesPoint],
    ) -> GridResult<usize> {
        let sql = format!(
            "INSERT INTO {} (time_series_id, uuid, timestamp, value) VALUES (?1, ?2, ?3, ?4)",
            kind.table_name()
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        for point in points {
            stmt.execute(params![series.value(), point.uuid, point.timestamp, point.value])?;
        }
        Ok(points.len())
    }

    /// Points stored for `series`.
    pub fn point_count(&self, kind: TimeSeriesKind, series: TimeSeriesId) -> GridResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE time_series_id = ?1",
            kind.table_name()
        );
        Ok(self.conn.query_row(&sql, params![series.value()], |row| row.get(0))?)
    }

    /// Headers owned by `owner`, as `(id, name, kind tag, length)`.
    pub fn time_series_of(&self, owner: EntityId) -> GridResult<Vec<(TimeSeriesId, String, String, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT ts.id, ts.name, ts.time_series_type, ts.length FROM time_series ts
             JOIN time_series_associations tsa ON tsa.time_series_id = ts.id
             WHERE tsa.owner_id = ?1
             ORDER BY ts.id",
        )?;
        let rows = stmt.query_map(params![owner.value()], |row| {
            Ok((
                TimeSeriesId::new(row.get(0)?),
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
            ))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
