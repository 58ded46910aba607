//! # gridstore-core: entity model and transformation algorithms
//!
//! Domain types shared by every crate of the ingestion engine, plus the pure
//! transformations the importers apply before anything reaches the store.
//!
//! ## Data model
//!
//! Every domain record (a bus, a line, a generator, a region) gets a row in
//! its own table **and** a row in the generic `entities` table. The entity
//! row is addressed by `(entity_type, natural key)`:
//!
//! - [`EntityType`] names the owning table (`balancing_topologies`, ...)
//! - [`NaturalKey`] is the business key: the external id for regions and
//!   buses, the inserted row id for everything else
//! - [`EntityId`] is the durable id every attribute, association and time
//!   series refers to
//!
//! Metadata hangs off entities as [`AttributeValue`]s, so new kinds of
//! metadata never require schema changes.
//!
//! ## Algorithms
//!
//! - [`curve`]: piecewise-linear curves (heat rates, supply and reinforcement
//!   curves) and their blob encoding
//! - [`interchange`]: cross-region branch aggregation
//! - [`participation`]: per-bus share of regional load
//! - [`generator`]: classification of capacity rows into [`GeneratorKind`]
//!
//! ```
//! use gridstore_core::{EntityType, NaturalKey};
//!
//! let key = NaturalKey::from(101);
//! assert_eq!(EntityType::BalancingTopologies.table_name(), "balancing_topologies");
//! assert_eq!(key.to_string(), "101");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod curve;
pub mod diagnostics;
pub mod error;
pub mod generator;
pub mod interchange;
pub mod participation;
pub mod records;
pub mod units;

pub use curve::{PiecewiseLinear, Segment};
pub use diagnostics::{DiagnosticIssue, Diagnostics, PhaseCounts, Severity};
pub use error::{GridError, GridResult};
pub use generator::{GeneratorKind, PrimeMover, ProfileSource, StorageParams, ThermalParams};
pub use interchange::{aggregate_interchanges, BranchRating, InterchangeGroup};
pub use participation::participation_factors;
pub use records::*;
pub use units::{GigawattHours, MegawattHours, Percent};

/// Row id in the generic `entities` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(i64);

/// Row id in the `arcs` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArcId(i64);

/// Row id in the `time_series` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSeriesId(i64);

impl EntityId {
    #[inline]
    pub fn new(value: i64) -> Self {
        EntityId(value)
    }
    #[inline]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl ArcId {
    #[inline]
    pub fn new(value: i64) -> Self {
        ArcId(value)
    }
    #[inline]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TimeSeriesId {
    #[inline]
    pub fn new(value: i64) -> Self {
        TimeSeriesId(value)
    }
    #[inline]
    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Kinds of records that carry an entity row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    PlanningRegions,
    BalancingTopologies,
    TransmissionLines,
    TransmissionInterchanges,
    GenerationUnits,
    StorageUnits,
    SupplyTechnologies,
    TransportTechnologies,
}

impl EntityType {
    pub const ALL: [EntityType; 8] = [
        EntityType::PlanningRegions,
        EntityType::BalancingTopologies,
        EntityType::TransmissionLines,
        EntityType::TransmissionInterchanges,
        EntityType::GenerationUnits,
        EntityType::StorageUnits,
        EntityType::SupplyTechnologies,
        EntityType::TransportTechnologies,
    ];

    /// Name of the owning table, which is also the value of `entities.entity_type`.
    pub fn table_name(self) -> &'static str {
        match self {
            EntityType::PlanningRegions => "planning_regions",
            EntityType::BalancingTopologies => "balancing_topologies",
            EntityType::TransmissionLines => "transmission_lines",
            EntityType::TransmissionInterchanges => "transmission_interchanges",
            EntityType::GenerationUnits => "generation_units",
            EntityType::StorageUnits => "storage_units",
            EntityType::SupplyTechnologies => "supply_technologies",
            EntityType::TransportTechnologies => "transport_technologies",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

impl std::str::FromStr for EntityType {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .into_iter()
            .find(|t| t.table_name() == s)
            .ok_or_else(|| GridError::Parse(format!("unknown entity type '{}'", s)))
    }
}

/// Business key an entity is looked up by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NaturalKey {
    Int(i64),
    Text(String),
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NaturalKey::Int(v) => write!(f, "{}", v),
            NaturalKey::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for NaturalKey {
    fn from(value: i64) -> Self {
        NaturalKey::Int(value)
    }
}

impl From<&str> for NaturalKey {
    fn from(value: &str) -> Self {
        NaturalKey::Text(value.to_string())
    }
}

impl From<String> for NaturalKey {
    fn from(value: String) -> Self {
        NaturalKey::Text(value)
    }
}

/// Typed value of an attribute or supplemental attribute.
///
/// `Blob` keeps SQLite BLOB affinity, which is how curves are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Null,
}

impl AttributeValue {
    /// JSON-encode `value` as text, as used for geolocation payloads.
    pub fn json<T: Serialize>(value: &T) -> GridResult<Self> {
        Ok(AttributeValue::Text(serde_json::to_string(value)?))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Real(v)
    }
}

impl From<Option<f64>> for AttributeValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(AttributeValue::Null, AttributeValue::Real)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Integer(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for AttributeValue {
    fn from(v: Vec<u8>) -> Self {
        AttributeValue::Blob(v)
    }
}

/// Point table a time series is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSeriesKind {
    Static,
    DeterministicForecast,
    ProbabilisticForecast,
}

impl TimeSeriesKind {
    /// Name of the point table, also written to `time_series.time_series_type`.
    pub fn table_name(self) -> &'static str {
        match self {
            TimeSeriesKind::Static => "static_time_series",
            TimeSeriesKind::DeterministicForecast => "deterministic_forecast_time_series",
            TimeSeriesKind::ProbabilisticForecast => "probabilistic_forecast_time_series",
        }
    }
}

impl fmt::Display for TimeSeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_type_round_trips_through_table_name() {
        for ty in EntityType::ALL {
            let parsed: EntityType = ty.table_name().parse().unwrap();
            assert_eq!(parsed, ty);
        }
        assert!("buses".parse::<EntityType>().is_err());
    }

    #[test]
    fn natural_key_display() {
        assert_eq!(NaturalKey::from(7).to_string(), "7");
        assert_eq!(NaturalKey::from("Bus A").to_string(), "Bus A");
    }

    #[test]
    fn absent_real_becomes_null() {
        assert!(AttributeValue::from(None::<f64>).is_null());
        assert_eq!(AttributeValue::from(Some(0.0)), AttributeValue::Real(0.0));
    }

    #[test]
    fn json_attribute_is_text() {
        let value = AttributeValue::json(&serde_json::json!({"lat": 33.4, "lon": -113.1})).unwrap();
        match value {
            AttributeValue::Text(s) => assert!(s.contains("\"lat\":33.4")),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn time_series_kind_tables() {
        assert_eq!(TimeSeriesKind::Static.table_name(), "static_time_series");
        assert_eq!(
            TimeSeriesKind::DeterministicForecast.to_string(),
            "deterministic_forecast_time_series"
        );
    }
}
